use std::fmt;

use super::Table;

/// Renders like a data frame print: a header line, then one line per row
/// prefixed by its position. Cells are right-aligned to the widest entry.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.column_names.is_empty() {
            return write!(f, "Empty table\nColumns: []\nIndex: []");
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.values.iter().map(ToString::to_string).collect())
            .collect();

        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .column_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (name, width) in self.column_names.iter().zip(&widths) {
            write!(f, " {name:>width$}")?;
        }

        for (idx, row) in cells.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{idx:<index_width$}")?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, " {cell:>width$}")?;
            }
        }
        Ok(())
    }
}
