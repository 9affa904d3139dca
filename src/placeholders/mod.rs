use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_escape_string_start, is_line_comment_start,
    is_mssql_param_start, matches_tag, try_start_dollar_quote,
};
use scanner::{State, scan_digits};

use crate::error::ConnectorError;
use crate::types::DatabaseType;

/// Native placeholder style of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQL Server-style parameter names like `@P1`.
    Mssql,
    /// SQLite placeholders, `?` or `?1`.
    Sqlite,
}

impl From<DatabaseType> for PlaceholderStyle {
    fn from(db_type: DatabaseType) -> Self {
        match db_type {
            DatabaseType::Postgres => PlaceholderStyle::Postgres,
            DatabaseType::Mssql => PlaceholderStyle::Mssql,
            DatabaseType::Sqlite => PlaceholderStyle::Sqlite,
        }
    }
}

/// Placeholders found in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaceholderScan {
    /// Bare `?` markers, bound in order of appearance.
    pub positional: usize,
    /// Highest index among numbered placeholders (`?N`, `$N`, `@PN`).
    pub highest_numbered: usize,
}

impl PlaceholderScan {
    /// Number of parameters the statement binds.
    ///
    /// # Errors
    /// Returns `ConnectorError::QueryError` when `?` and numbered placeholders are mixed.
    pub fn expected_params(&self) -> Result<usize, ConnectorError> {
        if self.positional > 0 && self.highest_numbered > 0 {
            return Err(ConnectorError::query(
                "query mixes `?` and numbered placeholders",
            ));
        }
        Ok(self.positional.max(self.highest_numbered))
    }
}

/// Count the placeholders in `sql` as the given backend would see them.
#[must_use]
pub fn scan_placeholders(sql: &str, style: PlaceholderStyle) -> PlaceholderScan {
    walk(sql, style, false).1
}

/// Rewrite `?` and `?N` placeholders into the backend's native numbered form.
///
/// Quoted strings, quoted identifiers (`"x"`, and `[x]` or `` `x` `` where
/// the backend allows them), comments, and for PostgreSQL `E'...'` escape
/// strings and dollar-quoted bodies are left alone. Operators spelled with `?` (the
/// PostgreSQL `jsonb` family) are indistinguishable from placeholders; write
/// `$N` placeholders in statements that use them. Returns a borrowed `Cow`
/// when nothing changes.
#[must_use]
pub fn translate_placeholders(sql: &str, style: PlaceholderStyle) -> Cow<'_, str> {
    walk(sql, style, true).0
}

/// Check that `sql` binds exactly `supplied` parameters and translate it for
/// the backend.
///
/// # Errors
/// Returns `ConnectorError::QueryError` on a count mismatch or mixed placeholder styles.
pub fn prepare_statement(
    sql: &str,
    style: PlaceholderStyle,
    supplied: usize,
) -> Result<Cow<'_, str>, ConnectorError> {
    let (translated, scan) = walk(sql, style, true);
    let expected = scan.expected_params()?;
    if expected != supplied {
        return Err(ConnectorError::query(format!(
            "query expects {expected} parameter(s) but {supplied} were supplied"
        )));
    }
    Ok(translated)
}

fn walk(sql: &str, style: PlaceholderStyle, translate: bool) -> (Cow<'_, str>, PlaceholderScan) {
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut scan = PlaceholderScan::default();
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    let mut replace = |out: &mut Option<String>, start: usize, end: usize, n: usize| {
        let prefix = match style {
            PlaceholderStyle::Postgres => "$",
            PlaceholderStyle::Mssql => "@P",
            PlaceholderStyle::Sqlite => return,
        };
        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
        buf.push_str(&sql[copied..start]);
        buf.push_str(prefix);
        buf.push_str(&n.to_string());
        copied = end;
    };

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' if style == PlaceholderStyle::Postgres && is_escape_string_start(bytes, idx) => {
                    state = State::EscapeQuoted;
                }
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' if style != PlaceholderStyle::Postgres => state = State::Bracketed,
                b'`' if style == PlaceholderStyle::Sqlite => state = State::Backticked,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' if style == PlaceholderStyle::Postgres => {
                    if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = advance;
                    } else if let Some((digits_end, digits)) = scan_digits(bytes, idx + 1) {
                        bump_numbered(&mut scan, digits);
                        idx = digits_end - 1;
                    }
                }
                b'@' if style == PlaceholderStyle::Mssql => {
                    if let Some(start) = is_mssql_param_start(bytes, idx)
                        && let Some((digits_end, digits)) = scan_digits(bytes, start)
                    {
                        bump_numbered(&mut scan, digits);
                        idx = digits_end - 1;
                    }
                }
                b'?' => {
                    if let Some((digits_end, digits)) = scan_digits(bytes, idx + 1) {
                        let n = bump_numbered(&mut scan, digits);
                        if translate {
                            replace(&mut out, idx, digits_end, n);
                        }
                        idx = digits_end - 1;
                    } else {
                        scan.positional += 1;
                        if translate {
                            replace(&mut out, idx, idx + 1, scan.positional);
                        }
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::EscapeQuoted => match b {
                b'\\' => idx += 1,
                b'\'' if bytes.get(idx + 1) == Some(&b'\'') => idx += 1,
                b'\'' => state = State::Normal,
                _ => {}
            },
            State::Backticked => {
                if b == b'`' {
                    if bytes.get(idx + 1) == Some(&b'`') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }
        idx += 1;
    }

    let translated = match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    };
    (translated, scan)
}

fn bump_numbered(scan: &mut PlaceholderScan, digits: &str) -> usize {
    // digit runs too long for usize cannot match any parameter list
    let n = digits.parse::<usize>().unwrap_or(usize::MAX);
    scan.highest_numbered = scan.highest_numbered.max(n);
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qmarks_become_postgres_numbers() {
        let sql = "SELECT person_name FROM persons WHERE person_number = ? AND x = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(
            res,
            "SELECT person_name FROM persons WHERE person_number = $1 AND x = $2"
        );
    }

    #[test]
    fn qmarks_become_mssql_names() {
        let res = translate_placeholders("insert into t values(?, ?1)", PlaceholderStyle::Mssql);
        assert_eq!(res, "insert into t values(@P1, @P1)");
    }

    #[test]
    fn sqlite_is_left_untouched() {
        let sql = "select * from t where a = ? and b = ?2";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite);
        assert!(matches!(res, Cow::Borrowed(_)));
    }

    #[test]
    fn skips_inside_literals_and_comments() {
        let sql = "select '?', \"a?\" -- ?\n/* ? /* ? */ */ from t where a = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(
            res,
            "select '?', \"a?\" -- ?\n/* ? /* ? */ */ from t where a = $1"
        );
        assert_eq!(scan_placeholders(sql, PlaceholderStyle::Postgres).positional, 1);
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let sql = "$foo$ select ? from t $foo$ where a = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "$foo$ select ? from t $foo$ where a = $1");
    }

    #[test]
    fn skips_bracketed_identifiers_on_mssql() {
        let sql = "select [what?] from t where a = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Mssql);
        assert_eq!(res, "select [what?] from t where a = @P1");
    }

    #[test]
    fn skips_sqlite_quoted_identifiers() {
        let scan = scan_placeholders("SELECT [a?], `b?` FROM t", PlaceholderStyle::Sqlite);
        assert_eq!(scan.expected_params().unwrap(), 0);

        let sql = "SELECT `we``ird?` FROM t WHERE [x] = ?";
        assert!(prepare_statement(sql, PlaceholderStyle::Sqlite, 1).is_ok());
    }

    #[test]
    fn skips_postgres_escape_strings() {
        let res = translate_placeholders(r"SELECT E'it\'s ?', ?", PlaceholderStyle::Postgres);
        assert_eq!(res, r"SELECT E'it\'s ?', $1");

        // a plain literal ending in `e` is not an escape string prefix
        let res = translate_placeholders(r"SELECT name'\' , ?", PlaceholderStyle::Postgres);
        assert_eq!(res, r"SELECT name'\' , $1");
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let sql = "select 'häagen' as n, ? as p, 'ö' as q";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "select 'häagen' as n, $1 as p, 'ö' as q");
    }

    #[test]
    fn native_numbered_placeholders_are_counted() {
        let scan = scan_placeholders("select $1, $2, $1", PlaceholderStyle::Postgres);
        assert_eq!(scan.highest_numbered, 2);
        assert_eq!(scan.expected_params().unwrap(), 2);

        let scan = scan_placeholders("select @P1, @p3", PlaceholderStyle::Mssql);
        assert_eq!(scan.expected_params().unwrap(), 3);

        let scan = scan_placeholders("select @name", PlaceholderStyle::Mssql);
        assert_eq!(scan.expected_params().unwrap(), 0);
    }

    #[test]
    fn prepare_rejects_count_mismatch() {
        let sql = "select * from t where a = ? and b = ?";
        let err = prepare_statement(sql, PlaceholderStyle::Sqlite, 1).unwrap_err();
        assert!(matches!(err, ConnectorError::QueryError(ref m) if m.contains("expects 2")));
        let err = prepare_statement(sql, PlaceholderStyle::Sqlite, 3).unwrap_err();
        assert!(matches!(err, ConnectorError::QueryError(_)));
        assert!(prepare_statement(sql, PlaceholderStyle::Sqlite, 2).is_ok());
    }

    #[test]
    fn prepare_rejects_mixed_styles() {
        let err = prepare_statement("select ?, $1", PlaceholderStyle::Postgres, 1).unwrap_err();
        assert!(matches!(err, ConnectorError::QueryError(ref m) if m.contains("mixes")));
    }

    #[test]
    fn no_placeholders_means_no_params() {
        assert!(prepare_statement("select 1", PlaceholderStyle::Mssql, 0).is_ok());
        assert!(prepare_statement("select 1", PlaceholderStyle::Mssql, 1).is_err());
    }
}
