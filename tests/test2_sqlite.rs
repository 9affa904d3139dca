#![cfg(feature = "sqlite")]
use std::path::Path;

use chrono::NaiveDate;
use serde_json::json;
use sql_connector::prelude::*;

fn seeded(dir: &Path) -> Result<Connector, ConnectorError> {
    let path = dir.join("people.db");
    let mut connector = Connector::connect(ConnectorConfig::sqlite(path.to_string_lossy()))?;
    connector.execute_batch(
        "CREATE TABLE persons (
            person_number INTEGER PRIMARY KEY,
            person_name TEXT NOT NULL,
            height REAL,
            born TEXT,
            photo BLOB
        );
        INSERT INTO persons (person_number, person_name, height) VALUES (8, 'Alice', 1.71);
        INSERT INTO persons (person_number, person_name, height) VALUES (9, 'Bob', NULL);",
    )?;
    Ok(connector)
}

#[test]
fn parameterized_select_returns_matching_rows() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut connector = seeded(dir.path())?;

    let table = connector.query(
        "SELECT person_name FROM persons WHERE person_number = ?",
        &[8.into()],
    )?;
    assert_eq!(table.columns(), ["person_name".to_string()]);
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.get(0, "person_name").and_then(RowValues::as_text),
        Some("Alice")
    );
    Ok(())
}

#[test]
fn numbered_placeholders_are_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut connector = seeded(dir.path())?;

    let table = connector.query(
        "SELECT person_name FROM persons WHERE person_number IN (?1, ?2)",
        &[8.into(), 9.into()],
    )?;
    assert_eq!(table.len(), 2);
    Ok(())
}

#[test]
fn values_come_back_typed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut connector = seeded(dir.path())?;
    let born = NaiveDate::from_ymd_opt(1990, 5, 17)
        .and_then(|d| d.and_hms_opt(6, 0, 0))
        .ok_or("bad date")?;

    let changed = connector.execute(
        "UPDATE persons SET born = ?, photo = ? WHERE person_number = ?",
        &[born.into(), vec![0xde_u8, 0xad].into(), 8.into()],
    )?;
    assert_eq!(changed, 1);

    let table = connector.query(
        "SELECT person_number, height, born, photo FROM persons ORDER BY person_number",
        &[],
    )?;
    let alice = table.row(0).ok_or("missing row")?;
    assert_eq!(alice.get("person_number"), Some(&RowValues::Int(8)));
    assert_eq!(alice.get("height"), Some(&RowValues::Float(1.71)));
    assert_eq!(alice.get("born").and_then(RowValues::as_timestamp), Some(born));
    assert_eq!(
        alice.get("photo").and_then(RowValues::as_blob),
        Some(&[0xde_u8, 0xad][..])
    );
    assert_eq!(table.get(1, "height"), Some(&RowValues::Null));

    assert_eq!(
        serde_json::to_value(&table.column("person_number"))?,
        json!([8, 9])
    );
    Ok(())
}

#[test]
fn empty_result_keeps_columns() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut connector = seeded(dir.path())?;

    let table = connector.query(
        "SELECT person_number, person_name FROM persons WHERE person_number = ?",
        &[1000.into()],
    )?;
    assert!(table.is_empty());
    assert_eq!(table.column_count(), 2);
    Ok(())
}

#[test]
fn statements_without_rows_give_an_empty_table() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut connector = seeded(dir.path())?;

    let table = connector.query(
        "INSERT INTO persons (person_number, person_name) VALUES (?, ?)",
        &[10.into(), "Carol".into()],
    )?;
    assert!(table.is_empty());
    assert_eq!(table.column_count(), 0);

    let table = connector.query("SELECT count(*) AS n FROM persons", &[])?;
    assert_eq!(table.get(0, "n"), Some(&RowValues::Int(3)));
    Ok(())
}

#[test]
fn missing_table_is_a_query_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut connector = seeded(dir.path())?;

    let err = connector
        .query("SELECT * FROM nobody WHERE id = ?", &[1.into()])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(err.to_string().contains("nobody"));

    // the connector stays usable
    assert_eq!(connector.query("SELECT 1 AS one", &[])?.len(), 1);
    Ok(())
}

#[test]
fn missing_column_is_a_query_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut connector = seeded(dir.path())?;

    let table = connector.query("SELECT person_name FROM persons", &[])?;
    assert!(table.has_column("person_name"));
    assert!(!table.has_column("no_such_col"));

    let err = connector
        .query(
            "SELECT no_such_col FROM persons WHERE person_number = ?",
            &[8.into()],
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(err.to_string().contains("no_such_col"));
    Ok(())
}

#[test]
fn question_marks_in_quoted_identifiers_are_not_placeholders()
-> Result<(), Box<dyn std::error::Error>> {
    let mut connector = Connector::connect(ConnectorConfig::sqlite(":memory:"))?;
    connector.execute_batch("CREATE TABLE t ([a?] INTEGER, `b?` TEXT); INSERT INTO t VALUES (1, 'x');")?;

    let table = connector.query("SELECT [a?] FROM t", &[])?;
    assert_eq!(table.get(0, "a?"), Some(&RowValues::Int(1)));
    let table = connector.query("SELECT `b?` FROM t WHERE [a?] = ?", &[1.into()])?;
    assert_eq!(table.get(0, "b?").and_then(RowValues::as_text), Some("x"));
    Ok(())
}

#[test]
fn new_database_file_is_created_on_connect() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fresh.db");
    assert!(!path.exists());

    let mut connector = Connector::connect(ConnectorConfig::sqlite(path.to_string_lossy()))?;
    assert!(path.exists());
    let err = connector.query("SELECT * FROM persons", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    Ok(())
}

#[test]
fn parameter_count_mismatch_is_a_query_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut connector = seeded(dir.path())?;
    let sql = "SELECT person_name FROM persons WHERE person_number = ?";

    let too_few = connector.query(sql, &[]).unwrap_err();
    assert!(matches!(too_few, ConnectorError::QueryError(_)));
    let too_many = connector.query(sql, &[8.into(), 9.into()]).unwrap_err();
    assert!(matches!(too_many, ConnectorError::QueryError(_)));
    let execute = connector.execute("DELETE FROM persons", &[8.into()]).unwrap_err();
    assert!(matches!(execute, ConnectorError::QueryError(_)));
    Ok(())
}

#[test]
fn use_after_close_is_a_connection_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut connector = seeded(dir.path())?;
    assert!(connector.is_open());

    connector.close()?;
    connector.close()?;
    assert!(!connector.is_open());

    let err = connector.query("SELECT 1", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    let err = connector.execute_batch("SELECT 1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    Ok(())
}

#[test]
fn data_survives_reconnect() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    drop(seeded(dir.path())?);

    let config = ConnectorConfig::sqlite(dir.path().join("people.db").to_string_lossy());
    let mut connector = Connector::connect(config)?;
    assert_eq!(connector.database_type(), DatabaseType::Sqlite);
    let table = connector.query("SELECT person_name FROM persons ORDER BY person_number", &[])?;
    assert_eq!(table.len(), 2);
    Ok(())
}

#[test]
fn unreachable_file_is_a_connection_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("no").join("such").join("dir.db");
    let err = Connector::connect(ConnectorConfig::sqlite(path.to_string_lossy())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);

    let not_a_db = dir.path().join("notes.txt");
    std::fs::write(&not_a_db, "this is plain text, long enough to not be a database header")?;
    let err = Connector::connect(ConnectorConfig::sqlite(not_a_db.to_string_lossy())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    Ok(())
}

#[test]
fn in_memory_database_works() -> Result<(), Box<dyn std::error::Error>> {
    let mut connector = Connector::connect(ConnectorConfig::sqlite(":memory:"))?;
    let table = connector.query("SELECT ? AS a, ? AS b", &["x".into(), RowValues::Null])?;
    assert_eq!(table.get(0, "a").and_then(RowValues::as_text), Some("x"));
    assert!(table.get(0, "b").is_some_and(RowValues::is_null));
    Ok(())
}
