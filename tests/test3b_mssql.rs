#![cfg(feature = "mssql")]
//! Runs only when CONNECTOR_TEST_MSSQL_ENV names a settings file for a
//! reachable SQL Server.

use sql_connector::prelude::*;

fn connect() -> Option<Connector> {
    let path = std::env::var("CONNECTOR_TEST_MSSQL_ENV").ok()?;
    Some(Connector::from_env_file(path).expect("SQL Server test settings should connect"))
}

#[test]
fn mssql_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let Some(mut connector) = connect() else {
        return Ok(());
    };
    assert_eq!(connector.database_type(), DatabaseType::Mssql);

    connector.execute_batch(
        "CREATE TABLE #persons (
            person_number INT PRIMARY KEY,
            person_name NVARCHAR(100) NOT NULL,
            active BIT,
            score DECIMAL(6, 2)
         );",
    )?;
    let inserted = connector.execute(
        "INSERT INTO #persons VALUES (?, ?, ?, ?)",
        &[8.into(), "Alice".into(), true.into(), 12.5.into()],
    )?;
    assert_eq!(inserted, 1);

    let table = connector.query(
        "SELECT person_name FROM #persons WHERE person_number = ?",
        &[8.into()],
    )?;
    assert_eq!(table.len(), 1);
    assert_eq!(table.get(0, "person_name").and_then(RowValues::as_text), Some("Alice"));

    let table = connector.query(
        "SELECT active, score FROM #persons WHERE person_number = @P1",
        &[8.into()],
    )?;
    assert_eq!(table.get(0, "active"), Some(&RowValues::Bool(true)));
    assert_eq!(table.get(0, "score"), Some(&RowValues::Float(12.5)));

    let err = connector
        .query("SELECT * FROM #persons WHERE person_number = ?", &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    Ok(())
}

#[test]
fn mssql_query_keeps_only_the_first_result_set() -> Result<(), Box<dyn std::error::Error>> {
    let Some(mut connector) = connect() else {
        return Ok(());
    };

    let table = connector.query("SELECT 1 AS a; SELECT 2 AS b, 3 AS c", &[])?;
    assert_eq!(table.columns(), ["a"]);
    assert_eq!(table.len(), 1);
    assert_eq!(table.get(0, "a"), Some(&RowValues::Int(1)));

    // the session is still usable after the extra result set was drained
    let table = connector.query("SELECT ? AS n", &[5.into()])?;
    assert_eq!(table.get(0, "n"), Some(&RowValues::Int(5)));
    connector.close()?;
    Ok(())
}
