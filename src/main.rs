//! Command-line front end: run one statement and print the rows.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sql_connector::prelude::*;
use tracing_subscriber::EnvFilter;

/// Run a parameterized SQL statement against PostgreSQL, SQL Server or SQLite.
#[derive(Parser, Debug)]
#[command(name = "sql-connector")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Settings file with CONNECTOR_DB_* keys (default: .env)
    #[arg(long, value_name = "PATH", conflicts_with = "db_type")]
    env_file: Option<PathBuf>,

    /// Database type, instead of a settings file
    #[arg(long, value_enum, value_name = "TYPE")]
    db_type: Option<DatabaseType>,

    /// Server host, `host:port`, or for SQL Server `host\instance`
    #[arg(long, requires = "db_type")]
    server: Option<String>,

    #[arg(long, requires = "db_type")]
    port: Option<u16>,

    /// Database name, or the file path for SQLite
    #[arg(long, requires = "db_type")]
    database: Option<String>,

    #[arg(long, requires = "db_type")]
    username: Option<String>,

    #[arg(long, requires = "db_type")]
    password: Option<String>,

    /// Parameter bound to the next placeholder; repeat for more
    #[arg(short = 'p', long = "param", value_name = "VALUE")]
    params: Vec<String>,

    /// Print rows as JSON records instead of a grid
    #[arg(long)]
    json: bool,

    /// Statement to run
    sql: String,
}

impl Cli {
    fn config(&self) -> Result<ConnectorConfig, ConnectorError> {
        let Some(db_type) = self.db_type else {
            let path = self
                .env_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(".env"));
            return ConnectorConfig::from_env_file(path);
        };

        let mut builder = ConnectorConfig::builder(db_type)
            .database(self.database.clone().unwrap_or_default());
        if let Some(server) = &self.server {
            builder = builder.server(server);
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(username) = &self.username {
            builder = builder.username(username);
        }
        if let Some(password) = &self.password {
            builder = builder.password(password);
        }
        builder.build()
    }
}

/// Interpret a command-line parameter: `null`, `true`/`false`, integer,
/// float, otherwise text.
fn parse_param(raw: &str) -> RowValues {
    if raw.eq_ignore_ascii_case("null") {
        return RowValues::Null;
    }
    match raw {
        "true" => return RowValues::Bool(true),
        "false" => return RowValues::Bool(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return RowValues::Int(i);
    }
    // f64 parsing also accepts "inf" and "NaN"
    if raw.bytes().any(|b| b.is_ascii_digit())
        && let Ok(f) = raw.parse::<f64>()
    {
        return RowValues::Float(f);
    }
    RowValues::Text(raw.to_string())
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let params: Vec<RowValues> = cli.params.iter().map(|p| parse_param(p)).collect();

    let mut connector = Connector::connect(cli.config()?)?;
    let table = connector.query(&cli.sql, &params)?;
    connector.close()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        println!("{table}");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
