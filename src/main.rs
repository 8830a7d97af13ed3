use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use football_etl::config::EtlConfig;
use football_etl::pipeline;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cfg = EtlConfig::from_env(parse_input_arg())?;
    let summary = pipeline::run(&cfg)?;

    println!("Football ETL complete");
    println!("Input: {}", summary.input_path.display());
    println!("Destination: {}", summary.destination);
    println!("Rows read: {}", summary.rows_read);
    println!("Clubs written: {}", summary.clubs_written);
    println!("Players written: {}", summary.players_written);
    if summary.unparsed_dates > 0 {
        println!("Signing dates left empty: {}", summary.unparsed_dates);
    }

    Ok(())
}

fn parse_input_arg() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .map(|arg| arg.trim().to_string())
        .filter(|arg| !arg.is_empty())
        .map(PathBuf::from)
}
