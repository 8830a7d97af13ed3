use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{Destination, EtlConfig};
use crate::extract;
use crate::load::{self, TableSink};
use crate::postgres_sink::PostgresSink;
use crate::sqlite_sink::SqliteSink;
use crate::transform::{self, Tables};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub input_path: PathBuf,
    pub destination: String,
    pub rows_read: usize,
    pub clubs_written: usize,
    pub players_written: usize,
    pub unparsed_dates: usize,
}

/// Extract and transform first; the destination is only opened once the input
/// has been read successfully.
pub fn run(cfg: &EtlConfig) -> Result<RunSummary> {
    let (rows_read, tables) = extract_and_transform(&cfg.input_path)?;
    let mut sink = open_sink(&cfg.destination)?;
    finish(&cfg.input_path, rows_read, &tables, sink.as_mut())
}

pub fn run_with_sink<S: TableSink + ?Sized>(input_path: &Path, sink: &mut S) -> Result<RunSummary> {
    let (rows_read, tables) = extract_and_transform(input_path)?;
    finish(input_path, rows_read, &tables, sink)
}

pub fn open_sink(destination: &Destination) -> Result<Box<dyn TableSink>> {
    let sink: Box<dyn TableSink> = match destination {
        Destination::Postgres(pg) => Box::new(PostgresSink::connect(pg)?),
        Destination::Sqlite(path) => Box::new(SqliteSink::open(path)?),
    };
    Ok(sink)
}

fn extract_and_transform(input_path: &Path) -> Result<(usize, Tables)> {
    let records = extract::read_records(input_path)?;
    Ok((records.len(), transform::transform(&records)))
}

fn finish<S: TableSink + ?Sized>(
    input_path: &Path,
    rows_read: usize,
    tables: &Tables,
    sink: &mut S,
) -> Result<RunSummary> {
    load::load_tables(sink, tables)?;
    Ok(RunSummary {
        input_path: input_path.to_path_buf(),
        destination: sink.describe(),
        rows_read,
        clubs_written: tables.clubs.len(),
        players_written: tables.players.len(),
        unparsed_dates: tables.unparsed_dates,
    })
}
