use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Deserializer};

// Cells the CSV reader treats as missing, matched exactly (no trimming).
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub const SOURCE_COLUMNS: [&str; 11] = [
    "player_id",
    "player_name",
    "age",
    "appearances",
    "goals",
    "assists",
    "nationality",
    "club",
    "league",
    "league_country",
    "signing_date",
];

/// One row of the messy source file, as read. Every cell is `None` when it was
/// missing, blank, or absent from a short row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "cell")]
    pub player_id: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub appearances: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub goals: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub assists: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub nationality: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub club: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub league: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub league_country: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub signing_date: Option<String>,
}

/// Type a numeric column ends up with once every cell has been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MeasureKind {
    Integer,
    Float,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Measure {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Measure {
    /// Read a cell as `kind`. Kinds come from [`infer_measure_kind`] over the
    /// same column, so narrower parses always succeed.
    pub fn read(raw: Option<&str>, kind: MeasureKind) -> Option<Measure> {
        let raw = raw?;
        let trimmed = raw.trim();
        match kind {
            MeasureKind::Integer => trimmed.parse().ok().map(Measure::Integer),
            MeasureKind::Float => trimmed.parse().ok().map(Measure::Float),
            MeasureKind::Text => Some(Measure::Text(raw.to_string())),
        }
    }
}

/// Widest kind needed by any present cell: integer, then float, then text.
/// Missing cells don't widen the column.
pub fn infer_measure_kind<'a, I>(cells: I) -> MeasureKind
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut kind = MeasureKind::Integer;
    for raw in cells.into_iter().flatten() {
        let trimmed = raw.trim();
        let cell_kind = if trimmed.parse::<i64>().is_ok() {
            MeasureKind::Integer
        } else if trimmed.parse::<f64>().is_ok() {
            MeasureKind::Float
        } else {
            return MeasureKind::Text;
        };
        kind = kind.max(cell_kind);
    }
    kind
}

pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path).with_context(|| format!("open csv {}", path.display()))?;
    let records =
        read_records_from(file).with_context(|| format!("parse csv {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = records.len(), "extracted source rows");
    Ok(records)
}

/// Short rows keep their leading cells and read the rest as missing; rows
/// wider than the header are an error.
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().context("read csv header")?.clone();
    if let Some(missing) = SOURCE_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(anyhow!("csv header is missing column {missing}"));
    }

    let mut out = Vec::new();
    for (idx, row) in rdr.records().enumerate() {
        // idx 0 is the first data row, line 2 of the file.
        let row = row.with_context(|| format!("read csv record {}", idx + 1))?;
        if row.len() > headers.len() {
            bail!(
                "csv record {}: expected {} fields, saw {}",
                idx + 1,
                headers.len(),
                row.len()
            );
        }
        let record = row
            .deserialize::<RawRecord>(Some(&headers))
            .with_context(|| format!("decode csv record {}", idx + 1))?;
        out.push(record);
    }
    Ok(out)
}

pub fn is_na_token(raw: &str) -> bool {
    NA_TOKENS.contains(&raw)
}

fn cell<'de, D>(de: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.filter(|s| !is_na_token(s)))
}
