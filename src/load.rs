use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::extract::{Measure, MeasureKind};
use crate::transform::{Club, MeasureKinds, Player, Tables};

pub const CLUBS_TABLE: &str = "clubs";
pub const PLAYERS_TABLE: &str = "players";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    Date,
}

impl ColumnKind {
    /// Destination column type. Every backend here accepts the same names.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "BIGINT",
            ColumnKind::Float => "DOUBLE PRECISION",
            ColumnKind::Text => "TEXT",
            ColumnKind::Date => "DATE",
        }
    }
}

impl From<MeasureKind> for ColumnKind {
    fn from(kind: MeasureKind) -> Self {
        match kind {
            MeasureKind::Integer => ColumnKind::Integer,
            MeasureKind::Float => ColumnKind::Float,
            MeasureKind::Text => ColumnKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
}

impl SqlValue {
    /// Typed value for a measure cell; missing cells become a NULL of the
    /// column's kind.
    pub fn measure(cell: Option<&Measure>, kind: MeasureKind) -> Self {
        match (kind, cell) {
            (MeasureKind::Integer, Some(Measure::Integer(n))) => SqlValue::Integer(Some(*n)),
            (MeasureKind::Integer, _) => SqlValue::Integer(None),
            (MeasureKind::Float, Some(Measure::Float(f))) => SqlValue::Float(Some(*f)),
            (MeasureKind::Float, Some(Measure::Integer(n))) => SqlValue::Float(Some(*n as f64)),
            (MeasureKind::Float, _) => SqlValue::Float(None),
            (MeasureKind::Text, Some(Measure::Text(s))) => SqlValue::Text(Some(s.clone())),
            (MeasureKind::Text, Some(Measure::Integer(n))) => SqlValue::Text(Some(n.to_string())),
            (MeasureKind::Text, Some(Measure::Float(f))) => SqlValue::Text(Some(f.to_string())),
            (MeasureKind::Text, None) => SqlValue::Text(None),
        }
    }
}

/// A row type that maps onto one destination table. `Schema` carries whatever
/// was inferred from the whole input that decides column types.
pub trait Relation {
    const TABLE: &'static str;
    type Schema;

    fn columns(schema: &Self::Schema) -> Vec<(&'static str, ColumnKind)>;
    fn values(&self, schema: &Self::Schema) -> Vec<SqlValue>;
}

impl Relation for Club {
    const TABLE: &'static str = CLUBS_TABLE;
    type Schema = ();

    fn columns(_: &()) -> Vec<(&'static str, ColumnKind)> {
        vec![
            ("club_id", ColumnKind::Integer),
            ("club", ColumnKind::Text),
            ("league", ColumnKind::Text),
            ("league_country", ColumnKind::Text),
        ]
    }

    fn values(&self, _: &()) -> Vec<SqlValue> {
        vec![
            SqlValue::Integer(Some(self.club_id)),
            SqlValue::Text(Some(self.club.clone())),
            SqlValue::Text(Some(self.league.clone())),
            SqlValue::Text(Some(self.league_country.clone())),
        ]
    }
}

impl Relation for Player {
    const TABLE: &'static str = PLAYERS_TABLE;
    type Schema = MeasureKinds;

    fn columns(kinds: &MeasureKinds) -> Vec<(&'static str, ColumnKind)> {
        vec![
            ("player_id", ColumnKind::from(kinds.player_id)),
            ("player_name", ColumnKind::Text),
            ("age", ColumnKind::from(kinds.age)),
            ("appearances", ColumnKind::from(kinds.appearances)),
            ("goals", ColumnKind::from(kinds.goals)),
            ("assists", ColumnKind::from(kinds.assists)),
            ("nationality", ColumnKind::Text),
            ("signing_date", ColumnKind::Date),
            ("club_id", ColumnKind::Integer),
        ]
    }

    fn values(&self, kinds: &MeasureKinds) -> Vec<SqlValue> {
        vec![
            SqlValue::measure(self.player_id.as_ref(), kinds.player_id),
            SqlValue::Text(Some(self.player_name.clone())),
            SqlValue::measure(self.age.as_ref(), kinds.age),
            SqlValue::measure(self.appearances.as_ref(), kinds.appearances),
            SqlValue::measure(self.goals.as_ref(), kinds.goals),
            SqlValue::measure(self.assists.as_ref(), kinds.assists),
            SqlValue::Text(Some(self.nationality.clone())),
            SqlValue::Date(self.signing_date),
            SqlValue::Integer(Some(self.club_id)),
        ]
    }
}

/// Owned, backend-neutral copy of one table ready to be written.
#[derive(Debug, Clone)]
pub struct TableData {
    pub name: &'static str,
    pub columns: Vec<(&'static str, ColumnKind)>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl TableData {
    pub fn from_rows<R: Relation>(rows: &[R], schema: &R::Schema) -> Self {
        Self {
            name: R::TABLE,
            columns: R::columns(schema),
            rows: rows.iter().map(|row| row.values(schema)).collect(),
        }
    }

    pub fn create_statement(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|(name, kind)| format!("{} {}", quote_ident(name), kind.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({cols})", quote_ident(self.name))
    }

    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(self.name))
    }

    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|(name, _)| quote_ident(name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Destination that can atomically replace one table at a time.
pub trait TableSink {
    fn describe(&self) -> String;

    /// Drop `table.name` if present, recreate it and insert every row.
    fn replace_table(&mut self, table: &TableData) -> Result<()>;
}

/// Write both tables, clubs first. Each replacement is atomic on its own but no
/// transaction spans the pair: if players fails, clubs stays replaced.
pub fn load_tables<S: TableSink + ?Sized>(sink: &mut S, tables: &Tables) -> Result<()> {
    for table in [
        TableData::from_rows(&tables.clubs, &()),
        TableData::from_rows(&tables.players, &tables.measure_kinds),
    ] {
        sink.replace_table(&table)
            .with_context(|| format!("replace table {} in {}", table.name, sink.describe()))?;
        tracing::info!(table = table.name, rows = table.rows.len(), "replaced table");
    }
    Ok(())
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
