use std::collections::HashMap;

use chrono::NaiveDate;

use crate::extract::{Measure, MeasureKind, RawRecord, infer_measure_kind};
use crate::normalize::clean_text;
use crate::signing_date::parse_signing_date;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClubKey {
    pub club: String,
    pub league: String,
    pub league_country: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Club {
    pub club_id: i64,
    pub club: String,
    pub league: String,
    pub league_country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub player_id: Option<Measure>,
    pub player_name: String,
    pub age: Option<Measure>,
    pub appearances: Option<Measure>,
    pub goals: Option<Measure>,
    pub assists: Option<Measure>,
    pub nationality: String,
    pub signing_date: Option<NaiveDate>,
    pub club_id: i64,
}

/// Column kind of each numeric player column, inferred over the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureKinds {
    pub player_id: MeasureKind,
    pub age: MeasureKind,
    pub appearances: MeasureKind,
    pub goals: MeasureKind,
    pub assists: MeasureKind,
}

impl Default for MeasureKinds {
    fn default() -> Self {
        Self {
            player_id: MeasureKind::Integer,
            age: MeasureKind::Integer,
            appearances: MeasureKind::Integer,
            goals: MeasureKind::Integer,
            assists: MeasureKind::Integer,
        }
    }
}

impl MeasureKinds {
    pub fn infer(records: &[RawRecord]) -> Self {
        Self {
            player_id: column_kind(records, |r| r.player_id.as_deref()),
            age: column_kind(records, |r| r.age.as_deref()),
            appearances: column_kind(records, |r| r.appearances.as_deref()),
            goals: column_kind(records, |r| r.goals.as_deref()),
            assists: column_kind(records, |r| r.assists.as_deref()),
        }
    }
}

fn column_kind<F>(records: &[RawRecord], cell: F) -> MeasureKind
where
    F: Fn(&RawRecord) -> Option<&str>,
{
    infer_measure_kind(records.iter().map(|r| cell(r)))
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub players: Vec<Player>,
    pub clubs: Vec<Club>,
    pub measure_kinds: MeasureKinds,
    pub unparsed_dates: usize,
}

/// A source row after text and date cleanup, still carrying its club triple.
#[derive(Debug, Clone)]
struct CleanRow {
    player_id: Option<Measure>,
    player_name: String,
    age: Option<Measure>,
    appearances: Option<Measure>,
    goals: Option<Measure>,
    assists: Option<Measure>,
    nationality: String,
    signing_date: Option<NaiveDate>,
    club: ClubKey,
}

pub fn transform(records: &[RawRecord]) -> Tables {
    let measure_kinds = MeasureKinds::infer(records);
    let rows = records
        .iter()
        .map(|raw| clean_row(raw, &measure_kinds))
        .collect::<Vec<_>>();
    let unparsed_dates = rows.iter().filter(|r| r.signing_date.is_none()).count();

    let (clubs, ids) = assign_club_ids(rows.iter().map(|r| &r.club));

    let players = rows
        .into_iter()
        .map(|row| Player {
            // Every key was registered by assign_club_ids above.
            club_id: ids[&row.club],
            player_id: row.player_id,
            player_name: row.player_name,
            age: row.age,
            appearances: row.appearances,
            goals: row.goals,
            assists: row.assists,
            nationality: row.nationality,
            signing_date: row.signing_date,
        })
        .collect::<Vec<_>>();

    tracing::info!(
        players = players.len(),
        clubs = clubs.len(),
        unparsed_dates,
        ?measure_kinds,
        "transformed source rows"
    );

    Tables {
        players,
        clubs,
        measure_kinds,
        unparsed_dates,
    }
}

/// Deduplicate club triples in first-seen order and number them from 1.
pub fn assign_club_ids<'a, I>(keys: I) -> (Vec<Club>, HashMap<ClubKey, i64>)
where
    I: IntoIterator<Item = &'a ClubKey>,
{
    let mut ids = HashMap::new();
    let mut clubs = Vec::new();
    for key in keys {
        if ids.contains_key(key) {
            continue;
        }
        let club_id = clubs.len() as i64 + 1;
        ids.insert(key.clone(), club_id);
        clubs.push(Club {
            club_id,
            club: key.club.clone(),
            league: key.league.clone(),
            league_country: key.league_country.clone(),
        });
    }
    (clubs, ids)
}

fn clean_row(raw: &RawRecord, kinds: &MeasureKinds) -> CleanRow {
    let signing_date = parse_signing_date(raw.signing_date.as_deref());
    if signing_date.is_none() {
        tracing::debug!(
            player_id = ?raw.player_id,
            raw = ?raw.signing_date,
            "signing date matched no known format"
        );
    }
    CleanRow {
        player_id: Measure::read(raw.player_id.as_deref(), kinds.player_id),
        player_name: clean_text(raw.player_name.as_deref()),
        age: Measure::read(raw.age.as_deref(), kinds.age),
        appearances: Measure::read(raw.appearances.as_deref(), kinds.appearances),
        goals: Measure::read(raw.goals.as_deref(), kinds.goals),
        assists: Measure::read(raw.assists.as_deref(), kinds.assists),
        nationality: clean_text(raw.nationality.as_deref()),
        signing_date,
        club: ClubKey {
            club: clean_text(raw.club.as_deref()),
            league: clean_text(raw.league.as_deref()),
            league_country: clean_text(raw.league_country.as_deref()),
        },
    }
}
