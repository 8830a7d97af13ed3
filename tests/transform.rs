use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use football_etl::extract::{Measure, MeasureKind, RawRecord, read_records_from};
use football_etl::transform::{Club, transform};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn records(csv: &str) -> Vec<RawRecord> {
    read_records_from(csv.as_bytes()).expect("csv should parse")
}

fn club(club_id: i64, club: &str, league: &str, league_country: &str) -> Club {
    Club {
        club_id,
        club: club.to_string(),
        league: league.to_string(),
        league_country: league_country.to_string(),
    }
}

const THREE_ROWS: &str = "\
player_id,player_name,age,appearances,goals,assists,nationality,club,league,league_country,signing_date
1,Karim Benzema,36,30,20,5,France,Real Madrid,La Liga,Spain,11-06-21
2,Bukayo Saka,23,35,14,11,England,Arsenal,Premier League,England,04-13-20
3,Luka Modric,38,32,3,7,Croatia,Real Madrid,La Liga,Spain,not-a-date
";

#[test]
fn splits_three_rows_into_two_clubs() {
    let tables = transform(&records(THREE_ROWS));

    assert_eq!(
        tables.clubs,
        vec![
            club(1, "Real Madrid", "La Liga", "Spain"),
            club(2, "Arsenal", "Premier League", "England"),
        ]
    );
    assert_eq!(tables.players.len(), 3);
    let ids = tables.players.iter().map(|p| p.club_id).collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2, 1]);
    assert_eq!(tables.unparsed_dates, 1);
    assert_eq!(tables.players[2].signing_date, None);
    assert_eq!(tables.players[2].player_name, "Luka Modric");
}

#[test]
fn fixture_rows_are_normalized() {
    let raw = read_fixture("messy_players.csv");
    let tables = transform(&records(&raw));

    assert_eq!(tables.players.len(), 7);
    for p in &tables.players {
        for text in [&p.player_name, &p.nationality] {
            assert_eq!(text.trim(), text.as_str());
        }
    }

    let names = tables
        .players
        .iter()
        .map(|p| p.player_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "Vinicius Junior",
            "Jude Bellingham",
            "Bukayo Saka",
            "Martin O'Neil",
            "Jean-Pierre Mcdonald",
            "Erling Haaland",
            "Phil Foden",
        ]
    );
    assert_eq!(tables.players[1].nationality, "England");
    // "12.0" in the goals column widens it to float.
    assert_eq!(tables.measure_kinds.goals, MeasureKind::Float);
    assert_eq!(tables.players[1].goals, Some(Measure::Float(12.0)));
    assert_eq!(tables.players[2].appearances, None);
    assert_eq!(tables.players[6].appearances, None);

    let dates = tables
        .players
        .iter()
        .map(|p| p.signing_date)
        .collect::<Vec<_>>();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2021, 6, 11),
            NaiveDate::from_ymd_opt(2021, 7, 8),
            NaiveDate::from_ymd_opt(2020, 4, 13),
            None,
            None,
            NaiveDate::from_ymd_opt(2018, 10, 21),
            NaiveDate::from_ymd_opt(2015, 8, 26),
        ]
    );
    assert_eq!(tables.unparsed_dates, 2);
}

#[test]
fn club_ids_follow_first_appearance_after_normalization() {
    let raw = read_fixture("messy_players.csv");
    let tables = transform(&records(&raw));

    assert_eq!(
        tables.clubs,
        vec![
            club(1, "Real Madrid", "La Liga", "Spain"),
            club(2, "Arsenal", "Premier League", "England"),
            club(3, "Nan", "Nan", "Nan"),
            club(4, "Olympique Lyonnais", "Ligue 1", "France"),
            club(5, "Manchester City", "Premier League", "England"),
        ]
    );
    let ids = tables.players.iter().map(|p| p.club_id).collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 1, 2, 3, 4, 5, 5]);
}

#[test]
fn every_player_references_an_existing_club() {
    let raw = read_fixture("messy_players.csv");
    let tables = transform(&records(&raw));

    for p in &tables.players {
        let matches = tables
            .clubs
            .iter()
            .filter(|c| c.club_id == p.club_id)
            .count();
        assert_eq!(matches, 1, "player {:?} has club_id {}", p.player_id, p.club_id);
    }
    let mut ids = tables.clubs.iter().map(|c| c.club_id).collect::<Vec<_>>();
    ids.dedup();
    assert_eq!(ids, (1..=tables.clubs.len() as i64).collect::<Vec<_>>());
}

#[test]
fn same_club_in_different_league_is_a_different_club() {
    let csv = "\
player_id,player_name,age,appearances,goals,assists,nationality,club,league,league_country,signing_date
1,A,20,1,0,0,X,Rangers,Premiership,Scotland,01-01-20
2,B,20,1,0,0,X,Rangers,Championship,England,01-01-20
3,C,20,1,0,0,X,rangers,premiership,scotland,01-01-20
";
    let tables = transform(&records(csv));
    assert_eq!(tables.clubs.len(), 2);
    let ids = tables.players.iter().map(|p| p.club_id).collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2, 1]);
}

#[test]
fn empty_input_yields_empty_tables() {
    let csv = "player_id,player_name,age,appearances,goals,assists,nationality,club,league,league_country,signing_date\n";
    let tables = transform(&records(csv));
    assert!(tables.players.is_empty());
    assert!(tables.clubs.is_empty());
}

#[test]
fn missing_column_is_a_parse_error() {
    let csv = "player_id,player_name\n1,Someone\n";
    let err = read_records_from(csv.as_bytes()).expect_err("missing columns should fail");
    assert!(format!("{err:#}").contains("missing column age"));
}

#[test]
fn short_row_reads_trailing_cells_as_missing() {
    let csv = "\
player_id,player_name,age,appearances,goals,assists,nationality,club,league,league_country,signing_date
1,A,30,10,2,1,X,Real Madrid,La Liga,Spain,11-06-21
2,B,21,3,1,0,Y,Arsenal,Premier League,England
";
    let tables = transform(&records(csv));

    assert_eq!(tables.players.len(), 2);
    assert_eq!(tables.players[1].player_name, "B");
    assert_eq!(tables.players[1].signing_date, None);
    assert_eq!(tables.players[1].club_id, 2);
    assert_eq!(tables.unparsed_dates, 1);
}

#[test]
fn row_wider_than_header_is_rejected() {
    let csv = "\
player_id,player_name,age,appearances,goals,assists,nationality,club,league,league_country,signing_date
1,A,30,10,2,1,X,Real Madrid,La Liga,Spain,11-06-21,extra
";
    let err = read_records_from(csv.as_bytes()).expect_err("wide row should fail");
    assert!(format!("{err:#}").contains("csv record 1: expected 11 fields, saw 12"));
}

#[test]
fn non_integer_measures_keep_their_values() {
    let csv = "\
player_id,player_name,age,appearances,goals,assists,nationality,club,league,league_country,signing_date
1,A,30,10,2,1,X,Real Madrid,La Liga,Spain,11-06-21
abc,B,twenty,12,23.5,,Y,Arsenal,Premier League,England,04-13-20
";
    let tables = transform(&records(csv));

    assert_eq!(tables.measure_kinds.player_id, MeasureKind::Text);
    assert_eq!(tables.measure_kinds.age, MeasureKind::Text);
    assert_eq!(tables.measure_kinds.appearances, MeasureKind::Integer);
    assert_eq!(tables.measure_kinds.goals, MeasureKind::Float);
    assert_eq!(tables.measure_kinds.assists, MeasureKind::Integer);

    let b = &tables.players[1];
    assert_eq!(b.player_id, Some(Measure::Text("abc".to_string())));
    assert_eq!(b.age, Some(Measure::Text("twenty".to_string())));
    assert_eq!(b.appearances, Some(Measure::Integer(12)));
    assert_eq!(b.goals, Some(Measure::Float(23.5)));
    assert_eq!(b.assists, None);
    assert_eq!(tables.players[0].player_id, Some(Measure::Text("1".to_string())));
    assert_eq!(tables.players[0].goals, Some(Measure::Float(2.0)));
}
