use std::path::PathBuf;

use brasileirao_terminal::error::LoadError;
use brasileirao_terminal::league::DocumentSource;
use brasileirao_terminal::league_fetch::{fetch_league_document, parse_league_document};

const SERIE_B: &str = include_str!("fixtures/web_serie_b.json");

#[test]
fn parses_full_serie_b_document() {
    let doc = parse_league_document(SERIE_B).expect("valid document");

    let title: Vec<(&str, f64)> = doc
        .probabilities
        .title
        .iter()
        .map(|p| (p.team.as_str(), p.pct))
        .collect();
    assert_eq!(
        title,
        vec![("Coritiba", 38.4), ("Goiás", 21.2), ("Novorizontino", 15.0), ("Remo", 0.0)]
    );
    assert_eq!(doc.probabilities.promotion.len(), 5);
    assert!(doc.probabilities.libertadores.is_empty());
    assert_eq!(doc.probabilities.relegation[2].pct, 12.5);

    assert_eq!(doc.standings.len(), 3);
    assert_eq!(doc.standings[0].goal_diff, 14);
    assert_eq!(doc.standings[1].goal_diff, 6);
    assert_eq!(doc.standings[2].goal_diff, -18);

    let summary = doc.summary.expect("summary");
    assert_eq!(summary.total_games, 380);
    assert_eq!(summary.simulations, 300_000);
    assert_eq!(doc.next_round, Some(26));
    assert_eq!(
        doc.updated_at.map(|ts| ts.format("%Y-%m-%d %H:%M").to_string()),
        Some("2025-08-20 10:11".to_string())
    );

    assert_eq!(doc.fixtures.teams.len(), 3);
    assert_eq!(doc.fixtures.total(), 4);
    assert_eq!(doc.fixtures.skipped, 1);

    assert_eq!(doc.home_away.len(), 2);
    assert_eq!(doc.home_away[0].home.played, 13);
    assert_eq!(doc.home_away[0].away.efficiency, 50.0);
    assert_eq!(doc.recent_results.len(), 2);
    assert_eq!(doc.recent_results[0].1.len(), 3);
    assert_eq!(doc.last_rounds[0].0, "Rodada 25");
    assert_eq!(doc.last_rounds[0].1[1].home_score, None);
}

#[test]
fn missing_sections_default_to_empty() {
    let doc = parse_league_document(r#"{"classificacao": []}"#).expect("valid document");
    assert!(doc.standings.is_empty());
    assert!(doc.probabilities.title.is_empty());
    assert!(doc.fixtures.is_empty());
    assert_eq!(doc.summary, None);
    assert_eq!(doc.next_round, None);
    assert_eq!(doc.updated_at, None);
}

#[test]
fn null_or_empty_body_is_unavailable() {
    assert!(matches!(parse_league_document("null"), Err(LoadError::Unavailable(_))));
    assert!(matches!(parse_league_document("  \n"), Err(LoadError::Unavailable(_))));
}

#[test]
fn upstream_error_body_is_unavailable() {
    let err = parse_league_document(r#"{"error": "Arquivo não encontrado"}"#).unwrap_err();
    assert!(matches!(err, LoadError::Unavailable(_)));
    assert!(err.to_string().contains("Arquivo não encontrado"));
}

#[test]
fn broken_json_is_malformed() {
    assert!(matches!(parse_league_document("{\"titulo\": "), Err(LoadError::Malformed(_))));
    assert!(matches!(parse_league_document("[1, 2, 3]"), Err(LoadError::Malformed(_))));
}

#[test]
fn missing_file_is_unavailable() {
    let source = DocumentSource::File(PathBuf::from("tests/fixtures/does_not_exist.json"));
    assert!(matches!(fetch_league_document(&source), Err(LoadError::Unavailable(_))));
}

#[test]
fn reads_document_from_file() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/web_serie_b.json");
    let doc = fetch_league_document(&DocumentSource::File(path)).expect("fixture file");
    assert_eq!(doc.standings[0].team, "Coritiba");
}
