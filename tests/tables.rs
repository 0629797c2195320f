use assert_float_eq::*;

use brasileirao_terminal::error::FixtureError;
use brasileirao_terminal::league::{AppConfig, League};
use brasileirao_terminal::league_fetch::parse_league_document;
use brasileirao_terminal::state::{MatchResult, TeamProbability, VenueRecord};
use brasileirao_terminal::tables::{
    BarLevel, FormMark, LeagueView, VenueRow, bar_level, form_marks, probability_rows,
};
use brasileirao_terminal::team_fixtures::SourceOrder;
use brasileirao_terminal::win_prob::{OutcomeEstimator, ProbabilitySource};

const SERIE_B: &str = include_str!("fixtures/web_serie_b.json");

fn serie_b_view() -> LeagueView {
    let doc = parse_league_document(SERIE_B).expect("valid document");
    let cfg = AppConfig::default().league(League::SerieB);
    LeagueView::build(&doc, &cfg, &OutcomeEstimator::default(), SourceOrder::Document)
}

fn prob(team: &str, pct: f64) -> TeamProbability {
    TeamProbability {
        team: team.to_string(),
        pct,
    }
}

#[test]
fn bar_levels_follow_thresholds() {
    assert_eq!(bar_level(70.0), BarLevel::High);
    assert_eq!(bar_level(69.9), BarLevel::Medium);
    assert_eq!(bar_level(30.0), BarLevel::Medium);
    assert_eq!(bar_level(29.9), BarLevel::Low);
    assert_eq!(bar_level(f64::NAN), BarLevel::Low);
}

#[test]
fn probability_rows_sort_and_truncate() {
    let entries = vec![
        prob("A", 10.0),
        prob("B", 80.0),
        prob("C", 10.0),
        prob("D", 45.0),
    ];
    let rows = probability_rows(&entries, 3);
    let teams: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
    assert_eq!(teams, vec!["B", "D", "A"]);
    assert_eq!(rows[0].position, 1);
    assert_eq!(rows[0].level, BarLevel::High);
    assert_eq!(rows[2].position, 3);
}

#[test]
fn venue_rows_derive_draws_and_flag_efficiency() {
    let row = VenueRow::from(&VenueRecord {
        played: 12,
        wins: 3,
        losses: 5,
        points: 13,
        efficiency: 36.1,
    });
    assert_eq!(row.draws, 4);
    assert!(row.low_efficiency);

    let odd = VenueRow::from(&VenueRecord {
        played: 2,
        wins: 2,
        losses: 1,
        points: 6,
        efficiency: 100.0,
    });
    assert_eq!(odd.draws, 0);
    assert!(!odd.low_efficiency);
}

#[test]
fn form_reads_results_from_team_side() {
    let results = vec![
        MatchResult {
            home_team: "X".into(),
            away_team: "Y".into(),
            home_score: Some(0),
            away_score: Some(3),
        },
        MatchResult {
            home_team: "Y".into(),
            away_team: "Z".into(),
            home_score: Some(1),
            away_score: Some(1),
        },
        MatchResult {
            home_team: "Y".into(),
            away_team: "W".into(),
            home_score: None,
            away_score: Some(1),
        },
    ];
    assert_eq!(form_marks("Y", &results), vec![FormMark::Win, FormMark::Draw]);
    let letters: String = form_marks("Y", &results).iter().map(|m| m.letter()).collect();
    assert_eq!(letters, "WD");
}

#[test]
fn serie_b_view_uses_promotion_table() {
    let view = serie_b_view();
    assert_eq!(view.qualification_label, "Promotion");
    assert_eq!(view.qualification.len(), 5);
    assert_eq!(view.qualification[0].team, "Coritiba");
    assert_eq!(view.qualification[4].level, BarLevel::Low);
    assert_eq!(view.relegation[0].team, "Amazonas");
    assert_eq!(view.next_round, Some(26));
}

#[test]
fn serie_b_fixtures_are_deduped_and_resolved() {
    let view = serie_b_view();
    let rows = view.fixtures.as_ref().expect("fixtures");
    let names: Vec<String> = rows
        .iter()
        .map(|r| format!("{} {}-{}", r.date, r.home_team, r.away_team))
        .collect();
    assert_eq!(
        names,
        vec![
            "2025-08-23 Amazonas-Paysandu",
            "2025-08-24 Coritiba-Goiás",
            "2025-08-30 Remo-Coritiba",
        ]
    );
    assert_eq!(view.skipped_fixtures, 1);

    assert_eq!(rows[0].outcome.source, ProbabilitySource::Estimated);
    assert_float_absolute_eq!(rows[0].outcome.dist.home, 0.45, 1e-9);

    assert_eq!(rows[1].outcome.source, ProbabilitySource::Upstream);
    assert_float_absolute_eq!(rows[1].outcome.dist.home, 0.48, 1e-9);
    assert_float_absolute_eq!(rows[1].outcome.dist.away, 0.24, 1e-9);
    assert_eq!(rows[1].source_team, "Coritiba");
}

#[test]
fn serie_b_stats_sections() {
    let view = serie_b_view();
    assert_eq!(view.home_away[0].home.draws, 3);
    assert!(!view.home_away[0].away.low_efficiency);
    assert!(view.home_away[1].home.low_efficiency);

    let coritiba = &view.form[0];
    assert_eq!(coritiba.team, "Coritiba");
    assert_eq!(
        coritiba.marks,
        vec![FormMark::Win, FormMark::Draw, FormMark::Loss]
    );
    assert!(view.form[1].marks.is_empty());
}

#[test]
fn document_without_fixtures_reports_none() {
    let doc = parse_league_document(r#"{"proximos_jogos": {}}"#).expect("valid document");
    let cfg = AppConfig::default().league(League::SerieA);
    let view = LeagueView::build(&doc, &cfg, &OutcomeEstimator::default(), SourceOrder::Document);
    assert_eq!(view.fixtures, Err(FixtureError::NoFixtures));
    assert_eq!(view.qualification_label, "Libertadores");
}
