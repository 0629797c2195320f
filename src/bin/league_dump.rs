use std::io;
use std::path::PathBuf;

use anyhow::{Context, anyhow};

use brasileirao_terminal::error::FixtureError;
use brasileirao_terminal::format::{
    format_fraction, format_goal_diff, format_naive_date, format_percentage, kickoff_label,
};
use brasileirao_terminal::league::{AppConfig, DocumentSource, League};
use brasileirao_terminal::league_fetch::fetch_league_document;
use brasileirao_terminal::tables::LeagueView;
use brasileirao_terminal::win_prob::{OutcomeEstimator, ProbabilitySource};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let mut args = std::env::args().skip(1);
    let league = match args.next() {
        Some(raw) => League::parse(&raw).ok_or_else(|| anyhow!("unknown league '{raw}'"))?,
        None => League::SerieA,
    };

    let config = AppConfig::from_env();
    let mut cfg = config.league(league);
    if let Some(path) = args.next() {
        cfg.source = DocumentSource::File(PathBuf::from(path));
    }

    let doc = fetch_league_document(&cfg.source)
        .with_context(|| format!("{} from {}", league.label(), cfg.source.describe()))?;
    let estimator = OutcomeEstimator::new(config.tiers.clone());
    let view = LeagueView::build(&doc, &cfg, &estimator, config.source_order);

    print_fixtures(league, &view);
    println!();
    print_probabilities(&view);
    println!();
    print_standings(&view);
    Ok(())
}

fn print_fixtures(league: League, view: &LeagueView) {
    match view.next_round {
        Some(round) => println!("{} - round {round}", league.label()),
        None => println!("{}", league.label()),
    }
    let rows = match &view.fixtures {
        Ok(rows) => rows,
        Err(FixtureError::NoFixtures) => {
            println!("No upcoming fixtures");
            return;
        }
    };
    for row in rows {
        let d = row.outcome.dist;
        let src = match row.outcome.source {
            ProbabilitySource::Upstream => "sim",
            ProbabilitySource::Estimated => "est",
        };
        println!(
            "{} {:>5}  {:<40} {:>6} {:>6} {:>6}  {src}",
            format_naive_date(row.date),
            kickoff_label(row.kickoff_time.as_deref()),
            format!("{} vs {}", row.home_team, row.away_team),
            format_fraction(d.home),
            format_fraction(d.draw),
            format_fraction(d.away),
        );
    }
    if view.skipped_fixtures > 0 {
        println!("({} fixture records skipped)", view.skipped_fixtures);
    }
}

fn print_probabilities(view: &LeagueView) {
    let panels = [
        ("Title", &view.title),
        (view.qualification_label, &view.qualification),
        ("Relegation", &view.relegation),
    ];
    for (label, rows) in panels {
        println!("{label}:");
        for r in rows {
            println!("  {:>2} {:<24} {:>6}", r.position, r.team, format_percentage(r.pct));
        }
    }
}

fn print_standings(view: &LeagueView) {
    println!(
        "{:>3}  {:<24} {:>4} {:>3} {:>3} {:>3} {:>3} {:>5}",
        "Pos", "Team", "Pts", "P", "W", "D", "L", "GD"
    );
    for (i, s) in view.standings.iter().enumerate() {
        println!(
            "{:>3}  {:<24} {:>4} {:>3} {:>3} {:>3} {:>3} {:>5}",
            i + 1,
            s.team,
            s.points,
            s.played,
            s.wins,
            s.draws,
            s.losses,
            format_goal_diff(s.goal_diff)
        );
    }
}
