use chrono::{NaiveDate, NaiveDateTime};

use crate::error::FixtureError;
use crate::league::{LeagueConfig, QualificationKind};
use crate::state::{
    HomeAwaySplit, LeagueDocument, MatchResult, Standing, SummaryStats, TeamProbability,
    VenueRecord,
};
use crate::team_fixtures::{SourceOrder, TeamFixtureLists, dedupe_and_order};
use crate::win_prob::{OutcomeEstimator, ResolvedOutcome};

const LOW_EFFICIENCY: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLevel {
    Low,
    Medium,
    High,
}

pub fn bar_level(pct: f64) -> BarLevel {
    if !pct.is_finite() {
        return BarLevel::Low;
    }
    if pct >= 70.0 {
        BarLevel::High
    } else if pct >= 30.0 {
        BarLevel::Medium
    } else {
        BarLevel::Low
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityRow {
    pub position: usize,
    pub team: String,
    pub pct: f64,
    pub level: BarLevel,
}

/// Highest probability first; ties keep document order.
pub fn probability_rows(entries: &[TeamProbability], limit: usize) -> Vec<ProbabilityRow> {
    let mut sorted: Vec<&TeamProbability> = entries.iter().collect();
    sorted.sort_by(|a, b| sanitize(b.pct).total_cmp(&sanitize(a.pct)));
    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, e)| {
            let pct = sanitize(e.pct);
            ProbabilityRow {
                position: i + 1,
                team: e.team.clone(),
                pct,
                level: bar_level(pct),
            }
        })
        .collect()
}

fn sanitize(pct: f64) -> f64 {
    if pct.is_finite() { pct } else { 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VenueRow {
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
    pub efficiency: f64,
    pub low_efficiency: bool,
}

impl From<&VenueRecord> for VenueRow {
    fn from(r: &VenueRecord) -> Self {
        Self {
            played: r.played,
            wins: r.wins,
            draws: r.played.saturating_sub(r.wins).saturating_sub(r.losses),
            losses: r.losses,
            points: r.points,
            efficiency: r.efficiency,
            low_efficiency: r.efficiency < LOW_EFFICIENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomeAwayRow {
    pub team: String,
    pub home: VenueRow,
    pub away: VenueRow,
}

pub fn home_away_rows(splits: &[HomeAwaySplit]) -> Vec<HomeAwayRow> {
    splits
        .iter()
        .map(|s| HomeAwayRow {
            team: s.team.clone(),
            home: VenueRow::from(&s.home),
            away: VenueRow::from(&s.away),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMark {
    Win,
    Draw,
    Loss,
}

impl FormMark {
    pub fn letter(self) -> char {
        match self {
            FormMark::Win => 'W',
            FormMark::Draw => 'D',
            FormMark::Loss => 'L',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamForm {
    pub team: String,
    /// Empty means no recent results; shown as a single "no data" marker.
    pub marks: Vec<FormMark>,
}

/// Results are read from `team`'s side: home when it is the listed home team.
pub fn form_marks(team: &str, results: &[MatchResult]) -> Vec<FormMark> {
    results
        .iter()
        .filter_map(|r| {
            let (h, a) = (r.home_score?, r.away_score?);
            let (ours, theirs) = if r.home_team == team { (h, a) } else { (a, h) };
            Some(match ours.cmp(&theirs) {
                std::cmp::Ordering::Greater => FormMark::Win,
                std::cmp::Ordering::Equal => FormMark::Draw,
                std::cmp::Ordering::Less => FormMark::Loss,
            })
        })
        .collect()
}

pub fn form_rows(recent: &[(String, Vec<MatchResult>)]) -> Vec<TeamForm> {
    recent
        .iter()
        .map(|(team, results)| TeamForm {
            team: team.clone(),
            marks: form_marks(team, results),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRow {
    pub date: NaiveDate,
    pub kickoff_time: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub source_team: String,
    pub outcome: ResolvedOutcome,
}

pub fn fixture_rows(
    lists: &TeamFixtureLists,
    estimator: &OutcomeEstimator,
    order: SourceOrder,
) -> Result<Vec<FixtureRow>, FixtureError> {
    let ordered = dedupe_and_order(&lists.teams, order)?;
    Ok(ordered
        .into_iter()
        .map(|s| {
            let f = s.fixture;
            let outcome = estimator.resolve(f.precomputed.as_ref(), &f.home_team, &f.away_team);
            FixtureRow {
                date: f.date,
                kickoff_time: f.kickoff_time,
                home_team: f.home_team,
                away_team: f.away_team,
                source_team: s.source_team,
                outcome,
            }
        })
        .collect())
}

/// Everything one division's dashboard displays, derived once per load.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueView {
    pub title: Vec<ProbabilityRow>,
    pub qualification_label: &'static str,
    pub qualification: Vec<ProbabilityRow>,
    pub relegation: Vec<ProbabilityRow>,
    pub standings: Vec<Standing>,
    pub summary: Option<SummaryStats>,
    pub fixtures: Result<Vec<FixtureRow>, FixtureError>,
    pub skipped_fixtures: usize,
    pub next_round: Option<u32>,
    pub updated_at: Option<NaiveDateTime>,
    pub home_away: Vec<HomeAwayRow>,
    pub form: Vec<TeamForm>,
    pub last_rounds: Vec<(String, Vec<MatchResult>)>,
}

impl LeagueView {
    pub fn build(
        doc: &LeagueDocument,
        cfg: &LeagueConfig,
        estimator: &OutcomeEstimator,
        order: SourceOrder,
    ) -> Self {
        let probs = &doc.probabilities;
        let qualification = match cfg.qualification {
            QualificationKind::Libertadores => &probs.libertadores,
            QualificationKind::Promotion => &probs.promotion,
        };
        Self {
            title: probability_rows(&probs.title, cfg.title_limit),
            qualification_label: cfg.qualification.label(),
            qualification: probability_rows(qualification, cfg.qualification_limit),
            relegation: probability_rows(&probs.relegation, cfg.relegation_limit),
            standings: doc.standings.clone(),
            summary: doc.summary,
            fixtures: fixture_rows(&doc.fixtures, estimator, order),
            skipped_fixtures: doc.fixtures.skipped,
            next_round: doc.next_round,
            updated_at: doc.updated_at,
            home_away: home_away_rows(&doc.home_away),
            form: form_rows(&doc.recent_results),
            last_rounds: doc.last_rounds.clone(),
        }
    }
}
