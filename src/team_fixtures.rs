use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::error::FixtureError;
use crate::win_prob::OutcomeDistribution;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    /// Wall-clock calendar date, never shifted across time zones.
    pub date: NaiveDate,
    pub kickoff_time: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub precomputed: Option<OutcomeDistribution>,
}

/// Two fixtures with the same key are the same real-world match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixtureKey {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
}

impl Fixture {
    pub fn key(&self) -> FixtureKey {
        FixtureKey {
            date: self.date,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
        }
    }
}

/// A deduplicated fixture plus the team list it was first found under.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledFixture {
    pub source_team: String,
    pub fixture: Fixture,
}

/// Order in which per-team lists are walked. First-seen wins on duplicates,
/// so this decides which copy of a shared fixture survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceOrder {
    #[default]
    Document,
    Alphabetical,
}

impl SourceOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "document" | "doc" | "insertion" => Some(SourceOrder::Document),
            "alphabetical" | "alpha" | "sorted" => Some(SourceOrder::Alphabetical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamFixtureLists {
    pub teams: Vec<(String, Vec<Fixture>)>,
    /// Records dropped for missing teams or an unusable date.
    pub skipped: usize,
}

impl TeamFixtureLists {
    pub fn total(&self) -> usize {
        self.teams.iter().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Malformed input degrades to an empty mapping rather than an error.
pub fn parse_team_fixtures_json(raw: &str) -> TeamFixtureLists {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return TeamFixtureLists::default();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(v) => collect_team_fixtures(&v),
        Err(err) => {
            debug!(%err, "fixture mapping is not valid json");
            TeamFixtureLists::default()
        }
    }
}

pub fn collect_team_fixtures(value: &Value) -> TeamFixtureLists {
    let Some(map) = value.as_object() else {
        return TeamFixtureLists::default();
    };

    let mut out = TeamFixtureLists::default();
    for (team, games) in map {
        let Some(arr) = games.as_array() else {
            continue;
        };
        let mut list = Vec::with_capacity(arr.len());
        for item in arr {
            match parse_fixture(item) {
                Some(f) => list.push(f),
                None => {
                    out.skipped += 1;
                    debug!(team = %team, "skipping fixture without teams or date");
                }
            }
        }
        out.teams.push((team.clone(), list));
    }
    out
}

pub fn parse_fixture(v: &Value) -> Option<Fixture> {
    let date = v
        .get("dateEvent")
        .and_then(|x| x.as_str())
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())?;
    let home_team = non_empty_str(v.get("strHomeTeam"))?;
    let away_team = non_empty_str(v.get("strAwayTeam"))?;
    let kickoff_time = non_empty_str(v.get("strTime"));
    let precomputed = v.get("probabilidades").and_then(parse_distribution);

    Some(Fixture {
        date,
        kickoff_time,
        home_team,
        away_team,
        precomputed,
    })
}

fn parse_distribution(v: &Value) -> Option<OutcomeDistribution> {
    let home = number(v.get("home")?)?;
    let draw = number(v.get("draw")?)?;
    let away = number(v.get("away")?)?;
    let dist = OutcomeDistribution::new(home, draw, away);
    if dist.sum() <= 0.0 {
        return None;
    }
    Some(dist)
}

fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    let s = v?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Flattens per-team lists into one date-ordered sequence with each real
/// match appearing once.
pub fn dedupe_and_order(
    per_team: &[(String, Vec<Fixture>)],
    order: SourceOrder,
) -> Result<Vec<ScheduledFixture>, FixtureError> {
    let mut sources: Vec<&(String, Vec<Fixture>)> = per_team.iter().collect();
    if order == SourceOrder::Alphabetical {
        sources.sort_by(|a, b| a.0.cmp(&b.0));
    }

    let mut seen: HashSet<FixtureKey> = HashSet::new();
    let mut out = Vec::new();
    for (team, games) in sources {
        for game in games {
            if !seen.insert(game.key()) {
                continue;
            }
            out.push(ScheduledFixture {
                source_team: team.clone(),
                fixture: game.clone(),
            });
        }
    }

    if out.is_empty() {
        return Err(FixtureError::NoFixtures);
    }

    // Stable: same-day fixtures keep their flattening order.
    out.sort_by_key(|f| f.fixture.date);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixture_requires_date_and_teams() {
        assert!(parse_fixture(&json!({"strHomeTeam": "A", "strAwayTeam": "B"})).is_none());
        assert!(
            parse_fixture(&json!({"dateEvent": "2025-13-40", "strHomeTeam": "A", "strAwayTeam": "B"}))
                .is_none()
        );
        assert!(
            parse_fixture(&json!({"dateEvent": "2025-05-01", "strHomeTeam": " ", "strAwayTeam": "B"}))
                .is_none()
        );
        let f = parse_fixture(&json!({
            "dateEvent": "2025-05-01",
            "strTime": "",
            "strHomeTeam": "A",
            "strAwayTeam": "B"
        }))
        .expect("valid fixture");
        assert_eq!(f.kickoff_time, None);
        assert_eq!(f.precomputed, None);
    }

    #[test]
    fn broken_probabilities_fall_back_to_none() {
        let f = parse_fixture(&json!({
            "dateEvent": "2025-05-01",
            "strHomeTeam": "A",
            "strAwayTeam": "B",
            "probabilidades": {"home": "abc", "draw": 30, "away": 20}
        }))
        .expect("valid fixture");
        assert_eq!(f.precomputed, None);

        let f = parse_fixture(&json!({
            "dateEvent": "2025-05-01",
            "strHomeTeam": "A",
            "strAwayTeam": "B",
            "probabilidades": {"home": "45.5", "draw": 30, "away": 24.5}
        }))
        .expect("valid fixture");
        assert_eq!(f.precomputed, Some(OutcomeDistribution::new(45.5, 30.0, 24.5)));
    }

    #[test]
    fn source_order_parses_aliases() {
        assert_eq!(SourceOrder::parse("Document"), Some(SourceOrder::Document));
        assert_eq!(SourceOrder::parse(" alpha "), Some(SourceOrder::Alphabetical));
        assert_eq!(SourceOrder::parse("random"), None);
    }
}
