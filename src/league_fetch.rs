use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::info;

use crate::error::LoadError;
use crate::http_client::http_client;
use crate::league::DocumentSource;
use crate::state::{
    HomeAwaySplit, LeagueDocument, MatchResult, ProbabilityTables, Standing, SummaryStats,
    TeamProbability, VenueRecord,
};
use crate::team_fixtures::{TeamFixtureLists, collect_team_fixtures};

pub fn fetch_league_document(source: &DocumentSource) -> Result<LeagueDocument, LoadError> {
    let body = read_source(source).map_err(LoadError::Unavailable)?;
    let doc = parse_league_document(&body)?;
    info!(source = %source.describe(), standings = doc.standings.len(), "league document loaded");
    Ok(doc)
}

fn read_source(source: &DocumentSource) -> Result<String> {
    match source {
        DocumentSource::File(path) => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
        }
        DocumentSource::Url(url) => fetch_text(url),
    }
}

fn fetch_text(url: &str) -> Result<String> {
    let client = http_client()?;
    let url = cache_busted_url(url, unix_millis());
    let resp = client.get(&url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    Ok(body)
}

/// Appends a `t=<millis>` parameter so no intermediary serves a stale copy.
pub fn cache_busted_url(url: &str, millis: u128) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}t={millis}")
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

pub fn parse_league_document(raw: &str) -> Result<LeagueDocument, LoadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(LoadError::Unavailable(anyhow!("empty league document")));
    }

    let root: Value = serde_json::from_str(trimmed)
        .context("invalid league json")
        .map_err(LoadError::Malformed)?;
    let Some(obj) = root.as_object() else {
        return Err(LoadError::Malformed(anyhow!("league document is not an object")));
    };
    // The serving API answers `{"error": "..."}` when it has no document.
    if let Some(err) = obj.get("error").and_then(|v| v.as_str()) {
        return Err(LoadError::Unavailable(anyhow!("upstream error: {err}")));
    }

    let probabilities = ProbabilityTables {
        title: parse_probability_table(root.get("titulo")),
        libertadores: parse_probability_table(root.get("libertadores")),
        promotion: parse_probability_table(root.get("acesso_serie_a")),
        relegation: parse_probability_table(root.get("rebaixamento")),
    };

    let fixtures = root
        .get("proximos_jogos")
        .map(collect_team_fixtures)
        .unwrap_or_else(TeamFixtureLists::default);

    let advanced = root.get("estatisticas_avancadas").unwrap_or(&Value::Null);

    Ok(LeagueDocument {
        probabilities,
        standings: parse_standings(root.get("classificacao")),
        summary: root.get("estatisticas").and_then(parse_summary),
        fixtures,
        next_round: root.get("proxima_rodada").and_then(as_u32),
        updated_at: root
            .get("ultima_atualizacao")
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp),
        home_away: parse_home_away(advanced.get("mandante_visitante")),
        recent_results: parse_recent_results(advanced.get("times_stats")),
        last_rounds: parse_last_rounds(advanced.get("ultimas_rodadas")),
    })
}

fn parse_probability_table(value: Option<&Value>) -> Vec<TeamProbability> {
    let Some(map) = value.and_then(|v| v.as_object()) else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(team, v)| {
            let pct = match v {
                Value::Null => 0.0,
                other => as_f64(other)?,
            };
            Some(TeamProbability {
                team: team.clone(),
                pct: if pct.is_finite() { pct } else { 0.0 },
            })
        })
        .collect()
}

fn parse_standings(value: Option<&Value>) -> Vec<Standing> {
    let Some(arr) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    arr.iter().filter_map(parse_standing).collect()
}

fn parse_standing(v: &Value) -> Option<Standing> {
    let team = pick_string(v, &["time", "team"])?;
    let goals_for = pick_u32(v, &["gols_pro"]).unwrap_or(0);
    let goals_against = pick_u32(v, &["gols_contra"]).unwrap_or(0);
    let goal_diff = v
        .get("saldo_gols")
        .and_then(as_i64)
        .unwrap_or(i64::from(goals_for) - i64::from(goals_against));
    Some(Standing {
        team,
        points: pick_u32(v, &["pontos"]).unwrap_or(0),
        played: pick_u32(v, &["jogos"]).unwrap_or(0),
        wins: pick_u32(v, &["vitorias"]).unwrap_or(0),
        draws: pick_u32(v, &["empates"]).unwrap_or(0),
        losses: pick_u32(v, &["derrotas"]).unwrap_or(0),
        goals_for,
        goals_against,
        goal_diff: saturate_i32(goal_diff),
    })
}

fn saturate_i32(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX })
}

fn parse_summary(v: &Value) -> Option<SummaryStats> {
    v.as_object()?;
    Some(SummaryStats {
        total_games: v.get("total_jogos").and_then(as_i64).unwrap_or(0).max(0) as u64,
        avg_goals: v.get("media_gols").and_then(as_f64).unwrap_or(0.0),
        simulations: v.get("simulacoes").and_then(as_i64).unwrap_or(0).max(0) as u64,
    })
}

fn parse_home_away(value: Option<&Value>) -> Vec<HomeAwaySplit> {
    let Some(arr) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    arr.iter()
        .filter_map(|v| {
            let team = pick_string(v, &["time", "team"])?;
            Some(HomeAwaySplit {
                team,
                home: parse_venue(v, "casa"),
                away: parse_venue(v, "fora"),
            })
        })
        .collect()
}

fn parse_venue(v: &Value, suffix: &str) -> VenueRecord {
    let field = |name: &str| {
        let key = format!("{name}_{suffix}");
        pick_u32(v, &[key.as_str()]).unwrap_or(0)
    };
    VenueRecord {
        played: field("jogos"),
        wins: field("vitorias"),
        losses: field("derrotas"),
        points: field("pontos"),
        efficiency: v
            .get(format!("aproveitamento_{suffix}").as_str())
            .and_then(as_f64)
            .unwrap_or(0.0),
    }
}

fn parse_recent_results(value: Option<&Value>) -> Vec<(String, Vec<MatchResult>)> {
    let Some(map) = value.and_then(|v| v.as_object()) else {
        return Vec::new();
    };
    map.iter()
        .map(|(team, stats)| (team.clone(), parse_results(stats.get("ultimos_5_jogos"))))
        .collect()
}

fn parse_last_rounds(value: Option<&Value>) -> Vec<(String, Vec<MatchResult>)> {
    let Some(map) = value.and_then(|v| v.as_object()) else {
        return Vec::new();
    };
    map.iter()
        .map(|(label, games)| (label.clone(), parse_results(Some(games))))
        .collect()
}

fn parse_results(value: Option<&Value>) -> Vec<MatchResult> {
    let Some(arr) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    arr.iter().filter_map(parse_result).collect()
}

fn parse_result(v: &Value) -> Option<MatchResult> {
    Some(MatchResult {
        home_team: pick_string(v, &["strHomeTeam"])?,
        away_team: pick_string(v, &["strAwayTeam"])?,
        home_score: pick_u32(v, &["intHomeScore"]),
        away_score: pick_u32(v, &["intAwayScore"]),
    })
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = value.get(*key).and_then(|v| v.as_str()) {
            let s = s.trim();
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(num) = value.get(*key).and_then(as_u32) {
            return Some(num);
        }
    }
    None
}

fn as_u32(v: &Value) -> Option<u32> {
    if let Some(num) = v.as_u64() {
        return u32::try_from(num).ok();
    }
    v.as_str()?.trim().parse::<u32>().ok()
}

fn as_i64(v: &Value) -> Option<i64> {
    if let Some(num) = v.as_i64() {
        return Some(num);
    }
    if let Some(num) = v.as_f64() {
        return Some(num.round() as i64);
    }
    v.as_str()?.trim().parse::<i64>().ok()
}

fn as_f64(v: &Value) -> Option<f64> {
    if let Some(num) = v.as_f64() {
        return Some(num);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_buster_respects_existing_query() {
        assert_eq!(cache_busted_url("https://x.org/a.json", 42), "https://x.org/a.json?t=42");
        assert_eq!(cache_busted_url("https://x.org/a?v=1", 7), "https://x.org/a?v=1&t=7");
    }

    #[test]
    fn scores_accept_numbers_and_strings() {
        let v: Value = serde_json::from_str(
            r#"{"strHomeTeam": "A", "strAwayTeam": "B", "intHomeScore": "2", "intAwayScore": 1}"#,
        )
        .expect("json");
        let r = parse_result(&v).expect("result");
        assert_eq!(r.home_score, Some(2));
        assert_eq!(r.away_score, Some(1));
    }

    #[test]
    fn huge_goal_counts_saturate_goal_diff() {
        let v: Value = serde_json::from_str(
            r#"{"time": "X", "gols_pro": 2147483648, "gols_contra": 1}"#,
        )
        .expect("json");
        assert_eq!(parse_standing(&v).expect("standing").goal_diff, i32::MAX);

        let v: Value = serde_json::from_str(
            r#"{"time": "X", "gols_pro": 0, "gols_contra": 4294967295}"#,
        )
        .expect("json");
        assert_eq!(parse_standing(&v).expect("standing").goal_diff, i32::MIN);

        let v: Value = serde_json::from_str(r#"{"time": "X", "saldo_gols": -99999999999}"#)
            .expect("json");
        assert_eq!(parse_standing(&v).expect("standing").goal_diff, i32::MIN);
    }

    #[test]
    fn timestamps_with_and_without_fraction() {
        assert!(parse_timestamp("2025-08-20T10:11:12.123456").is_some());
        assert!(parse_timestamp("2025-08-20T10:11:12").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
