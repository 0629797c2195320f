use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::team_fixtures::SourceOrder;
use crate::tiers::TierTable;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_RELOAD_SECS: u64 = 300;
const MIN_RELOAD_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum League {
    SerieA,
    SerieB,
}

impl League {
    pub fn slug(self) -> &'static str {
        match self {
            League::SerieA => "serie_a",
            League::SerieB => "serie_b",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            League::SerieA => "Série A",
            League::SerieB => "Série B",
        }
    }

    pub fn next(self) -> Self {
        match self {
            League::SerieA => League::SerieB,
            League::SerieB => League::SerieA,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "serie_a" | "a" => Some(League::SerieA),
            "serie_b" | "b" => Some(League::SerieB),
            _ => None,
        }
    }
}

/// Which third probability table a division shows next to title and relegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualificationKind {
    Libertadores,
    Promotion,
}

impl QualificationKind {
    pub fn label(self) -> &'static str {
        match self {
            QualificationKind::Libertadores => "Libertadores",
            QualificationKind::Promotion => "Promotion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    File(PathBuf),
    Url(String),
}

impl DocumentSource {
    pub fn describe(&self) -> String {
        match self {
            DocumentSource::File(path) => path.display().to_string(),
            DocumentSource::Url(url) => url.clone(),
        }
    }
}

/// Everything the dashboard needs to present one division.
#[derive(Debug, Clone)]
pub struct LeagueConfig {
    pub league: League,
    pub source: DocumentSource,
    pub qualification: QualificationKind,
    pub title_limit: usize,
    pub qualification_limit: usize,
    pub relegation_limit: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub data_url: Option<String>,
    pub tiers: TierTable,
    pub source_order: SourceOrder,
    pub reload_every: Duration,
    pub log_file: Option<PathBuf>,
    /// Problems found while reading the environment, surfaced in the log panel.
    pub warnings: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            data_url: None,
            tiers: TierTable::brasileirao(),
            source_order: SourceOrder::Document,
            reload_every: Duration::from_secs(DEFAULT_RELOAD_SECS),
            log_file: None,
            warnings: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(dir) = env_non_empty("APP_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        cfg.data_url = env_non_empty("APP_DATA_URL").map(|u| u.trim_end_matches('/').to_string());
        cfg.log_file = env_non_empty("APP_LOG_FILE").map(PathBuf::from);

        if let Some(raw) = env_non_empty("APP_SOURCE_ORDER") {
            match SourceOrder::parse(&raw) {
                Some(order) => cfg.source_order = order,
                None => cfg.warn(format!("[WARN] Unknown APP_SOURCE_ORDER '{raw}', using document order")),
            }
        }

        let reload_secs = env::var("APP_RELOAD_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RELOAD_SECS)
            .max(MIN_RELOAD_SECS);
        cfg.reload_every = Duration::from_secs(reload_secs);

        if let Some(path) = env_non_empty("APP_TIERS_FILE") {
            match TierTable::load(&PathBuf::from(&path)) {
                Ok(tiers) => cfg.tiers = tiers,
                Err(err) => cfg.warn(format!("[WARN] Tier table {path}: {err:#}; using defaults")),
            }
        }

        cfg
    }

    fn warn(&mut self, msg: String) {
        warn!("{msg}");
        self.warnings.push(msg);
    }

    pub fn league(&self, league: League) -> LeagueConfig {
        let file = format!("web_{}.json", league.slug());
        let source = match &self.data_url {
            Some(base) => DocumentSource::Url(format!("{base}/{file}")),
            None => DocumentSource::File(self.data_dir.join(file)),
        };
        let qualification = match league {
            League::SerieA => QualificationKind::Libertadores,
            League::SerieB => QualificationKind::Promotion,
        };
        LeagueConfig {
            league,
            source,
            qualification,
            title_limit: 10,
            qualification_limit: 10,
            relegation_limit: 8,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_sources_follow_data_dir_or_url() {
        let mut cfg = AppConfig::default();
        let a = cfg.league(League::SerieA);
        assert_eq!(a.source, DocumentSource::File(PathBuf::from("data/web_serie_a.json")));
        assert_eq!(a.qualification, QualificationKind::Libertadores);

        cfg.data_url = Some("https://example.org/data".to_string());
        let b = cfg.league(League::SerieB);
        assert_eq!(
            b.source,
            DocumentSource::Url("https://example.org/data/web_serie_b.json".to_string())
        );
        assert_eq!(b.qualification, QualificationKind::Promotion);
    }

    #[test]
    fn league_parse_accepts_slugs() {
        assert_eq!(League::parse("serie-a"), Some(League::SerieA));
        assert_eq!(League::parse("SERIE_B"), Some(League::SerieB));
        assert_eq!(League::parse("c"), None);
        assert_eq!(League::SerieA.next(), League::SerieB);
    }
}
