use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

use chrono::NaiveDateTime;

use crate::league::League;
use crate::tables::LeagueView;
use crate::team_fixtures::TeamFixtureLists;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Probabilities,
    Standings,
    Fixtures,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Probabilities, Tab::Standings, Tab::Fixtures, Tab::Stats];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Probabilities => "Probabilities",
            Tab::Standings => "Standings",
            Tab::Fixtures => "Fixtures",
            Tab::Stats => "Stats",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Probabilities => Tab::Standings,
            Tab::Standings => Tab::Fixtures,
            Tab::Fixtures => Tab::Stats,
            Tab::Stats => Tab::Probabilities,
        }
    }
}

#[derive(Debug, Clone)]
pub enum LeagueStatus {
    Loading,
    Loaded {
        view: Box<LeagueView>,
        loaded_at: SystemTime,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub league: League,
    pub tab: Tab,
    pub scroll: u16,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub leagues: HashMap<League, LeagueStatus>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            league: League::SerieA,
            tab: Tab::Probabilities,
            scroll: 0,
            help_overlay: false,
            logs: VecDeque::new(),
            leagues: HashMap::new(),
        }
    }

    pub fn status(&self) -> Option<&LeagueStatus> {
        self.leagues.get(&self.league)
    }

    pub fn current_view(&self) -> Option<&LeagueView> {
        match self.status()? {
            LeagueStatus::Loaded { view, .. } => Some(view),
            _ => None,
        }
    }

    /// True when nothing has been requested yet for the selected league.
    pub fn needs_load(&self) -> bool {
        self.status().is_none()
    }

    pub fn cycle_tab(&mut self) {
        self.set_tab(self.tab.next());
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }

    pub fn toggle_league(&mut self) {
        self.league = self.league.next();
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamProbability {
    pub team: String,
    /// Percentage scale, as written by the simulation (0..100).
    pub pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbabilityTables {
    pub title: Vec<TeamProbability>,
    pub libertadores: Vec<TeamProbability>,
    pub promotion: Vec<TeamProbability>,
    pub relegation: Vec<TeamProbability>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Standing {
    pub team: String,
    pub points: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryStats {
    pub total_games: u64,
    pub avg_goals: f64,
    pub simulations: u64,
}

/// Home or away half of a split. Draws are not shipped upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VenueRecord {
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeAwaySplit {
    pub team: String,
    pub home: VenueRecord,
    pub away: VenueRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueDocument {
    pub probabilities: ProbabilityTables,
    pub standings: Vec<Standing>,
    pub summary: Option<SummaryStats>,
    pub fixtures: TeamFixtureLists,
    pub next_round: Option<u32>,
    pub updated_at: Option<NaiveDateTime>,
    pub home_away: Vec<HomeAwaySplit>,
    pub recent_results: Vec<(String, Vec<MatchResult>)>,
    pub last_rounds: Vec<(String, Vec<MatchResult>)>,
}

#[derive(Debug, Clone)]
pub enum Delta {
    LoadStarted(League),
    SetLeagueView {
        league: League,
        view: Box<LeagueView>,
    },
    LoadFailed {
        league: League,
        reason: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Load { league: League },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::LoadStarted(league) => {
            // A reload keeps the current view on screen until it lands.
            let loaded = matches!(state.leagues.get(&league), Some(LeagueStatus::Loaded { .. }));
            if !loaded {
                state.leagues.insert(league, LeagueStatus::Loading);
            }
        }
        Delta::SetLeagueView { league, view } => {
            let fixtures = view.fixtures.as_ref().map(|rows| rows.len()).unwrap_or(0);
            state.push_log(format!(
                "[INFO] {} loaded: {} standings rows, {} fixtures",
                league.label(),
                view.standings.len(),
                fixtures
            ));
            if view.skipped_fixtures > 0 {
                state.push_log(format!(
                    "[WARN] {} fixture records skipped in {}",
                    view.skipped_fixtures,
                    league.label()
                ));
            }
            state.leagues.insert(
                league,
                LeagueStatus::Loaded {
                    view,
                    loaded_at: SystemTime::now(),
                },
            );
        }
        Delta::LoadFailed { league, reason } => {
            state.push_log(format!("[WARN] {} load failed: {reason}", league.label()));
            state.leagues.insert(league, LeagueStatus::Failed { reason });
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
