pub mod error;
pub mod format;
pub mod http_client;
pub mod league;
pub mod league_fetch;
pub mod provider;
pub mod state;
pub mod tables;
pub mod team_fixtures;
pub mod tiers;
pub mod win_prob;
