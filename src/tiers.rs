use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_STRONG: &[&str] = &[
    "Flamengo",
    "Palmeiras",
    "Cruzeiro",
    "São Paulo",
    "Corinthians",
    "Atlético Mineiro",
    "Grêmio",
    "Internacional",
];

const DEFAULT_MEDIUM: &[&str] = &[
    "Botafogo",
    "Fluminense",
    "Santos",
    "Bragantino",
    "Vasco da Gama",
    "Bahia",
    "Fortaleza",
    "Ceará",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamTier {
    Strong,
    Medium,
    Weak,
}

impl TeamTier {
    pub fn strength(self) -> f64 {
        match self {
            TeamTier::Strong => 0.8,
            TeamTier::Medium => 0.6,
            TeamTier::Weak => 0.4,
        }
    }
}

/// Closed-world team -> tier lookup. Anything not listed is `Weak`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierTable {
    tiers: HashMap<String, TeamTier>,
}

impl TierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from two membership lists. A name present in both
    /// lists is Strong, matching the lookup order.
    pub fn from_lists(strong: &[&str], medium: &[&str]) -> Self {
        let mut table = Self::new();
        for name in medium {
            table.insert(*name, TeamTier::Medium);
        }
        for name in strong {
            table.insert(*name, TeamTier::Strong);
        }
        table
    }

    pub fn brasileirao() -> Self {
        Self::from_lists(DEFAULT_STRONG, DEFAULT_MEDIUM)
    }

    pub fn insert(&mut self, team: impl Into<String>, tier: TeamTier) {
        self.tiers.insert(team.into(), tier);
    }

    pub fn with_team(mut self, team: impl Into<String>, tier: TeamTier) -> Self {
        self.insert(team, tier);
        self
    }

    pub fn tier(&self, team: &str) -> TeamTier {
        self.tiers.get(team).copied().unwrap_or(TeamTier::Weak)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn parse_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw.trim()).context("invalid tier table json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read tier table {}", path.display()))?;
        Self::parse_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_team_is_weak() {
        let table = TierTable::brasileirao();
        assert_eq!(table.tier("Mirassol"), TeamTier::Weak);
        assert_eq!(table.tier(""), TeamTier::Weak);
    }

    #[test]
    fn default_lists_are_disjoint() {
        let table = TierTable::brasileirao();
        assert_eq!(table.len(), DEFAULT_STRONG.len() + DEFAULT_MEDIUM.len());
        assert_eq!(table.tier("Flamengo"), TeamTier::Strong);
        assert_eq!(table.tier("Ceará"), TeamTier::Medium);
    }

    #[test]
    fn strong_wins_over_medium() {
        let table = TierTable::from_lists(&["Remo"], &["Remo", "Paysandu"]);
        assert_eq!(table.tier("Remo"), TeamTier::Strong);
        assert_eq!(table.tier("Paysandu"), TeamTier::Medium);
    }

    #[test]
    fn lookup_is_exact() {
        let table = TierTable::brasileirao();
        assert_eq!(table.tier("flamengo"), TeamTier::Weak);
        assert_eq!(table.tier(" Flamengo"), TeamTier::Weak);
    }

    #[test]
    fn parses_json_table() {
        let table =
            TierTable::parse_json(r#"{"Coritiba": "strong", "Goiás": "medium", "Avaí": "weak"}"#)
                .expect("valid table");
        assert_eq!(table.tier("Coritiba"), TeamTier::Strong);
        assert_eq!(table.tier("Goiás"), TeamTier::Medium);
        assert_eq!(table.tier("Avaí"), TeamTier::Weak);
        assert!(TierTable::parse_json(r#"{"Coritiba": "elite"}"#).is_err());
    }
}
