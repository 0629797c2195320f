use thiserror::Error;

/// Result of ordering a fixture mapping that had nothing usable in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FixtureError {
    #[error("no upcoming fixtures")]
    NoFixtures,
}

/// Why a league document could not be turned into a view.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Nothing came back: missing file, failed request, empty or `null` body.
    #[error("data unavailable: {0:#}")]
    Unavailable(anyhow::Error),
    #[error("malformed league document: {0:#}")]
    Malformed(anyhow::Error),
}
