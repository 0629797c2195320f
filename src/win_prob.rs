use crate::tiers::TierTable;

const BASE_HOME: f64 = 0.40;
const BASE_AWAY: f64 = 0.30;
const BASE_DRAW: f64 = 0.30;

// Applied once, to whichever side has the higher tier strength.
const STRENGTH_EDGE: f64 = 0.10;
const STRENGTH_PENALTY: f64 = 0.05;

const HOME_ADVANTAGE: f64 = 0.05;
const HOME_ADV_AWAY_SHARE: f64 = 0.3;
const HOME_ADV_DRAW_SHARE: f64 = 0.7;

const HOME_BAND: (f64, f64) = (0.25, 0.65);
const AWAY_BAND: (f64, f64) = (0.20, 0.50);
const DRAW_BAND: (f64, f64) = (0.15, 0.40);

// Upstream distributions summing above this are on the 0..100 scale.
const PERCENT_SCALE_THRESHOLD: f64 = 1.5;

/// Three-way outcome probabilities. Estimated values are fractions summing to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeDistribution {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeDistribution {
    pub fn new(home: f64, draw: f64, away: f64) -> Self {
        Self { home, draw, away }
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }

    /// Same distribution on the 0..1 scale. Upstream documents write
    /// percentages, the estimator writes fractions.
    pub fn to_fractions(self) -> Self {
        if self.sum() > PERCENT_SCALE_THRESHOLD {
            Self {
                home: self.home / 100.0,
                draw: self.draw / 100.0,
                away: self.away / 100.0,
            }
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilitySource {
    Upstream,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOutcome {
    /// Always on the 0..1 scale.
    pub dist: OutcomeDistribution,
    pub source: ProbabilitySource,
}

/// Tier-based fallback estimator for fixtures that arrive without odds.
#[derive(Debug, Clone)]
pub struct OutcomeEstimator {
    tiers: TierTable,
}

impl Default for OutcomeEstimator {
    fn default() -> Self {
        Self::new(TierTable::brasileirao())
    }
}

impl OutcomeEstimator {
    pub fn new(tiers: TierTable) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn estimate(&self, home_team: &str, away_team: &str) -> OutcomeDistribution {
        let s_home = self.tiers.tier(home_team).strength();
        let s_away = self.tiers.tier(away_team).strength();
        estimate_from_strengths(s_home, s_away)
    }

    /// Upstream probabilities always win; the estimator only fills gaps.
    pub fn resolve(
        &self,
        precomputed: Option<&OutcomeDistribution>,
        home_team: &str,
        away_team: &str,
    ) -> ResolvedOutcome {
        match precomputed {
            Some(dist) => ResolvedOutcome {
                dist: dist.to_fractions(),
                source: ProbabilitySource::Upstream,
            },
            None => ResolvedOutcome {
                dist: self.estimate(home_team, away_team),
                source: ProbabilitySource::Estimated,
            },
        }
    }
}

pub fn estimate_from_strengths(s_home: f64, s_away: f64) -> OutcomeDistribution {
    let mut p_home = BASE_HOME;
    let mut p_away = BASE_AWAY;
    let mut p_draw = BASE_DRAW;

    if s_home > s_away {
        p_home += STRENGTH_EDGE;
        p_away -= STRENGTH_PENALTY;
        p_draw -= STRENGTH_PENALTY;
    } else if s_away > s_home {
        p_away += STRENGTH_EDGE;
        p_home -= STRENGTH_PENALTY;
        p_draw -= STRENGTH_PENALTY;
    }

    p_home += HOME_ADVANTAGE;
    p_away -= HOME_ADVANTAGE * HOME_ADV_AWAY_SHARE;
    p_draw -= HOME_ADVANTAGE * HOME_ADV_DRAW_SHARE;

    // Bands apply to the final additive values, never between steps.
    let p_home = clamp(p_home, HOME_BAND.0, HOME_BAND.1);
    let p_away = clamp(p_away, AWAY_BAND.0, AWAY_BAND.1);
    let p_draw = clamp(p_draw, DRAW_BAND.0, DRAW_BAND.1);

    let total = p_home + p_away + p_draw;
    OutcomeDistribution {
        home: p_home / total,
        draw: p_draw / total,
        away: p_away / total,
    }
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_holds_band_edges() {
        assert_eq!(clamp(0.70, HOME_BAND.0, HOME_BAND.1), 0.65);
        assert_eq!(clamp(0.10, AWAY_BAND.0, AWAY_BAND.1), 0.20);
        assert_eq!(clamp(0.30, DRAW_BAND.0, DRAW_BAND.1), 0.30);
    }

    #[test]
    fn equal_strengths_only_get_home_advantage() {
        let dist = estimate_from_strengths(0.6, 0.6);
        assert!((dist.home - 0.45).abs() < 1e-9);
        assert!((dist.away - 0.285).abs() < 1e-9);
        assert!((dist.draw - 0.265).abs() < 1e-9);
    }

    #[test]
    fn percentages_are_rescaled() {
        let dist = OutcomeDistribution::new(50.0, 30.0, 20.0).to_fractions();
        assert!((dist.home - 0.5).abs() < 1e-12);
        assert!((dist.draw - 0.3).abs() < 1e-12);
        assert!((dist.away - 0.2).abs() < 1e-12);

        let already = OutcomeDistribution::new(0.5, 0.3, 0.2);
        assert_eq!(already.to_fractions(), already);
    }
}
