// Ranking weights for the three cost criteria.
//
// Weights are supplied as any non-negative triple and re-normalized to sum 1,
// so {0.5, 0.3, 0.1} ranks exactly like {0.5/0.9, 0.3/0.9, 0.1/0.9}.

use std::fmt;

use recipeforge_config::WeightConfig;
use recipeforge_core::{CostTotals, MatchError, Result};

// One ranking criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostCriterion {
    Energy,
    Usage,
    Co2,
}

impl CostCriterion {
    // All criteria in ranking order.
    pub const ALL: [CostCriterion; 3] = [
        CostCriterion::Energy,
        CostCriterion::Usage,
        CostCriterion::Co2,
    ];

    // Returns this criterion's component of `totals`.
    pub fn of(self, totals: &CostTotals) -> f64 {
        match self {
            CostCriterion::Energy => totals.energy,
            CostCriterion::Usage => totals.usage,
            CostCriterion::Co2 => totals.co2,
        }
    }
}

impl fmt::Display for CostCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostCriterion::Energy => write!(f, "energy"),
            CostCriterion::Usage => write!(f, "usage"),
            CostCriterion::Co2 => write!(f, "co2"),
        }
    }
}

// Normalized ranking weights.
//
// The components sum to 1, or are all zero when every raw weight was zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    energy: f64,
    usage: f64,
    co2: f64,
}

impl ScoreWeights {
    // Creates weights from a raw non-negative triple.
    //
    // Returns `MatchError::Config` for negative or non-finite weights.
    pub fn new(energy: f64, usage: f64, co2: f64) -> Result<Self> {
        for (criterion, value) in CostCriterion::ALL.iter().zip([energy, usage, co2]) {
            if !value.is_finite() || value < 0.0 {
                return Err(MatchError::Config(format!(
                    "weight {criterion} = {value} must be a non-negative number"
                )));
            }
        }

        let sum = energy + usage + co2;
        if sum == 0.0 {
            return Ok(Self::zero());
        }
        Ok(Self {
            energy: energy / sum,
            usage: usage / sum,
            co2: co2 / sum,
        })
    }

    // Weights that score every assignment 0.
    pub fn zero() -> Self {
        Self {
            energy: 0.0,
            usage: 0.0,
            co2: 0.0,
        }
    }

    // Creates weights from the run configuration.
    pub fn from_config(config: &WeightConfig) -> Result<Self> {
        Self::new(config.energy, config.usage, config.co2)
    }

    // Returns the normalized weight of `criterion`.
    pub fn get(&self, criterion: CostCriterion) -> f64 {
        match criterion {
            CostCriterion::Energy => self.energy,
            CostCriterion::Usage => self.usage,
            CostCriterion::Co2 => self.co2,
        }
    }

    // Returns true if every weight is zero.
    pub fn is_zero(&self) -> bool {
        self.energy == 0.0 && self.usage == 0.0 && self.co2 == 0.0
    }

    // Returns the weights as a cost triple.
    pub fn as_totals(&self) -> CostTotals {
        CostTotals::new(self.energy, self.usage, self.co2)
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        let raw = WeightConfig::default();
        let sum = raw.energy + raw.usage + raw.co2;
        Self {
            energy: raw.energy / sum,
            usage: raw.usage / sum,
            co2: raw.co2 / sum,
        }
    }
}

impl TryFrom<&WeightConfig> for ScoreWeights {
    type Error = MatchError;

    fn try_from(config: &WeightConfig) -> Result<Self> {
        Self::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renormalized_to_one() {
        let w = ScoreWeights::new(0.5, 0.3, 0.1).unwrap();
        let sum: f64 = CostCriterion::ALL.iter().map(|c| w.get(*c)).sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((w.get(CostCriterion::Energy) - 0.5 / 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_all_zero() {
        let w = ScoreWeights::new(0.0, 0.0, 0.0).unwrap();
        assert!(w.is_zero());
        assert_eq!(w, ScoreWeights::zero());
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            ScoreWeights::new(0.2, -0.1, 0.0),
            Err(MatchError::Config(_))
        ));
        assert!(ScoreWeights::new(f64::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_default_matches_config_default() {
        let from_config = ScoreWeights::try_from(&WeightConfig::default()).unwrap();
        assert_eq!(from_config, ScoreWeights::default());
    }
}
