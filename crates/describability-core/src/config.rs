//! Sweep configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "seed": 7, "samples": 3000, "coarse_grainings": ["block:8", "hash:8"] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coarse::CoarseGrainingSpec;
use crate::error::{Error, Result, ensure_probability};
use crate::functional::{EvaluationParams, Weights};
use crate::microstate::DEFAULT_WIDTH;
use crate::sweep::linspace;

/// Seed of the reference comparison run.
pub const DEFAULT_COMPARE_SEED: u64 = 42;
/// Seed of the reference sweep run.
pub const DEFAULT_SWEEP_SEED: u64 = 321;

/// Phase-diagram and redundancy-curve settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub seed: u64,
    pub width: usize,
    pub samples: usize,
    pub weights: Weights,
    /// Maps to sweep; each gets its own phase grid.
    pub coarse_grainings: Vec<CoarseGrainingSpec>,
    /// Column axis of the phase grid.
    pub flip_values: Vec<f64>,
    /// Row axis of the phase grid.
    pub noise_values: Vec<f64>,
    /// Fragment count used inside the phase grid.
    pub fragments: usize,
    /// Map used for the redundancy curve.
    pub redundancy_coarse_graining: CoarseGrainingSpec,
    pub redundancy_fragments: Vec<usize>,
    pub redundancy_flip_prob: f64,
    pub redundancy_noise: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SWEEP_SEED,
            width: DEFAULT_WIDTH,
            samples: 6000,
            weights: Weights::default(),
            coarse_grainings: CoarseGrainingSpec::reference_set(),
            flip_values: linspace(0.0, 0.25, 10),
            noise_values: linspace(0.0, 0.25, 10),
            fragments: 8,
            redundancy_coarse_graining: CoarseGrainingSpec::BlockMajority { block_size: 8 },
            redundancy_fragments: vec![1, 2, 4, 8, 16],
            redundancy_flip_prob: 0.05,
            redundancy_noise: 0.05,
        }
    }
}

impl SweepConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.flip_values.is_empty() || self.noise_values.is_empty() {
            return Err(Error::invalid("phase grid axes must not be empty"));
        }
        for &p in &self.flip_values {
            ensure_probability("flip probability", p)?;
        }
        for &q in &self.noise_values {
            ensure_probability("environment noise", q)?;
        }
        if self.redundancy_fragments.iter().any(|&k| k == 0) {
            return Err(Error::invalid("redundancy fragment counts must be at least 1"));
        }
        self.grid_params().validate()?;
        self.redundancy_params().validate()?;
        for spec in self.coarse_grainings.iter().chain([&self.redundancy_coarse_graining]) {
            spec.check(self.width)?;
        }
        Ok(())
    }

    /// Base parameters for a phase-grid cell; the driver overrides the flip
    /// probability and noise per cell.
    pub fn grid_params(&self) -> EvaluationParams {
        EvaluationParams {
            samples: self.samples,
            flip_prob: 0.0,
            env_noise: 0.0,
            fragments: self.fragments,
            weights: self.weights,
            width: self.width,
        }
    }

    /// Base parameters for the redundancy curve; the driver overrides the
    /// fragment count per point.
    pub fn redundancy_params(&self) -> EvaluationParams {
        EvaluationParams {
            samples: self.samples,
            flip_prob: self.redundancy_flip_prob,
            env_noise: self.redundancy_noise,
            fragments: 1,
            weights: self.weights,
            width: self.width,
        }
    }
}
