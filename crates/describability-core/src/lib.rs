//! # describability-core
//!
//! **How describable is a coarse-graining?**
//!
//! `describability-core` scores candidate coarse-grainings `C` of a toy binary
//! universe with the functional
//!
//! ```text
//! F(C) = α·S_info(C) + λ·R_info(C) − β·L(M)
//! ```
//!
//! where `S_info` rewards macrostates that evolve predictably, `R_info` rewards
//! macrostates that are redundantly recorded in a noisy environment, and `L(M)`
//! penalizes long descriptions.
//!
//! ## Quick Start
//!
//! ```no_run
//! use describability_core::{BlockMajority, EvaluationParams, evaluate};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let cg = BlockMajority::new(8).unwrap();
//! let record = evaluate(&mut rng, &cg, &EvaluationParams::default()).unwrap();
//! println!("{}: F(C) = {:.3}", record.coarse_graining, record.score);
//! ```
//!
//! ## Architecture
//!
//! Sampler → Evolution → Coarse-graining → Estimators → Functional
//!
//! The generator is always passed explicitly; there is no global random
//! state. Every coarse-graining implements the [`CoarseGraining`] trait, and
//! the [`sweep`] drivers build comparison tables, phase diagrams and
//! redundancy curves on top of [`evaluate`].

pub mod coarse;
pub mod config;
pub mod environment;
pub mod error;
pub mod estimators;
pub mod functional;
pub mod microstate;
pub mod report;
pub mod sweep;

pub use coarse::{
    BlockMajority, CoarseGraining, CoarseGrainingSpec, GlobalMajority, Labels, MAX_LABEL_BITS,
    RandomHash, parse_spec_list,
};
pub use config::{DEFAULT_COMPARE_SEED, DEFAULT_SWEEP_SEED, SweepConfig};
pub use environment::fragment_records;
pub use error::{Error, Result};
pub use estimators::{
    Histogram, conditional_entropy, entropy, label_entropy, mutual_information,
};
pub use functional::{
    DEGENERATE_ENTROPY, EvaluationParams, EvaluationRecord, Weights, evaluate,
};
pub use microstate::{DEFAULT_WIDTH, MicrostateBatch, evolve, sample_microstates};
pub use sweep::{
    PhaseDiagram, RedundancyCurve, RedundancyPoint, compare, linspace, phase_diagram,
    phase_diagram_parallel, redundancy_curve,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
