//! Error taxonomy for the evaluation engine.

use thiserror::Error;

/// Errors raised by sampling, coarse-graining, estimation and evaluation.
#[derive(Debug, Error)]
pub enum Error {
    /// Out-of-range probability, non-positive count, non-divisible block size,
    /// mismatched or empty sequences, or a zero-total histogram.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A coarse-graining reported different bit-widths for the paired
    /// before/after batches of one evaluation. The map itself is broken.
    #[error("internal consistency: coarse-graining '{name}' reported {before} bits before evolution and {after} after")]
    InternalConsistency {
        name: String,
        before: u32,
        after: u32,
    },

    /// A coarse-graining emitted a label that does not fit in the bit-width
    /// it declared.
    #[error("internal consistency: coarse-graining '{name}' emitted label {label} wider than its {bits} bits")]
    LabelOutOfRange { name: String, label: u64, bits: u32 },

    /// Malformed configuration file or coarse-graining selector.
    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Reject probabilities outside `[0, 1]` (NaN included).
pub(crate) fn ensure_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(format!("{name} must lie in [0, 1], got {value}")))
    }
}
