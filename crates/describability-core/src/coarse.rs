//! Coarse-graining maps: microstate batch → macrostate labels.
//!
//! Every map implements the [`CoarseGraining`] trait. The functional evaluator
//! depends only on the trait, so user-supplied maps plug in next to the three
//! reference variants:
//!
//! - [`BlockMajority`]: one majority bit per contiguous block.
//! - [`GlobalMajority`]: a single majority bit over the whole microstate.
//! - [`RandomHash`]: parities against a fixed random projection matrix.
//!
//! Labels pack one bit per output position, little-endian (output bit `i`
//! carries weight `2^i`).

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::microstate::MicrostateBatch;

/// Widest label a map may declare; labels are `u64`.
pub const MAX_LABEL_BITS: u32 = 64;

/// Output of a coarse-graining: one label per sample plus the declared width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub values: Vec<u64>,
    pub bits: u32,
}

impl Labels {
    /// First label that needs more than `bits` bits, if any.
    pub fn first_out_of_range(&self) -> Option<u64> {
        if self.bits >= MAX_LABEL_BITS {
            return None;
        }
        let limit = 1u64 << self.bits;
        self.values.iter().copied().find(|&v| v >= limit)
    }
}

/// A many-to-one reduction from microstates to integer macrostate labels.
///
/// Implementations must be pure: the same batch always yields the same labels,
/// and the declared bit-width never depends on the batch contents.
pub trait CoarseGraining: Send + Sync {
    /// Human-readable name used in result tables.
    fn name(&self) -> &str;

    /// Reject microstate widths this map cannot handle. Called before any
    /// sampling so configuration errors surface early.
    fn check_width(&self, width: usize) -> Result<()> {
        let _ = width;
        Ok(())
    }

    /// Map every sample of `batch` to a label.
    fn apply(&self, batch: &MicrostateBatch) -> Result<Labels>;
}

/// Pack bits little-endian into a label.
fn pack_bits(bits: impl IntoIterator<Item = u8>) -> u64 {
    bits.into_iter()
        .enumerate()
        .fold(0u64, |acc, (i, b)| acc | (u64::from(b & 1) << i))
}

// ---------------------------------------------------------------------------
// Block majority
// ---------------------------------------------------------------------------

/// Majority vote inside contiguous blocks of `block_size` bits.
///
/// A block votes 1 when at least half of its bits are set (ties go to 1).
#[derive(Debug, Clone)]
pub struct BlockMajority {
    block_size: usize,
    name: String,
}

impl BlockMajority {
    pub fn new(block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::invalid("block size must be positive"));
        }
        Ok(Self {
            block_size,
            name: format!("Block-majority ({block_size})"),
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl CoarseGraining for BlockMajority {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width % self.block_size != 0 {
            return Err(Error::invalid(format!(
                "microstate width {width} is not divisible by block size {}",
                self.block_size
            )));
        }
        let blocks = width / self.block_size;
        if blocks as u64 > u64::from(MAX_LABEL_BITS) {
            return Err(Error::invalid(format!(
                "{blocks} blocks exceed the {MAX_LABEL_BITS}-bit label limit"
            )));
        }
        Ok(())
    }

    fn apply(&self, batch: &MicrostateBatch) -> Result<Labels> {
        self.check_width(batch.width())?;
        let block = self.block_size;
        let values = batch
            .rows()
            .map(|row| {
                pack_bits(row.chunks_exact(block).map(|chunk| {
                    let ones: usize = chunk.iter().map(|&b| b as usize).sum();
                    u8::from(2 * ones >= block)
                }))
            })
            .collect();
        Ok(Labels {
            values,
            bits: (batch.width() / block) as u32,
        })
    }
}

// ---------------------------------------------------------------------------
// Global majority
// ---------------------------------------------------------------------------

/// Single bit: 1 iff at least half of all microstate bits are set.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalMajority;

impl CoarseGraining for GlobalMajority {
    fn name(&self) -> &str {
        "Global majority sign"
    }

    fn apply(&self, batch: &MicrostateBatch) -> Result<Labels> {
        let width = batch.width();
        let values = batch
            .rows()
            .map(|row| {
                let ones: usize = row.iter().map(|&b| b as usize).sum();
                u64::from(2 * ones >= width)
            })
            .collect();
        Ok(Labels { values, bits: 1 })
    }
}

// ---------------------------------------------------------------------------
// Random hash
// ---------------------------------------------------------------------------

/// Parity hash against a fixed random `bits × width` binary matrix.
///
/// The matrix is drawn once in [`RandomHash::new`] and never regenerated, so
/// before/after batches and every evaluation in a run share the same hash.
#[derive(Debug, Clone)]
pub struct RandomHash {
    projection: Vec<u8>,
    bits: u32,
    width: usize,
    name: String,
}

impl RandomHash {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, bits: u32, width: usize) -> Result<Self> {
        let cells = Self::matrix_size(bits, width)?;
        let projection = (0..cells)
            .map(|_| rng.random_range(0..2u8))
            .collect();
        Ok(Self {
            projection,
            bits,
            width,
            name: format!("Random hash ({bits} bits)"),
        })
    }

    /// Validate the shape and return the number of matrix entries.
    fn matrix_size(bits: u32, width: usize) -> Result<usize> {
        if bits == 0 || bits > MAX_LABEL_BITS {
            return Err(Error::invalid(format!(
                "hash width must be in 1..={MAX_LABEL_BITS}, got {bits}"
            )));
        }
        if width == 0 {
            return Err(Error::invalid("microstate width must be positive"));
        }
        (bits as usize)
            .checked_mul(width)
            .ok_or_else(|| Error::invalid(format!("{bits}x{width} hash matrix is too large")))
    }

    /// Row `i` of the projection matrix.
    pub fn projection_row(&self, i: usize) -> &[u8] {
        &self.projection[i * self.width..(i + 1) * self.width]
    }
}

impl CoarseGraining for RandomHash {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.width {
            return Err(Error::invalid(format!(
                "hash matrix was built for width {}, got {width}",
                self.width
            )));
        }
        Ok(())
    }

    fn apply(&self, batch: &MicrostateBatch) -> Result<Labels> {
        self.check_width(batch.width())?;
        let values = batch
            .rows()
            .map(|row| {
                pack_bits(self.projection.chunks_exact(self.width).map(|proj| {
                    proj.iter()
                        .zip(row)
                        .fold(0u8, |parity, (&w, &x)| parity ^ (w & x))
                }))
            })
            .collect();
        Ok(Labels {
            values,
            bits: self.bits,
        })
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// Serializable choice of a reference coarse-graining.
///
/// Parses from `block:<size>`, `global`, or `hash:<bits>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CoarseGrainingSpec {
    BlockMajority { block_size: usize },
    GlobalMajority,
    RandomHash { bits: u32 },
}

impl CoarseGrainingSpec {
    /// The three maps of the reference comparison.
    pub fn reference_set() -> Vec<Self> {
        vec![
            Self::BlockMajority { block_size: 8 },
            Self::GlobalMajority,
            Self::RandomHash { bits: 8 },
        ]
    }

    /// Short tag used in output file names.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::BlockMajority { .. } => "Block",
            Self::GlobalMajority => "Global",
            Self::RandomHash { .. } => "Hash",
        }
    }

    /// Check that the map can be built for `width` bits without drawing
    /// anything.
    pub fn check(&self, width: usize) -> Result<()> {
        match *self {
            Self::BlockMajority { block_size } => {
                BlockMajority::new(block_size)?.check_width(width)
            }
            Self::GlobalMajority => GlobalMajority.check_width(width),
            Self::RandomHash { bits } => RandomHash::matrix_size(bits, width).map(|_| ()),
        }
    }

    /// Construct the map for microstates of `width` bits. Random-hash draws its
    /// projection matrix from `rng` here, once.
    pub fn build<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        width: usize,
    ) -> Result<Box<dyn CoarseGraining>> {
        let map: Box<dyn CoarseGraining> = match *self {
            Self::BlockMajority { block_size } => Box::new(BlockMajority::new(block_size)?),
            Self::GlobalMajority => Box::new(GlobalMajority),
            Self::RandomHash { bits } => Box::new(RandomHash::new(rng, bits, width)?),
        };
        map.check_width(width)?;
        Ok(map)
    }
}

impl fmt::Display for CoarseGrainingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockMajority { block_size } => write!(f, "block:{block_size}"),
            Self::GlobalMajority => write!(f, "global"),
            Self::RandomHash { bits } => write!(f, "hash:{bits}"),
        }
    }
}

impl FromStr for CoarseGrainingSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind.trim(), Some(arg.trim())),
            None => (s.as_str(), None),
        };
        let parse_arg = |default: usize| -> Result<usize> {
            match arg {
                None => Ok(default),
                Some(a) => a.parse().map_err(|_| {
                    Error::Config(format!("bad coarse-graining parameter '{a}' in '{s}'"))
                }),
            }
        };
        match kind {
            "block" | "block-majority" => Ok(Self::BlockMajority {
                block_size: parse_arg(8)?,
            }),
            "global" | "global-majority" if arg.is_none() => Ok(Self::GlobalMajority),
            "hash" | "random-hash" => Ok(Self::RandomHash {
                bits: u32::try_from(parse_arg(8)?).unwrap_or(u32::MAX),
            }),
            _ => Err(Error::Config(format!(
                "unknown coarse-graining '{s}' (expected block:<n>, global, hash:<bits>)"
            ))),
        }
    }
}

impl TryFrom<String> for CoarseGrainingSpec {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<CoarseGrainingSpec> for String {
    fn from(spec: CoarseGrainingSpec) -> Self {
        spec.to_string()
    }
}

/// Parse a comma-separated selector list such as `block:8,global,hash:8`.
pub fn parse_spec_list(list: &str) -> Result<Vec<CoarseGrainingSpec>> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}
