//! Microstate batches: sampling and stochastic evolution.
//!
//! A batch is a dense `num_samples × width` matrix of bits stored row-major,
//! one `u8` per bit. Rows are the samples; sample `i` before and after
//! evolution always share row index `i`.

use rand::Rng;

use crate::error::{Error, Result, ensure_probability};

/// Width of the reference toy universe.
pub const DEFAULT_WIDTH: usize = 64;

/// Rectangular batch of binary microstates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicrostateBatch {
    bits: Vec<u8>,
    samples: usize,
    width: usize,
}

impl MicrostateBatch {
    /// Build a batch from row-major bits. Every value must be 0 or 1.
    pub fn from_bits(bits: Vec<u8>, samples: usize, width: usize) -> Result<Self> {
        if samples == 0 || width == 0 {
            return Err(Error::invalid(format!(
                "batch shape must be positive, got {samples}x{width}"
            )));
        }
        let cells = cell_count(samples, width)?;
        if bits.len() != cells {
            return Err(Error::invalid(format!(
                "expected {cells} bits for a {samples}x{width} batch, got {}",
                bits.len()
            )));
        }
        if let Some(idx) = bits.iter().position(|&b| b > 1) {
            return Err(Error::invalid(format!(
                "non-binary value {} at position {idx}",
                bits[idx]
            )));
        }
        Ok(Self {
            bits,
            samples,
            width,
        })
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Bits of one sample.
    pub fn row(&self, i: usize) -> &[u8] {
        &self.bits[i * self.width..(i + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.bits.chunks_exact(self.width)
    }

    pub fn as_bits(&self) -> &[u8] {
        &self.bits
    }
}

/// Number of bits in a `samples x width` batch.
fn cell_count(samples: usize, width: usize) -> Result<usize> {
    samples.checked_mul(width).ok_or_else(|| {
        Error::invalid(format!("a {samples}x{width} batch does not fit in memory"))
    })
}

/// Draw `samples` microstates of `width` bits, each bit uniform on {0, 1}.
pub fn sample_microstates<R: Rng + ?Sized>(
    rng: &mut R,
    samples: usize,
    width: usize,
) -> Result<MicrostateBatch> {
    if samples == 0 {
        return Err(Error::invalid("sample count must be positive"));
    }
    if width == 0 {
        return Err(Error::invalid("microstate width must be positive"));
    }
    let cells = cell_count(samples, width)?;
    let bits = (0..cells)
        .map(|_| rng.random_range(0..2u8))
        .collect();
    Ok(MicrostateBatch {
        bits,
        samples,
        width,
    })
}

/// One step of dynamics: flip every bit independently with probability
/// `flip_prob`. Returns a new batch; the input is left untouched.
pub fn evolve<R: Rng + ?Sized>(
    rng: &mut R,
    batch: &MicrostateBatch,
    flip_prob: f64,
) -> Result<MicrostateBatch> {
    ensure_probability("flip probability", flip_prob)?;
    let bits = batch
        .bits
        .iter()
        .map(|&b| {
            let flip = rng.random::<f64>() < flip_prob;
            b ^ u8::from(flip)
        })
        .collect();
    Ok(MicrostateBatch {
        bits,
        samples: batch.samples,
        width: batch.width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sample_shape_and_values() {
        let mut rng = StdRng::seed_from_u64(7);
        let batch = sample_microstates(&mut rng, 100, DEFAULT_WIDTH).unwrap();
        assert_eq!(batch.samples(), 100);
        assert_eq!(batch.width(), 64);
        assert_eq!(batch.rows().count(), 100);
        assert!(batch.as_bits().iter().all(|&b| b <= 1));
    }

    #[test]
    fn sample_is_roughly_balanced() {
        let mut rng = StdRng::seed_from_u64(11);
        let batch = sample_microstates(&mut rng, 2000, 64).unwrap();
        let ones: usize = batch.as_bits().iter().map(|&b| b as usize).sum();
        let frac = ones as f64 / batch.as_bits().len() as f64;
        assert!((frac - 0.5).abs() < 0.01, "fraction of ones {frac}");
    }

    #[test]
    fn sample_rejects_zero_count() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            sample_microstates(&mut rng, 0, 64),
            Err(Error::InvalidArgument(_))
        ));
        assert!(sample_microstates(&mut rng, 10, 0).is_err());
    }

    #[test]
    fn oversized_batch_is_rejected_before_drawing() {
        let mut rng = StdRng::seed_from_u64(0);
        let untouched = rng.clone();
        assert!(matches!(
            sample_microstates(&mut rng, usize::MAX, 2),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(rng, untouched);
        assert!(MicrostateBatch::from_bits(vec![0, 1], usize::MAX, 2).is_err());
    }

    #[test]
    fn zero_flip_is_identity() {
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let x0 = sample_microstates(&mut rng, 200, 64).unwrap();
            let x1 = evolve(&mut rng, &x0, 0.0).unwrap();
            assert_eq!(x0, x1);
        }
    }

    #[test]
    fn full_flip_is_complement() {
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let x0 = sample_microstates(&mut rng, 200, 64).unwrap();
            let x1 = evolve(&mut rng, &x0, 1.0).unwrap();
            assert!(
                x0.as_bits()
                    .iter()
                    .zip(x1.as_bits())
                    .all(|(&a, &b)| a ^ b == 1)
            );
        }
    }

    #[test]
    fn evolve_does_not_mutate_input() {
        let mut rng = StdRng::seed_from_u64(3);
        let x0 = sample_microstates(&mut rng, 50, 16).unwrap();
        let snapshot = x0.clone();
        let _ = evolve(&mut rng, &x0, 0.5).unwrap();
        assert_eq!(x0, snapshot);
    }

    #[test]
    fn evolve_rejects_bad_probability() {
        let mut rng = StdRng::seed_from_u64(3);
        let x0 = sample_microstates(&mut rng, 5, 8).unwrap();
        assert!(evolve(&mut rng, &x0, -0.1).is_err());
        assert!(evolve(&mut rng, &x0, 1.5).is_err());
        assert!(evolve(&mut rng, &x0, f64::NAN).is_err());
    }

    #[test]
    fn from_bits_validates() {
        assert!(MicrostateBatch::from_bits(vec![0, 1, 1, 0], 2, 2).is_ok());
        assert!(MicrostateBatch::from_bits(vec![0, 1, 1], 2, 2).is_err());
        assert!(MicrostateBatch::from_bits(vec![0, 2, 1, 0], 2, 2).is_err());
        assert!(MicrostateBatch::from_bits(vec![], 0, 2).is_err());
    }
}
