//! Environment fragments: independent noisy records of a macrostate.

use rand::Rng;

use crate::coarse::MAX_LABEL_BITS;
use crate::error::{Error, Result, ensure_probability};

/// Produce `fragments` noisy copies of `labels`.
///
/// Each label is split into its `bits` low-order bits, every bit is flipped
/// with probability `noise` using fresh draws per fragment, and the result is
/// repacked little-endian. Fragments are independent given the labels.
pub fn fragment_records<R: Rng + ?Sized>(
    rng: &mut R,
    labels: &[u64],
    bits: u32,
    noise: f64,
    fragments: usize,
) -> Result<Vec<Vec<u64>>> {
    ensure_probability("environment noise", noise)?;
    if fragments == 0 {
        return Err(Error::invalid("fragment count must be at least 1"));
    }
    if bits > MAX_LABEL_BITS {
        return Err(Error::invalid(format!(
            "label width {bits} exceeds {MAX_LABEL_BITS} bits"
        )));
    }

    let records = (0..fragments)
        .map(|_| {
            labels
                .iter()
                .map(|&label| {
                    (0..bits).fold(0u64, |acc, i| {
                        let bit = (label >> i) & 1;
                        let flip = u64::from(rng.random::<f64>() < noise);
                        acc | ((bit ^ flip) << i)
                    })
                })
                .collect()
        })
        .collect();
    Ok(records)
}
