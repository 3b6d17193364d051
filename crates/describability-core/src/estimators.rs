//! Plug-in information estimators over discrete label sequences.
//!
//! All quantities are in bits. Probabilities are empirical relative
//! frequencies; no bias correction is applied, so mutual information carries
//! the usual positive small-sample bias of the maximum-likelihood estimator.
//!
//! Histograms keep their bins in an ordered map so that the floating-point
//! sums below run in the same order every time and results are reproducible
//! bit-for-bit.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Occurrence counts per label (or per label pair for joint histograms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram<K: Ord = u64> {
    counts: BTreeMap<K, u64>,
    total: u64,
}

impl<K: Ord> Default for Histogram<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            total: 0,
        }
    }
}

impl<K: Ord> Histogram<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit `(key, count)` pairs. Zero counts are kept as bins.
    pub fn from_counts(counts: impl IntoIterator<Item = (K, u64)>) -> Self {
        let mut hist = Self::new();
        for (key, count) in counts {
            hist.add_count(key, count);
        }
        hist
    }

    pub fn add(&mut self, key: K) {
        self.add_count(key, 1);
    }

    /// Add `count` occurrences of `key`. A zero count still creates the bin.
    pub fn add_count(&mut self, key: K, count: u64) {
        *self.counts.entry(key).or_insert(0) += count;
        self.total += count;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of bins with a nonzero count.
    pub fn distinct(&self) -> usize {
        self.counts.values().filter(|&&c| c > 0).count()
    }

    pub fn count(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, &c)| (k, c))
    }
}

impl<K: Ord> FromIterator<K> for Histogram<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut hist = Self::new();
        for key in iter {
            hist.add(key);
        }
        hist
    }
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

/// Shannon entropy `-Σ p log2 p` of a histogram. Empty bins are skipped.
pub fn entropy<K: Ord>(hist: &Histogram<K>) -> Result<f64> {
    if hist.total == 0 {
        return Err(Error::invalid("entropy of a histogram with zero total count"));
    }
    let total = hist.total as f64;
    let mut h = 0.0;
    for &c in hist.counts.values() {
        if c == 0 {
            continue;
        }
        let p = c as f64 / total;
        h -= p * p.log2();
    }
    Ok(h)
}

/// Entropy of the empirical distribution of `labels`.
pub fn label_entropy(labels: &[u64]) -> Result<f64> {
    entropy(&labels.iter().copied().collect::<Histogram>())
}

fn ensure_paired(a: &[u64], b: &[u64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::invalid(format!(
            "paired sequences differ in length: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    if a.is_empty() {
        return Err(Error::invalid("paired sequences are empty"));
    }
    Ok(())
}

/// Plug-in mutual information `I(A; B)` between index-paired sequences.
pub fn mutual_information(a: &[u64], b: &[u64]) -> Result<f64> {
    ensure_paired(a, b)?;
    let n = a.len() as f64;

    let mut joint = Histogram::<(u64, u64)>::new();
    let mut pa = Histogram::new();
    let mut pb = Histogram::new();
    for (&x, &y) in a.iter().zip(b) {
        joint.add((x, y));
        pa.add(x);
        pb.add(y);
    }

    let mut mi = 0.0;
    for (&(x, y), c) in joint.iter() {
        let pxy = c as f64 / n;
        let px = pa.count(&x) as f64 / n;
        let py = pb.count(&y) as f64 / n;
        mi += pxy * (pxy / (px * py)).log2();
    }
    Ok(mi)
}

/// Conditional entropy `H(B | A) = Σ_a p(a) H(B | A = a)`.
pub fn conditional_entropy(a: &[u64], b: &[u64]) -> Result<f64> {
    ensure_paired(a, b)?;
    let n = a.len() as f64;

    let mut given: BTreeMap<u64, Histogram> = BTreeMap::new();
    for (&x, &y) in a.iter().zip(b) {
        given.entry(x).or_default().add(y);
    }

    let mut h = 0.0;
    for sub in given.values() {
        h += (sub.total() as f64 / n) * entropy(sub)?;
    }
    Ok(h)
}
