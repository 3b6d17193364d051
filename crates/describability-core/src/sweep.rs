//! Drivers that iterate the functional evaluator: ranked comparison tables,
//! phase diagrams over (environment noise × flip probability), and
//! redundancy-growth curves over the fragment count.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::coarse::CoarseGraining;
use crate::error::{Result, ensure_probability};
use crate::functional::{EvaluationParams, EvaluationRecord, evaluate};

/// `count` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            values[count - 1] = end;
            values
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Evaluate each map in turn from one generator stream and rank the records
/// by `F(C)`, highest first.
pub fn compare<R: Rng + ?Sized>(
    rng: &mut R,
    maps: &[Box<dyn CoarseGraining>],
    params: &EvaluationParams,
) -> Result<Vec<EvaluationRecord>> {
    params.validate()?;
    for map in maps {
        map.check_width(params.width)?;
    }

    let mut records = Vec::with_capacity(maps.len());
    for map in maps {
        log::info!("evaluating {}", map.name());
        records.push(evaluate(rng, map.as_ref(), params)?);
    }
    records.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(records)
}

// ---------------------------------------------------------------------------
// Phase diagram
// ---------------------------------------------------------------------------

/// `F(C)` over a grid. Row `i` is `noise_values[i]`, column `j` is
/// `flip_values[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDiagram {
    pub coarse_graining: String,
    pub flip_values: Vec<f64>,
    pub noise_values: Vec<f64>,
    pub scores: Vec<Vec<f64>>,
}

impl PhaseDiagram {
    pub fn score(&self, noise_idx: usize, flip_idx: usize) -> f64 {
        self.scores[noise_idx][flip_idx]
    }

    /// Smallest and largest score in the grid.
    pub fn range(&self) -> (f64, f64) {
        self.scores
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

fn check_axes(flip_values: &[f64], noise_values: &[f64]) -> Result<()> {
    for &p in flip_values {
        ensure_probability("flip probability", p)?;
    }
    for &q in noise_values {
        ensure_probability("environment noise", q)?;
    }
    Ok(())
}

fn grid_row<R: Rng + ?Sized>(
    rng: &mut R,
    cg: &dyn CoarseGraining,
    flip_values: &[f64],
    noise: f64,
    base: &EvaluationParams,
) -> Result<Vec<f64>> {
    flip_values
        .iter()
        .map(|&flip_prob| {
            let params = EvaluationParams {
                flip_prob,
                env_noise: noise,
                ..base.clone()
            };
            evaluate(rng, cg, &params).map(|rec| rec.score)
        })
        .collect()
}

/// Sweep the grid sequentially from one generator stream.
pub fn phase_diagram<R: Rng + ?Sized>(
    rng: &mut R,
    cg: &dyn CoarseGraining,
    flip_values: &[f64],
    noise_values: &[f64],
    base: &EvaluationParams,
) -> Result<PhaseDiagram> {
    check_axes(flip_values, noise_values)?;
    base.validate()?;
    cg.check_width(base.width)?;

    let mut scores = Vec::with_capacity(noise_values.len());
    for (i, &noise) in noise_values.iter().enumerate() {
        log::info!(
            "{}: phase row {}/{} (noise={noise:.4})",
            cg.name(),
            i + 1,
            noise_values.len()
        );
        scores.push(grid_row(rng, cg, flip_values, noise, base)?);
    }

    Ok(PhaseDiagram {
        coarse_graining: cg.name().to_string(),
        flip_values: flip_values.to_vec(),
        noise_values: noise_values.to_vec(),
        scores,
    })
}

/// Generator seed for row `row` of a parallel sweep.
pub fn row_seed(seed: u64, row: usize) -> u64 {
    seed ^ (row as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Sweep the grid with one scoped thread per row. Each row owns a generator
/// seeded from `seed` and its index, so the result depends only on `seed`,
/// not on thread scheduling. Values differ from [`phase_diagram`].
pub fn phase_diagram_parallel(
    seed: u64,
    cg: &dyn CoarseGraining,
    flip_values: &[f64],
    noise_values: &[f64],
    base: &EvaluationParams,
) -> Result<PhaseDiagram> {
    check_axes(flip_values, noise_values)?;
    base.validate()?;
    cg.check_width(base.width)?;

    let scores = std::thread::scope(|s| {
        let handles: Vec<_> = noise_values
            .iter()
            .enumerate()
            .map(|(i, &noise)| {
                s.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(row_seed(seed, i));
                    grid_row(&mut rng, cg, flip_values, noise, base)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect::<Result<Vec<_>>>()
    })?;

    Ok(PhaseDiagram {
        coarse_graining: cg.name().to_string(),
        flip_values: flip_values.to_vec(),
        noise_values: noise_values.to_vec(),
        scores,
    })
}

// ---------------------------------------------------------------------------
// Redundancy curve
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RedundancyPoint {
    pub fragments: usize,
    #[serde(rename = "R_info")]
    pub r_info: f64,
}

/// `R_info` as a function of the number of environment fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedundancyCurve {
    pub coarse_graining: String,
    pub points: Vec<RedundancyPoint>,
}

/// Evaluate `cg` once per fragment count, all other parameters fixed.
pub fn redundancy_curve<R: Rng + ?Sized>(
    rng: &mut R,
    cg: &dyn CoarseGraining,
    fragment_counts: &[usize],
    base: &EvaluationParams,
) -> Result<RedundancyCurve> {
    let all: Vec<EvaluationParams> = fragment_counts
        .iter()
        .map(|&fragments| EvaluationParams {
            fragments,
            ..base.clone()
        })
        .collect();
    for params in &all {
        params.validate()?;
    }
    cg.check_width(base.width)?;

    let mut points = Vec::with_capacity(all.len());
    for params in &all {
        let rec = evaluate(rng, cg, params)?;
        log::info!(
            "{}: fragments={} R_info={:.4}",
            cg.name(),
            params.fragments,
            rec.r_info
        );
        points.push(RedundancyPoint {
            fragments: params.fragments,
            r_info: rec.r_info,
        });
    }

    Ok(RedundancyCurve {
        coarse_graining: cg.name().to_string(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coarse::{BlockMajority, GlobalMajority};
    use crate::error::Error;

    fn quick() -> EvaluationParams {
        EvaluationParams {
            samples: 800,
            ..Default::default()
        }
    }

    #[test]
    fn linspace_matches_inclusive_grid() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.3, 1.0, 1), vec![0.3]);
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let grid = linspace(0.0, 0.25, 10);
        assert_eq!(grid.len(), 10);
        assert_eq!(grid[9], 0.25);
        assert!((grid[1] - 0.25 / 9.0).abs() < 1e-15);
    }

    #[test]
    fn compare_ranks_by_score() {
        let mut rng = StdRng::seed_from_u64(42);
        let maps: Vec<Box<dyn CoarseGraining>> = vec![
            Box::new(GlobalMajority),
            Box::new(BlockMajority::new(8).unwrap()),
        ];
        let table = compare(&mut rng, &maps, &quick()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table[0].score >= table[1].score);
    }

    #[test]
    fn compare_validates_every_map_first() {
        let mut rng = StdRng::seed_from_u64(42);
        let untouched = rng.clone();
        let maps: Vec<Box<dyn CoarseGraining>> = vec![
            Box::new(GlobalMajority),
            Box::new(BlockMajority::new(5).unwrap()),
        ];
        assert!(compare(&mut rng, &maps, &quick()).is_err());
        assert_eq!(rng, untouched);
    }

    #[test]
    fn phase_diagram_shape() {
        let mut rng = StdRng::seed_from_u64(321);
        let flips = linspace(0.0, 0.2, 3);
        let noises = linspace(0.0, 0.2, 2);
        let pd = phase_diagram(&mut rng, &GlobalMajority, &flips, &noises, &quick()).unwrap();
        assert_eq!(pd.scores.len(), 2);
        assert!(pd.scores.iter().all(|row| row.len() == 3));
        assert_eq!(pd.coarse_graining, "Global majority sign");
        let (lo, hi) = pd.range();
        assert!(lo <= hi);
        assert!(pd.score(1, 2).is_finite());
    }

    #[test]
    fn phase_diagram_rejects_bad_axis() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = phase_diagram(&mut rng, &GlobalMajority, &[0.1, 1.2], &[0.0], &quick())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn parallel_sweep_is_reproducible() {
        let cg = BlockMajority::new(8).unwrap();
        let flips = linspace(0.0, 0.2, 3);
        let noises = linspace(0.0, 0.2, 3);
        let a = phase_diagram_parallel(7, &cg, &flips, &noises, &quick()).unwrap();
        let b = phase_diagram_parallel(7, &cg, &flips, &noises, &quick()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.scores.len(), 3);
    }

    #[test]
    fn parallel_rows_match_sequential_rows_with_same_seed() {
        let cg = GlobalMajority;
        let flips = [0.05, 0.1];
        let noises = [0.0, 0.1];
        let par = phase_diagram_parallel(11, &cg, &flips, &noises, &quick()).unwrap();
        for (i, &noise) in noises.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(row_seed(11, i));
            let row = phase_diagram(&mut rng, &cg, &flips, &[noise], &quick()).unwrap();
            assert_eq!(row.scores[0], par.scores[i]);
        }
    }

    #[test]
    fn redundancy_curve_points() {
        let mut rng = StdRng::seed_from_u64(321);
        let cg = BlockMajority::new(8).unwrap();
        let curve = redundancy_curve(&mut rng, &cg, &[1, 4], &quick()).unwrap();
        assert_eq!(curve.points.len(), 2);
        assert_eq!(curve.points[0].fragments, 1);
        assert!(curve.points[1].r_info > curve.points[0].r_info);
    }

    #[test]
    fn redundancy_curve_rejects_zero_fragments() {
        let mut rng = StdRng::seed_from_u64(1);
        let untouched = rng.clone();
        assert!(redundancy_curve(&mut rng, &GlobalMajority, &[1, 0], &quick()).is_err());
        assert_eq!(rng, untouched);
    }
}
