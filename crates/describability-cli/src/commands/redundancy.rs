//! `describability redundancy`: R_info versus the number of fragments.

use describability_core::{
    CoarseGrainingSpec, RedundancyCurve, Result, SweepConfig, redundancy_curve, report,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{create_output, exit_on_error, load_sweep_config, parse_fragment_list};

pub struct RedundancyCommandConfig<'a> {
    pub config_path: Option<&'a str>,
    pub fragments: Option<&'a str>,
    pub coarse: Option<&'a str>,
    pub seed: Option<u64>,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: RedundancyCommandConfig<'_>) {
    let sweep = exit_on_error(resolve_config(&cfg));
    println!(
        "Redundancy curve: {} (p={}, q={}, {} samples, seed {})\n",
        sweep.redundancy_coarse_graining,
        sweep.redundancy_flip_prob,
        sweep.redundancy_noise,
        sweep.samples,
        sweep.seed
    );

    let mut rng = StdRng::seed_from_u64(sweep.seed);
    let curve = exit_on_error(trace(&mut rng, &sweep));
    print_curve(&curve);

    if let Some(path) = cfg.output_path {
        exit_on_error(
            create_output(std::path::Path::new(path))
                .and_then(|w| report::write_redundancy_csv(w, &curve).map_err(Into::into)),
        );
        println!("\nCurve saved to: {path}");
    }
}

fn resolve_config(cfg: &RedundancyCommandConfig<'_>) -> Result<SweepConfig> {
    let mut sweep = load_sweep_config(cfg.config_path)?;
    if let Some(list) = cfg.fragments {
        sweep.redundancy_fragments = parse_fragment_list(list)?;
    }
    if let Some(coarse) = cfg.coarse {
        sweep.redundancy_coarse_graining = coarse.parse::<CoarseGrainingSpec>()?;
    }
    if let Some(seed) = cfg.seed {
        sweep.seed = seed;
    }
    sweep.validate()?;
    Ok(sweep)
}

/// Build the configured map from `rng` and trace its redundancy curve.
pub fn trace(rng: &mut StdRng, sweep: &SweepConfig) -> Result<RedundancyCurve> {
    let map = sweep.redundancy_coarse_graining.build(rng, sweep.width)?;
    redundancy_curve(
        rng,
        map.as_ref(),
        &sweep.redundancy_fragments,
        &sweep.redundancy_params(),
    )
}

pub fn print_curve(curve: &RedundancyCurve) {
    let peak = curve
        .points
        .iter()
        .map(|p| p.r_info)
        .fold(0.0f64, f64::max);
    println!("  {:>9} {:>9}", "fragments", "R_info");
    println!("  {}", "-".repeat(50));
    for p in &curve.points {
        let bar = if peak > 0.0 {
            (p.r_info / peak * 30.0).round() as usize
        } else {
            0
        };
        println!("  {:>9} {:>9.4} {}", p.fragments, p.r_info, "#".repeat(bar));
    }
}
