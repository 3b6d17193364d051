//! `describability sweep`: phase diagrams per coarse-graining plus the
//! redundancy curve, written under `<out_dir>/data/`.

use std::time::Instant;

use describability_core::{
    PhaseDiagram, Result, SweepConfig, parse_spec_list, phase_diagram, phase_diagram_parallel,
    report,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{create_output, data_path, exit_on_error, load_sweep_config};

pub struct SweepCommandConfig<'a> {
    pub config_path: Option<&'a str>,
    pub coarse: Option<&'a str>,
    pub samples: Option<usize>,
    pub seed: Option<u64>,
    pub out_dir: &'a str,
    pub parallel: bool,
    pub include_redundancy: bool,
}

pub fn run(cfg: SweepCommandConfig<'_>) {
    let sweep = exit_on_error(resolve_config(&cfg));
    let grid_cells = sweep.flip_values.len() * sweep.noise_values.len();
    println!(
        "Sweeping {} coarse-graining(s) over {} cells, {} samples each (seed {}{})...\n",
        sweep.coarse_grainings.len(),
        grid_cells,
        sweep.samples,
        sweep.seed,
        if cfg.parallel { ", parallel" } else { "" }
    );

    let mut rng = StdRng::seed_from_u64(sweep.seed);
    for spec in &sweep.coarse_grainings {
        let t0 = Instant::now();
        let diagram = exit_on_error(sweep_one(&mut rng, &sweep, spec, cfg.parallel));
        println!("{}", report::render_heatmap(&diagram));

        let path = data_path(cfg.out_dir, &format!("phase_grid_{}.csv", spec.tag()));
        exit_on_error(
            create_output(&path)
                .and_then(|w| report::write_phase_csv(w, &diagram).map_err(Into::into)),
        );
        println!(
            "  {} done in {:.1}s -> {}\n",
            diagram.coarse_graining,
            t0.elapsed().as_secs_f64(),
            path.display()
        );
    }

    if cfg.include_redundancy {
        let curve = exit_on_error(super::redundancy::trace(&mut rng, &sweep));
        super::redundancy::print_curve(&curve);
        let path = data_path(cfg.out_dir, "redundancy.csv");
        exit_on_error(
            create_output(&path)
                .and_then(|w| report::write_redundancy_csv(w, &curve).map_err(Into::into)),
        );
        println!("\nCurve saved to: {}", path.display());
    }
}

fn resolve_config(cfg: &SweepCommandConfig<'_>) -> Result<SweepConfig> {
    let mut sweep = load_sweep_config(cfg.config_path)?;
    if let Some(coarse) = cfg.coarse {
        sweep.coarse_grainings = parse_spec_list(coarse)?;
    }
    if let Some(samples) = cfg.samples {
        sweep.samples = samples;
    }
    if let Some(seed) = cfg.seed {
        sweep.seed = seed;
    }
    sweep.validate()?;
    Ok(sweep)
}

fn sweep_one(
    rng: &mut StdRng,
    sweep: &SweepConfig,
    spec: &describability_core::CoarseGrainingSpec,
    parallel: bool,
) -> Result<PhaseDiagram> {
    let map = spec.build(rng, sweep.width)?;
    let base = sweep.grid_params();
    if parallel {
        // Row seeds come off the main stream; each map gets its own set.
        let row_base: u64 = rng.random();
        phase_diagram_parallel(
            row_base,
            map.as_ref(),
            &sweep.flip_values,
            &sweep.noise_values,
            &base,
        )
    } else {
        phase_diagram(
            rng,
            map.as_ref(),
            &sweep.flip_values,
            &sweep.noise_values,
            &base,
        )
    }
}
