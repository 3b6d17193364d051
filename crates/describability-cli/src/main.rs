//! CLI for describability: rank coarse-grainings of a toy binary universe.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "describability")]
#[command(about = "describability: score coarse-grainings with F(C) = α·S_info + λ·R_info − β·L(M)")]
#[command(version = describability_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate several coarse-grainings at one parameter setting and rank them by F(C)
    Compare {
        /// Comma-separated coarse-grainings: block:<size>, global, hash:<bits>
        #[arg(long, default_value = "block:8,global,hash:8")]
        coarse: String,

        /// Number of sampled trajectories
        #[arg(long, default_value = "15000")]
        samples: usize,

        /// Per-bit flip probability of one dynamics step
        #[arg(long, default_value = "0.05")]
        flip: f64,

        /// Per-bit corruption probability of environment fragments
        #[arg(long, default_value = "0.10")]
        noise: f64,

        /// Number of environment fragments
        #[arg(long, default_value = "8")]
        fragments: usize,

        /// Weight of S_info
        #[arg(long, default_value = "1.0")]
        alpha: f64,

        /// Weight of R_info
        #[arg(long, default_value = "1.0")]
        lambda: f64,

        /// Weight of the description-length penalty
        #[arg(long, default_value = "0.5")]
        beta: f64,

        /// Microstate width N
        #[arg(long, default_value = "64")]
        width: usize,

        /// Generator seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write the ranked table as CSV
        #[arg(long)]
        output: Option<String>,

        /// Write the ranked table as JSON
        #[arg(long)]
        json: Option<String>,
    },

    /// Phase diagrams of F(C) over environment noise × flip probability, plus the redundancy curve
    Sweep {
        /// JSON sweep configuration (missing keys take defaults)
        #[arg(long)]
        config: Option<String>,

        /// Override the coarse-grainings to sweep (comma-separated)
        #[arg(long)]
        coarse: Option<String>,

        /// Override samples per grid cell
        #[arg(long)]
        samples: Option<usize>,

        /// Override the generator seed
        #[arg(long)]
        seed: Option<u64>,

        /// Directory receiving data/*.csv
        #[arg(long, default_value = ".")]
        out_dir: String,

        /// One thread per grid row, each with its own seeded generator
        #[arg(long)]
        parallel: bool,

        /// Skip the redundancy curve
        #[arg(long)]
        no_redundancy: bool,
    },

    /// R_info as a function of the number of environment fragments
    Redundancy {
        /// JSON sweep configuration (missing keys take defaults)
        #[arg(long)]
        config: Option<String>,

        /// Override the fragment counts (comma-separated)
        #[arg(long)]
        fragments: Option<String>,

        /// Override the coarse-graining
        #[arg(long)]
        coarse: Option<String>,

        /// Override the generator seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the curve as CSV
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            coarse,
            samples,
            flip,
            noise,
            fragments,
            alpha,
            lambda,
            beta,
            width,
            seed,
            output,
            json,
        } => commands::compare::run(commands::compare::CompareCommandConfig {
            coarse: &coarse,
            samples,
            flip_prob: flip,
            env_noise: noise,
            fragments,
            alpha,
            lambda,
            beta,
            width,
            seed,
            output_path: output.as_deref(),
            json_path: json.as_deref(),
        }),
        Commands::Sweep {
            config,
            coarse,
            samples,
            seed,
            out_dir,
            parallel,
            no_redundancy,
        } => commands::sweep::run(commands::sweep::SweepCommandConfig {
            config_path: config.as_deref(),
            coarse: coarse.as_deref(),
            samples,
            seed,
            out_dir: &out_dir,
            parallel,
            include_redundancy: !no_redundancy,
        }),
        Commands::Redundancy {
            config,
            fragments,
            coarse,
            seed,
            output,
        } => commands::redundancy::run(commands::redundancy::RedundancyCommandConfig {
            config_path: config.as_deref(),
            fragments: fragments.as_deref(),
            coarse: coarse.as_deref(),
            seed,
            output_path: output.as_deref(),
        }),
    }
}
