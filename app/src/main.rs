mod batch;
mod error;

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use pcd_exporter::output::create_versioned_dir;
use pcd_ground::CenteringMethod;

use batch::{expand_inputs, load_config, run_batch, BatchOptions, ConfigOverrides};
use error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "glabel",
    about = "Labels the ground points of LiDAR scans",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    /// Scan files, glob patterns or directories of .txt scans
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<String>,

    /// Base path of the versioned output directory
    #[arg(short, long, required = true, value_name = "DIR")]
    output: String,

    /// JSON configuration file
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Number of lowest points averaged into the LPR
    #[arg(long)]
    lpr: Option<usize>,

    /// Number of segments along the partition axis
    #[arg(long)]
    seg: Option<usize>,

    /// Number of plane estimation rounds
    #[arg(long)]
    iter: Option<usize>,

    #[arg(long = "th-seed")]
    th_seed: Option<f64>,

    #[arg(long = "th-dist")]
    th_dist: Option<f64>,

    /// Seed centering: mean or median
    #[arg(long)]
    method: Option<CenteringMethod>,

    /// Keep points under the noise floor
    #[arg(long, conflicts_with = "noise_floor")]
    no_filter: bool,

    #[arg(long, allow_negative_numbers = true)]
    noise_floor: Option<f64>,

    /// Write ground and non-ground points to separate files
    #[arg(long)]
    split: bool,

    #[arg(long, default_value_t = num_cpus::get())]
    threads: usize,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            num_lpr: self.lpr,
            num_segments: self.seg,
            num_iters: self.iter,
            seed_threshold: self.th_seed,
            distance_threshold: self.th_dist,
            centering: self.method,
            noise_floor: self.noise_floor,
            no_filter: self.no_filter,
        }
    }
}

fn init_logger(level: LevelFilter) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .init();
}

fn run(args: Cli) -> Result<bool, AppError> {
    let mut config = load_config(args.config.as_deref())?;
    args.overrides().apply(&mut config);
    log::info!("configuration: {:?}", config);

    let inputs = expand_inputs(&args.input)?;
    log::info!("input files: {}", inputs.len());

    let output_dir = create_versioned_dir(Path::new(&args.output))?;
    let options = BatchOptions {
        output_dir,
        split: args.split,
        threads: args.threads,
    };

    let start = std::time::Instant::now();
    log::info!("start labeling with {} threads...", options.threads);
    let summary = run_batch(&inputs, config, &options)?;

    log::info!(
        "labeled {} files ({} points, {} ground) in {:?}",
        summary.processed.len(),
        summary.point_count(),
        summary.ground_count(),
        start.elapsed()
    );
    if !summary.failed.is_empty() {
        log::error!("{} files failed", summary.failed.len());
    }
    Ok(summary.failed.is_empty())
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logger(args.log_level);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
