use std::{
    collections::{HashMap, HashSet},
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use glob::glob;
use rayon::{
    iter::{IndexedParallelIterator as _, IntoParallelRefIterator as _, ParallelIterator as _},
    ThreadPoolBuilder,
};

use pcd_exporter::{output::write_split, txt::write_points};
use pcd_ground::{CenteringMethod, GroundConfig, GroundLabeler, Labeler as _};
use pcd_parser::parsers::provider_for;

use crate::error::AppError;

fn is_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

fn is_txt(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Resolves the `--input` arguments into a list of scan files.
///
/// Glob patterns are expanded, directories contribute their `.txt` files in
/// name order, anything else is taken as a file path. A path reached through
/// several arguments is kept once, at its first position.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for input in inputs {
        if is_pattern(input) {
            for entry in glob(input)? {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => log::warn!("skipping unreadable glob entry: {}", e),
                }
            }
            continue;
        }

        let path = PathBuf::from(input);
        if path.is_dir() {
            let entries = fs::read_dir(&path).map_err(|source| AppError::Io {
                path: path.clone(),
                source,
            })?;
            let mut files: Vec<PathBuf> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && is_txt(p))
                .collect();
            files.sort();
            paths.extend(files);
        } else {
            paths.push(path);
        }
    }

    let mut seen = HashSet::new();
    paths.retain(|path| seen.insert(path.clone()));

    if paths.is_empty() {
        return Err(AppError::NoInputs);
    }
    Ok(paths)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Output name of every input, in input order.
///
/// Inputs sharing a file stem (`a/scan.txt`, `b/scan.txt`) get a numeric
/// suffix, so no two inputs write to the same output file.
pub fn output_stems(inputs: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = inputs.iter().map(|p| file_stem(p)).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(stem.as_str()).or_default() += 1;
    }
    let mut used: HashSet<String> = stems
        .iter()
        .filter(|stem| counts[stem.as_str()] == 1)
        .cloned()
        .collect();

    inputs
        .iter()
        .zip(&stems)
        .map(|(input, stem)| {
            if counts[stem.as_str()] == 1 {
                return stem.clone();
            }
            let mut n = 1;
            let mut unique = format!("{}_{}", stem, n);
            while used.contains(&unique) {
                n += 1;
                unique = format!("{}_{}", stem, n);
            }
            log::warn!("{:?} shares its name with another input, written as {}", input, unique);
            used.insert(unique.clone());
            unique
        })
        .collect()
}

/// Reads a JSON configuration file; missing keys keep their defaults.
pub fn load_config(path: Option<&Path>) -> Result<GroundConfig, AppError> {
    let Some(path) = path else {
        return Ok(GroundConfig::default());
    };
    let content = fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Command line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub num_lpr: Option<usize>,
    pub num_segments: Option<usize>,
    pub num_iters: Option<usize>,
    pub seed_threshold: Option<f64>,
    pub distance_threshold: Option<f64>,
    pub centering: Option<CenteringMethod>,
    pub noise_floor: Option<f64>,
    pub no_filter: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut GroundConfig) {
        if let Some(v) = self.num_lpr {
            config.num_lpr = v;
        }
        if let Some(v) = self.num_segments {
            config.num_segments = v;
        }
        if let Some(v) = self.num_iters {
            config.num_iters = v;
        }
        if let Some(v) = self.seed_threshold {
            config.seed_threshold = v;
        }
        if let Some(v) = self.distance_threshold {
            config.distance_threshold = v;
        }
        if let Some(v) = self.centering {
            config.centering = v;
        }
        if let Some(v) = self.noise_floor {
            config.noise_floor = Some(v);
        }
        if self.no_filter {
            config.noise_floor = None;
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub split: bool,
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub input: PathBuf,
    pub outputs: Vec<PathBuf>,
    pub point_count: usize,
    pub ground_count: usize,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: Vec<FileSummary>,
    pub failed: Vec<(PathBuf, AppError)>,
}

impl BatchSummary {
    pub fn point_count(&self) -> usize {
        self.processed.iter().map(|f| f.point_count).sum()
    }

    pub fn ground_count(&self) -> usize {
        self.processed.iter().map(|f| f.ground_count).sum()
    }
}

/// Parses, labels and writes one scan under the output name `stem`.
pub fn process_file(
    input: &Path,
    stem: &str,
    labeler: &GroundLabeler,
    options: &BatchOptions,
) -> Result<FileSummary, AppError> {
    let provider = provider_for(input)?;
    let point_cloud = provider.get_parser().parse()?;
    let point_count = point_cloud.len();

    let (labeled, report) = labeler.label(point_cloud)?;
    log::info!(
        "{:?}: {} of {} points labeled ground ({} segments skipped)",
        input,
        report.ground_count,
        point_count,
        report.skipped_segments()
    );

    let outputs = if options.split {
        let split = write_split(&options.output_dir, stem, &labeled)?;
        vec![split.ground, split.non_ground]
    } else {
        let path = options.output_dir.join(format!("{}.txt", stem));
        write_points(&path, &labeled.points)?;
        vec![path]
    };

    Ok(FileSummary {
        input: input.to_path_buf(),
        outputs,
        point_count,
        ground_count: report.ground_count,
    })
}

/// Processes every input on a dedicated rayon pool.
///
/// A failing file is logged and recorded; the remaining files are still
/// processed.
pub fn run_batch(
    inputs: &[PathBuf],
    config: GroundConfig,
    options: &BatchOptions,
) -> Result<BatchSummary, AppError> {
    let labeler = GroundLabeler::new(config)?;
    let stems = output_stems(inputs);
    let pool = ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .build()?;

    let results: Vec<(PathBuf, Result<FileSummary, AppError>)> = pool.install(|| {
        inputs
            .par_iter()
            .zip(&stems)
            .map(|(input, stem)| (input.clone(), process_file(input, stem, &labeler, options)))
            .collect()
    });

    let mut summary = BatchSummary::default();
    for (input, result) in results {
        match result {
            Ok(file) => summary.processed.push(file),
            Err(e) => {
                log::error!("{:?}: {}", input, e);
                summary.failed.push((input, e));
            }
        }
    }
    Ok(summary)
}
