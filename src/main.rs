use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info};

use fastee_distance::{
    Family, FamilyKind, FamilyOptions, SeriesCollection, SeriesTransform, z_normalize_collection,
};
use fastee_io::{ClassMap, ExperimentName, ResultWriter, UcrReader};
use fastee_nn::{
    BruteForceLoocv, ChallengerOrder, ElasticNn, ParameterSweep, Strategy, SweepConfig,
};

#[derive(Parser)]
#[command(name = "fastee")]
#[command(about = "Leave-one-out parameter search for elastic-distance 1-NN time series classifiers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// How the nearest-neighbour table is built.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Pruning-driven incremental sweep
    Sweep,
    /// Full pairwise distance matrix at every parameter
    BruteForce,
}

/// Order in which earlier series challenge a slot.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    /// Ascending distance to the challenger's own nearest neighbour
    Own,
    /// Ascending best known lower bound
    Lb,
}

/// Shared search settings.
#[derive(Args, Debug, Clone)]
struct SearchArgs {
    /// Use the derivative of every series (DDTW, WDDTW, ...)
    #[arg(long, default_value_t = false)]
    derivative: bool,

    /// Z-normalize every series before computing distances
    #[arg(long, default_value_t = false)]
    normalize: bool,

    /// Table construction strategy
    #[arg(long, value_enum, default_value = "sweep")]
    strategy: StrategyArg,

    /// Number of DTW windows between 0 and the longest series length
    #[arg(long, default_value_t = 100)]
    window_steps: usize,

    /// Challenger order used by the sweep
    #[arg(long, value_enum, default_value = "own")]
    order: OrderArg,

    /// Disable upper-bound seeding of each slot's score to beat
    #[arg(long, default_value_t = false)]
    no_upper_bounds: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Pick the best parameter of one family by leave-one-out on a training split
    Search {
        /// Path to the training split
        #[arg(long)]
        train: PathBuf,

        /// Distance family: dtw, wdtw, erp, lcss, msm, twe
        #[arg(long)]
        family: FamilyKind,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Search on a training split, then classify a test split
    Evaluate {
        /// Path to the training split
        #[arg(long)]
        train: PathBuf,

        /// Path to the test split
        #[arg(long)]
        test: PathBuf,

        /// Distance family: dtw, wdtw, erp, lcss, msm, twe
        #[arg(long)]
        family: FamilyKind,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Evaluate every (dataset, family) pair of a UCR archive in parallel
    Batch {
        /// Archive root holding <name>/<name>_TRAIN.tsv and <name>/<name>_TEST.tsv
        #[arg(long)]
        root: PathBuf,

        /// Comma-separated dataset names
        #[arg(long, value_delimiter = ',', required = true)]
        datasets: Vec<String>,

        /// Comma-separated distance families
        #[arg(long, value_delimiter = ',', default_value = "dtw")]
        families: Vec<FamilyKind>,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        search: SearchArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct SearchOutput {
    experiment: String,
    family: FamilyKind,
    strategy: &'static str,
    n_train: usize,
    best_param: usize,
    best_value: String,
    loocv_accuracy: f64,
    test_accuracy: Option<f64>,
    full_distances: u64,
    prunes: u64,
    elapsed_secs: f64,
}

#[derive(Serialize)]
struct BatchEntry {
    dataset: String,
    family: FamilyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<SearchOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct BatchOutput {
    n_jobs: usize,
    n_failed: usize,
    jobs: Vec<BatchEntry>,
}

fn build_strategy(args: &SearchArgs) -> Strategy {
    match args.strategy {
        StrategyArg::BruteForce => Strategy::BruteForce(BruteForceLoocv),
        StrategyArg::Sweep => {
            let order = match args.order {
                OrderArg::Own => ChallengerOrder::OwnNeighborDistance,
                OrderArg::Lb => ChallengerOrder::LowerBound,
            };
            let config = SweepConfig::new()
                .with_challenger_order(order)
                .with_upper_bound_seeding(!args.no_upper_bounds);
            Strategy::Sweep(ParameterSweep::new(config))
        }
    }
}

fn preprocess(collection: SeriesCollection, args: &SearchArgs) -> Result<SeriesCollection> {
    let mut result = collection;
    if args.normalize {
        result = z_normalize_collection(&result).context("z-normalization failed")?;
        info!(n = result.len(), "z-normalized series");
    }
    if args.derivative {
        result = SeriesTransform::Derivative
            .apply_collection(&result)
            .context("derivative computation failed")?;
        info!(n = result.len(), "computed derivative series");
    }
    Ok(result)
}

/// Search one family on `train`, optionally evaluate on `test`, and write
/// every artifact.
fn run_job(
    kind: FamilyKind,
    train: &Path,
    test: Option<&Path>,
    experiment: String,
    output_dir: &Path,
    args: &SearchArgs,
) -> Result<SearchOutput> {
    let experiment_name = ExperimentName::new(experiment.clone())?;

    // 1. Read splits
    let train_ds = UcrReader::new(train)
        .read_train()
        .with_context(|| format!("failed to read training split {}", train.display()))?;
    let classes: ClassMap = train_ds.classes;
    let test_collection = match test {
        Some(path) => Some(
            UcrReader::new(path)
                .read_test(&classes)
                .with_context(|| format!("failed to read test split {}", path.display()))?
                .collection,
        ),
        None => None,
    };

    // 2. Preprocess
    let train_collection = preprocess(train_ds.collection, args)?;
    let test_collection = test_collection.map(|c| preprocess(c, args)).transpose()?;

    // 3. Search
    let options = FamilyOptions {
        window_steps: args.window_steps,
    };
    let family = Family::build(kind, &train_collection, options)
        .with_context(|| format!("failed to build {kind} parameter grid"))?;
    let strategy = build_strategy(args);
    let n_train = train_collection.len();
    let (model, report) = ElasticNn::fit(family, train_collection, &strategy)
        .with_context(|| format!("{kind} parameter search failed"))?;

    // 4. Write search artifacts
    let writer = ResultWriter::new(output_dir, experiment_name)?;
    writer.write_search(&report, &classes)?;
    writer.write_curve(&report, model.family())?;

    // 5. Evaluate
    let test_accuracy = match &test_collection {
        Some(test) => {
            let evaluation = model.evaluate(test).context("evaluation failed")?;
            writer.write_evaluation(&evaluation, &classes)?;
            info!(accuracy = evaluation.accuracy, "test split classified");
            Some(evaluation.accuracy)
        }
        None => None,
    };

    Ok(SearchOutput {
        experiment,
        family: kind,
        strategy: report.strategy,
        n_train,
        best_param: report.best_param,
        best_value: report.best_value.to_string(),
        loocv_accuracy: report.loocv_accuracy,
        test_accuracy,
        full_distances: report.counters.full_distances,
        prunes: report.counters.prunes(),
        elapsed_secs: report.elapsed_secs,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Search {
            train,
            family,
            experiment,
            output_dir,
            search,
        } => {
            let output = run_job(family, &train, None, experiment, &output_dir, &search)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Evaluate {
            train,
            test,
            family,
            experiment,
            output_dir,
            search,
        } => {
            let output = run_job(family, &train, Some(&test), experiment, &output_dir, &search)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Batch {
            root,
            datasets,
            families,
            output_dir,
            search,
        } => {
            let jobs: Vec<(String, FamilyKind)> = datasets
                .iter()
                .flat_map(|d| families.iter().map(move |&f| (d.clone(), f)))
                .collect();
            info!(n_jobs = jobs.len(), "batch started");

            // One independent job per (dataset, family); a failure does not stop the others.
            let entries: Vec<BatchEntry> = jobs
                .into_par_iter()
                .map(|(dataset, family)| {
                    let dir = root.join(&dataset);
                    let train = dir.join(format!("{dataset}_TRAIN.tsv"));
                    let test = dir.join(format!("{dataset}_TEST.tsv"));
                    let experiment = format!("{dataset}_{family}");
                    match run_job(family, &train, Some(&test), experiment, &output_dir, &search) {
                        Ok(result) => BatchEntry {
                            dataset,
                            family,
                            result: Some(result),
                            error: None,
                        },
                        Err(e) => {
                            let message = format!("{e:#}");
                            error!(%dataset, %family, error = %message, "job failed");
                            BatchEntry {
                                dataset,
                                family,
                                result: None,
                                error: Some(message),
                            }
                        }
                    }
                })
                .collect();

            let n_failed = entries.iter().filter(|e| e.error.is_some()).count();
            info!(n_jobs = entries.len(), n_failed, "batch complete");
            let output = BatchOutput {
                n_jobs: entries.len(),
                n_failed,
                jobs: entries,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
