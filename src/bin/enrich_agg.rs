//! enrich-agg - aggregate enrichment analysis results
//!
//! Command-line interface for combining per-feature-set enrichment results
//! into one table per group, tool and database.

use clap::{Parser, Subcommand, ValueEnum};
use enrichment_aggregate::aggregate::is_nonempty_file;
use enrichment_aggregate::data::AnnotationIndex;
use enrichment_aggregate::error::Result;
use enrichment_aggregate::pipeline::{
    plan, run_from_files, run_triple, EnrichmentConfig, PlannedTriple, Triple,
};
use enrichment_aggregate::resolve::{origin_from_file_name, resolve, OutputPaths};
use log::Level;
use std::path::{Path, PathBuf};

/// Output format for listings.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Aggregate and significance-filter enrichment analysis results
#[derive(Parser)]
#[command(name = "enrich-agg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug messages, including skipped result files
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate every group, tool and database in a configuration
    Run {
        /// Path to configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Annotation table CSV (overrides `annotation` in the configuration)
        #[arg(short, long)]
        annotation: Option<PathBuf>,

        /// Number of worker threads
        #[arg(short, long, default_value_t = num_cpus::get())]
        threads: usize,
    },

    /// List the triples a run would process and their candidate result files
    Plan {
        /// Path to configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Annotation table CSV (overrides `annotation` in the configuration)
        #[arg(short, long)]
        annotation: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print the feature sets of a group that a tool can analyse
    Resolve {
        /// Path to configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Annotation table CSV (overrides `annotation` in the configuration)
        #[arg(short, long)]
        annotation: Option<PathBuf>,

        /// Group name
        #[arg(short, long)]
        group: String,

        /// Tool name (e.g., "ORA_GSEApy")
        #[arg(short, long)]
        tool: String,
    },

    /// Aggregate an explicit list of result files for one tool and database
    Aggregate {
        /// Result files named `{feature_set}_{db}.csv`, comma-separated
        #[arg(short, long, required = true, value_delimiter = ',', num_args = 1..)]
        files: Vec<PathBuf>,

        /// Path to configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Tool name
        #[arg(short, long)]
        tool: String,

        /// Database name
        #[arg(short, long)]
        db: String,

        /// Group name, used in log messages
        #[arg(short, long, default_value = "custom")]
        group: String,

        /// Output path for all combined results
        #[arg(long)]
        results_all: PathBuf,

        /// Output path for significant results
        #[arg(long)]
        results_sig: PathBuf,
    },

    /// Generate an example configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "enrichment_config.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let start = std::time::Instant::now();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::Debug
    } else if cli.quiet {
        Level::Warn
    } else {
        Level::Info
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("Error: cannot initialise logging: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Run {
            config,
            annotation,
            threads,
        } => cmd_run(&config, annotation.as_deref(), threads),

        Commands::Plan {
            config,
            annotation,
            format,
        } => cmd_plan(&config, annotation.as_deref(), format),

        Commands::Resolve {
            config,
            annotation,
            group,
            tool,
        } => cmd_resolve(&config, annotation.as_deref(), &group, &tool),

        Commands::Aggregate {
            files,
            config,
            tool,
            db,
            group,
            results_all,
            results_sig,
        } => cmd_aggregate(&files, &config, &tool, &db, &group, results_all, results_sig),

        Commands::Example { output } => cmd_example(&output),
    };

    match result {
        Ok(true) => log::info!("Elapsed time: {:?}", start.elapsed()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Load configuration and annotation index.
fn load(config_path: &Path, annotation: Option<&Path>) -> Result<(EnrichmentConfig, AnnotationIndex)> {
    let config = EnrichmentConfig::from_path(config_path)?;
    let index = AnnotationIndex::from_csv(config.annotation_path(annotation)?)?;
    Ok((config, index))
}

/// Aggregate every triple; false when any triple failed.
fn cmd_run(config_path: &Path, annotation: Option<&Path>, threads: usize) -> Result<bool> {
    log::info!("Loading configuration from {:?}...", config_path);
    let summary = run_from_files(config_path, annotation, threads)?;

    print!("{}", summary);
    Ok(summary.is_success())
}

fn cmd_plan(config_path: &Path, annotation: Option<&Path>, format: Format) -> Result<bool> {
    let (config, index) = load(config_path, annotation)?;
    let planned = plan(&index, &config);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&planned)?),
        Format::Text => {
            for p in &planned {
                let found = p.inputs.iter().filter(|(_, path)| is_nonempty_file(path)).count();
                println!("{}  ({} of {} result files present)", p.triple, found, p.inputs.len());
                for (name, path) in &p.inputs {
                    let mark = if is_nonempty_file(path) { "+" } else { "-" };
                    println!("  {} {}  {}", mark, name, path.display());
                }
            }
        }
    }
    Ok(true)
}

fn cmd_resolve(
    config_path: &Path,
    annotation: Option<&Path>,
    group: &str,
    tool: &str,
) -> Result<bool> {
    let (_, index) = load(config_path, annotation)?;
    let names = resolve(&index, group, tool);
    if names.is_empty() {
        log::warn!("No feature sets in group '{}' are eligible for {}", group, tool);
    }
    for name in names {
        println!("{}", name);
    }
    Ok(true)
}

fn cmd_aggregate(
    files: &[PathBuf],
    config_path: &Path,
    tool: &str,
    db: &str,
    group: &str,
    results_all: PathBuf,
    results_sig: PathBuf,
) -> Result<bool> {
    let config = EnrichmentConfig::from_path(config_path)?;
    let tool_config = config.tool_config(tool)?;

    let inputs = files
        .iter()
        .map(|path| {
            let name = origin_from_file_name(path, db)
                .unwrap_or_else(|| path.display().to_string());
            (name, path.clone())
        })
        .collect();
    let planned = PlannedTriple {
        triple: Triple::new(group, tool, db),
        inputs,
        outputs: OutputPaths {
            all: results_all,
            sig: results_sig,
        },
    };

    let report = run_triple(&planned, &tool_config)?;
    log::info!(
        "[{}] {} of {} result files, {} rows, {} significant rows ({} terms)",
        planned.triple,
        report.n_loaded,
        report.n_candidates,
        report.n_rows,
        report.n_significant_rows,
        report.n_significant_terms
    );
    println!("Results saved in:\n  - {}\n  - {}", planned.outputs.all.display(), planned.outputs.sig.display());
    Ok(true)
}

fn cmd_example(output: &Path) -> Result<bool> {
    let yaml = EnrichmentConfig::example().to_yaml()?;
    std::fs::write(output, yaml)?;
    log::info!("Example configuration written to {:?}", output);
    Ok(true)
}
