use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use genelinks::config::{
    ensure_csv_extension, load_config, save_config, PipelineConfig, CONFIG_FILENAME,
};
use genelinks::pipeline::{Pipeline, RunPaths};
use genelinks::types::{RunSummary, Stage};
use tracing_subscriber::EnvFilter;

/// Normalize protein association scores and map them onto gene identifiers.
#[derive(Parser)]
#[command(
    name = "genelinks",
    version,
    about = "Normalize protein association scores and map them onto gene identifiers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON, or TOML when it ends in .toml)
    #[arg(short, long, global = true, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    json: bool,
}

/// Overrides shared by every processing command.
#[derive(Args)]
struct ProcessingArgs {
    /// Skip and count malformed records instead of aborting
    #[arg(long)]
    skip_malformed: bool,
    /// Worker threads (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,
    /// Field separator of the raw interaction file (default: whitespace)
    #[arg(long)]
    field_separator: Option<char>,
    /// Separator between species prefix and protein id
    #[arg(long)]
    namespace_separator: Option<char>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Destination (default: the --config path)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Normalize raw combined scores into cumulative-rank weights
    Normalize {
        /// Raw interaction file (`protein1 protein2 combined_score`)
        #[arg(short, long)]
        input: PathBuf,
        /// Normalized CSV output
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        processing: ProcessingArgs,
    },
    /// Map a normalized file onto gene identifiers
    Resolve {
        /// Normalized CSV produced by `normalize`
        #[arg(short, long)]
        input: PathBuf,
        /// Reference mapping with Protein.stable.ID / Gene.stable.ID columns
        #[arg(short = 'u', long)]
        reference: PathBuf,
        /// Resolved edge output
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Unresolved diagnostics output
        #[arg(short, long)]
        errors: Option<PathBuf>,
        #[command(flatten)]
        processing: ProcessingArgs,
    },
    /// Normalize and resolve in one pass
    Run {
        /// Raw interaction file (`protein1 protein2 combined_score`)
        #[arg(short, long)]
        input: PathBuf,
        /// Reference mapping with Protein.stable.ID / Gene.stable.ID columns
        #[arg(short = 'u', long)]
        reference: PathBuf,
        /// Resolved edge output
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Unresolved diagnostics output
        #[arg(short, long)]
        errors: Option<PathBuf>,
        /// Also write the intermediate normalized table here
        #[arg(short, long)]
        normalized: Option<PathBuf>,
        #[command(flatten)]
        processing: ProcessingArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Installs the stderr subscriber. `RUST_LOG` takes precedence over flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("genelinks={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> genelinks::errors::Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Init { path, force } => {
            let path = path.unwrap_or(cli.config);
            if path.exists() && !force {
                println!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                );
                return Ok(());
            }
            save_config(&path, &PipelineConfig::default())?;
            println!("Wrote default configuration to {}", path.display());
        }
        Commands::Normalize {
            input,
            output,
            processing,
        } => {
            let config = effective_config(&cli.config, &processing)?;
            let output = output_path(output, &config.normalized_file);
            let pipeline = Pipeline::new(config)?;
            let summary = pipeline.normalize(&input, &output)?;
            report(&summary, json, &[("Output file", output.as_path())]);
        }
        Commands::Resolve {
            input,
            reference,
            output,
            errors,
            processing,
        } => {
            let config = effective_config(&cli.config, &processing)?;
            let output = output_path(output, &config.output_file);
            let errors = output_path(errors, &config.error_file);
            let pipeline = Pipeline::new(config)?;
            let summary = pipeline.resolve(&input, &reference, &output, &errors)?;
            report(
                &summary,
                json,
                &[
                    ("Output file", output.as_path()),
                    ("Error file", errors.as_path()),
                ],
            );
        }
        Commands::Run {
            input,
            reference,
            output,
            errors,
            normalized,
            processing,
        } => {
            let config = effective_config(&cli.config, &processing)?;
            let paths = RunPaths {
                input,
                reference,
                output: output_path(output, &config.output_file),
                errors: output_path(errors, &config.error_file),
                normalized: normalized.map(|p| ensure_csv_extension(&p)),
            };
            let pipeline = Pipeline::new(config)?;
            let summary = pipeline.run(&paths)?;
            let mut files = vec![
                ("Output file", paths.output.as_path()),
                ("Error file", paths.errors.as_path()),
            ];
            if let Some(normalized) = &paths.normalized {
                files.push(("Normalized file", normalized.as_path()));
            }
            report(&summary, json, &files);
        }
    }
    Ok(())
}

/// Loads the config file and layers command-line overrides on top.
fn effective_config(
    config_path: &Path,
    processing: &ProcessingArgs,
) -> genelinks::errors::Result<PipelineConfig> {
    let mut config = load_config(config_path)?;
    if processing.skip_malformed {
        config.skip_malformed = true;
    }
    if let Some(threads) = processing.threads {
        config.threads = threads;
    }
    if let Some(sep) = processing.field_separator {
        config.field_separator = Some(sep);
    }
    if let Some(sep) = processing.namespace_separator {
        config.namespace_separator = sep;
    }
    Ok(config)
}

fn output_path(flag: Option<PathBuf>, default: &str) -> PathBuf {
    ensure_csv_extension(&flag.unwrap_or_else(|| PathBuf::from(default)))
}

fn report(summary: &RunSummary, json: bool, files: &[(&str, &Path)]) {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(summary).unwrap_or_default()
        );
        return;
    }

    println!("Run complete ({})", summary.stage.as_str());
    println!("  Records:       {}", summary.total_records);
    if summary.stage != Stage::Normalize {
        println!("  Resolved:      {}", summary.resolved);
        println!("  Unresolved:    {}", summary.unresolved);
        println!("  Index size:    {}", summary.index_size);
    }
    println!("  Parse errors:  {}", summary.parse_errors);
    println!("  Duration:      {}ms", summary.duration_ms);
    for (label, path) in files {
        println!("  {}: {}", label, path.display());
    }
    if !summary.is_consistent() {
        eprintln!("Warning: resolved + unresolved does not match the record count");
    }
}
