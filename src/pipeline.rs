use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use crate::config::{validate_config, PipelineConfig};
use crate::emit::{check_writable, write_normalized, write_resolution, write_run_outputs};
use crate::errors::{PipelineError, Result};
use crate::index::{IdentifierIndex, IndexColumns};
use crate::normalize::ScoreNormalizer;
use crate::reader::{read_interactions, read_normalized, ReaderOptions};
use crate::resolution::Resolver;
use crate::types::*;

/// Central orchestrator that wires readers, normalizer, index, resolver and
/// writers together.
///
/// Work runs in two barriers. Ingestion and index building finish before any
/// normalized weight is computed, and outputs are only created once
/// normalization and the index are both ready. A failure before that point
/// leaves no output files behind.
pub struct Pipeline {
    config: PipelineConfig,
    pool: ThreadPool,
}

/// File locations for a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// Raw interaction file.
    pub input: PathBuf,
    /// Reference mapping file (CSV or universal JSON).
    pub reference: PathBuf,
    /// Resolved edge output.
    pub output: PathBuf,
    /// Unresolved diagnostics output.
    pub errors: PathBuf,
    /// Optional stage-1 normalized output.
    pub normalized: Option<PathBuf>,
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

// ---------------------------------------------------------------------------
// Preflight
// ---------------------------------------------------------------------------

fn check_input(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PipelineError::File {
            message: "input file not found".to_string(),
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Absolute form of `path` for identity checks. Outputs that do not exist yet
/// resolve through their parent directory.
fn resolved_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn check_output(path: &Path, inputs: &[PathBuf]) -> Result<()> {
    let resolved = resolved_path(path);
    if inputs.contains(&resolved) {
        return Err(PipelineError::File {
            message: "output path would overwrite an input file".to_string(),
            path: path.display().to_string(),
        });
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(PipelineError::File {
            message: format!("output directory '{}' does not exist", parent.display()),
            path: path.display().to_string(),
        });
    }
    if path.is_dir() {
        return Err(PipelineError::File {
            message: "output path is a directory".to_string(),
            path: path.display().to_string(),
        });
    }
    check_writable(path)
}

/// Validates every path before any reading starts.
fn preflight(inputs: &[&Path], outputs: &[&Path]) -> Result<()> {
    for input in inputs {
        check_input(input)?;
    }
    let inputs: Vec<PathBuf> = inputs.iter().map(|p| resolved_path(p)).collect();
    let mut seen: Vec<PathBuf> = Vec::with_capacity(outputs.len());
    for output in outputs {
        check_output(output, &inputs)?;
        let resolved = resolved_path(output);
        if seen.contains(&resolved) {
            return Err(PipelineError::File {
                message: "the same path is used for two outputs".to_string(),
                path: output.display().to_string(),
            });
        }
        seen.push(resolved);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl Pipeline {
    /// Validates the configuration and builds the worker pool.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        validate_config(&config)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("genelinks-worker-{i}"))
            .build()
            .map_err(|e| PipelineError::Config {
                message: format!("failed to build worker pool: {e}"),
            })?;
        Ok(Self { config, pool })
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn reader_options(&self) -> ReaderOptions {
        ReaderOptions::from(&self.config)
    }

    fn index_columns(&self) -> IndexColumns {
        IndexColumns::from(&self.config)
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

impl Pipeline {
    /// Stage 1 only: raw interactions to the normalized table.
    pub fn normalize(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        let start = Instant::now();
        preflight(&[input], &[output])?;
        info!(input = %input.display(), "normalizing scores");

        let options = self.reader_options();
        let normalized = self.pool.install(|| -> Result<_> {
            let outcome = read_interactions(input, &options)?;
            let normalizer = ScoreNormalizer::fit(&outcome.records)?;
            Ok((outcome.parse_errors, normalizer.apply(outcome.records)))
        });
        let (parse_errors, records) = normalized?;

        write_normalized(output, &records)?;

        Ok(RunSummary {
            stage: Stage::Normalize,
            total_records: records.len(),
            parse_errors,
            duration_ms: elapsed_ms(start),
            ..Default::default()
        })
    }

    /// Stage 2 only: a normalized table plus a reference file to the resolved
    /// and unresolved tables.
    pub fn resolve(
        &self,
        normalized: &Path,
        reference: &Path,
        output: &Path,
        errors: &Path,
    ) -> Result<RunSummary> {
        let start = Instant::now();
        preflight(&[normalized, reference], &[output, errors])?;
        info!(
            input = %normalized.display(),
            reference = %reference.display(),
            "resolving normalized interactions"
        );

        let options = self.reader_options();
        let columns = self.index_columns();
        let (records, index) = self.pool.install(|| {
            rayon::join(
                || read_normalized(normalized, &options),
                || IdentifierIndex::load(reference, &columns),
            )
        });
        let outcome = records?;
        let index = index?;
        if outcome.records.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let result = self
            .pool
            .install(|| Resolver::new(&index).resolve_all(&outcome.records));
        write_resolution(output, errors, &result)?;

        Ok(RunSummary {
            stage: Stage::Resolve,
            total_records: result.total,
            resolved: result.resolved_count(),
            unresolved: result.unresolved_count(),
            parse_errors: outcome.parse_errors,
            index_size: index.len(),
            duplicate_mappings: index.duplicates(),
            duration_ms: elapsed_ms(start),
        })
    }

    /// Both stages. Reading plus histogram building runs concurrently with the
    /// index build; resolution starts once both have finished.
    pub fn run(&self, paths: &RunPaths) -> Result<RunSummary> {
        let start = Instant::now();
        let mut outputs = vec![paths.output.as_path(), paths.errors.as_path()];
        if let Some(normalized) = &paths.normalized {
            outputs.push(normalized.as_path());
        }
        preflight(&[paths.input.as_path(), paths.reference.as_path()], &outputs)?;
        info!(
            input = %paths.input.display(),
            reference = %paths.reference.display(),
            "starting full run"
        );

        let options = self.reader_options();
        let columns = self.index_columns();
        let (ingested, index) = self.pool.install(|| {
            rayon::join(
                || -> Result<_> {
                    let outcome = read_interactions(&paths.input, &options)?;
                    let normalizer = ScoreNormalizer::fit(&outcome.records)?;
                    Ok((outcome, normalizer))
                },
                || IdentifierIndex::load(&paths.reference, &columns),
            )
        });
        let (outcome, normalizer) = ingested?;
        let index = index?;
        info!(
            records = outcome.records.len(),
            parse_errors = outcome.parse_errors,
            index_size = index.len(),
            "ingestion complete"
        );

        let parse_errors = outcome.parse_errors;
        let (normalized, result) = self.pool.install(|| {
            let normalized = normalizer.apply(outcome.records);
            let result = Resolver::new(&index).resolve_all(&normalized);
            (normalized, result)
        });

        write_run_outputs(
            paths
                .normalized
                .as_deref()
                .map(|path| (path, normalized.as_slice())),
            &paths.output,
            &paths.errors,
            &result,
        )?;

        Ok(RunSummary {
            stage: Stage::Full,
            total_records: result.total,
            resolved: result.resolved_count(),
            unresolved: result.unresolved_count(),
            parse_errors,
            index_size: index.len(),
            duplicate_mappings: index.duplicates(),
            duration_ms: elapsed_ms(start),
        })
    }
}
