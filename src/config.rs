use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};
use crate::types::DEFAULT_NAMESPACE_SEPARATOR;

/// Name of the configuration file looked up in the working directory when no
/// `--config` flag is given.
pub const CONFIG_FILENAME: &str = "genelinks.json";

pub const DEFAULT_OUTPUT_FILE: &str = "output.csv";
pub const DEFAULT_ERROR_FILE: &str = "error.csv";
pub const DEFAULT_NORMALIZED_FILE: &str = "normalized.csv";

pub const DEFAULT_PROTEIN_COLUMN: &str = "Protein.stable.ID";
pub const DEFAULT_GENE_COLUMN: &str = "Gene.stable.ID";

/// Configuration for a normalization/resolution run.
///
/// Every field has a default, so a config file only needs the keys it
/// changes. Command-line flags override whatever is loaded here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Separator between species prefix and local id in compound identifiers.
    pub namespace_separator: char,
    /// Field separator of the raw interaction file; `None` splits on runs of
    /// whitespace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_separator: Option<char>,
    /// Reference column holding the external protein id.
    pub protein_column: String,
    /// Reference column holding the canonical gene id.
    pub gene_column: String,
    /// Skip and count malformed interaction lines instead of aborting.
    pub skip_malformed: bool,
    /// Worker threads for the per-record passes; 0 lets rayon decide.
    pub threads: usize,
    /// Default resolved-edge output path.
    pub output_file: String,
    /// Default unresolved-diagnostics output path.
    pub error_file: String,
    /// Default stage-1 normalized output path.
    pub normalized_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: 1,
            namespace_separator: DEFAULT_NAMESPACE_SEPARATOR,
            field_separator: None,
            protein_column: DEFAULT_PROTEIN_COLUMN.to_string(),
            gene_column: DEFAULT_GENE_COLUMN.to_string(),
            skip_malformed: false,
            threads: 0,
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            error_file: DEFAULT_ERROR_FILE.to_string(),
            normalized_file: DEFAULT_NORMALIZED_FILE.to_string(),
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

/// Loads the configuration from `config_path`.
///
/// A missing file yields the default configuration. Files ending in `.toml`
/// are parsed as TOML, anything else as JSON.
pub fn load_config(config_path: &Path) -> Result<PipelineConfig> {
    if !config_path.exists() {
        return Ok(PipelineConfig::default());
    }

    let contents = fs::read_to_string(config_path).map_err(|e| PipelineError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: PipelineConfig = if is_toml(config_path) {
        toml::from_str(&contents).map_err(|e| PipelineError::Config {
            message: format!(
                "failed to parse config file '{}': {}",
                config_path.display(),
                e
            ),
        })?
    } else {
        serde_json::from_str(&contents).map_err(|e| PipelineError::Config {
            message: format!(
                "failed to parse config file '{}': {}",
                config_path.display(),
                e
            ),
        })?
    };

    validate_config(&config)?;
    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it to the final location,
/// ensuring that a partial write never corrupts the configuration.
pub fn save_config(config_path: &Path, config: &PipelineConfig) -> Result<()> {
    let serialized = if is_toml(config_path) {
        toml::to_string_pretty(config).map_err(|e| PipelineError::Config {
            message: format!("failed to serialize config: {}", e),
        })?
    } else {
        serde_json::to_string_pretty(config).map_err(|e| PipelineError::Config {
            message: format!("failed to serialize config: {}", e),
        })?
    };

    let tmp_path = config_path.with_extension("tmp");

    fs::write(&tmp_path, &serialized).map_err(|e| PipelineError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, config_path).map_err(|e| PipelineError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            config_path.display(),
            e
        ),
    })?;

    Ok(())
}

/// Rejects settings that would make the parsers ambiguous.
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    if config.namespace_separator.is_whitespace() {
        return Err(PipelineError::Config {
            message: "namespace_separator must not be whitespace".to_string(),
        });
    }
    if config.field_separator == Some(config.namespace_separator) {
        return Err(PipelineError::Config {
            message: format!(
                "field_separator and namespace_separator are both '{}'",
                config.namespace_separator
            ),
        });
    }
    if config.protein_column.trim().is_empty() || config.gene_column.trim().is_empty() {
        return Err(PipelineError::Config {
            message: "protein_column and gene_column must be non-empty".to_string(),
        });
    }
    Ok(())
}

/// Appends `.csv` to an output path that lacks it.
pub fn ensure_csv_extension(path: &Path) -> PathBuf {
    let has_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if has_csv {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".csv");
        PathBuf::from(name)
    }
}
