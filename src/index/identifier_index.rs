use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::errors::{PipelineError, Result};

/// Reference columns holding the protein and gene identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumns {
    pub protein: String,
    pub gene: String,
}

impl Default for IndexColumns {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for IndexColumns {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            protein: config.protein_column.clone(),
            gene: config.gene_column.clone(),
        }
    }
}

/// Accumulates mappings; later rows overwrite earlier ones.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    map: HashMap<String, String>,
    duplicates: usize,
    skipped: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one reference row. Rows with an empty side can never resolve and
    /// are skipped.
    pub fn insert(&mut self, protein: &str, gene: &str) {
        let (protein, gene) = (protein.trim(), gene.trim());
        if protein.is_empty() || gene.is_empty() {
            self.skipped += 1;
            return;
        }
        if let Some(previous) = self.map.insert(protein.to_string(), gene.to_string()) {
            self.duplicates += 1;
            debug!(protein, previous = %previous, gene, "duplicate mapping overwritten");
        }
    }

    pub fn finish(self) -> IdentifierIndex {
        if self.duplicates > 0 {
            warn!(
                duplicates = self.duplicates,
                "reference file maps some proteins more than once; last occurrence wins"
            );
        }
        if self.skipped > 0 {
            debug!(skipped = self.skipped, "reference rows with empty ids skipped");
        }
        IdentifierIndex {
            map: self.map,
            duplicates: self.duplicates,
            skipped: self.skipped,
        }
    }
}

/// Read-only lookup from local protein id to gene id.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    map: HashMap<String, String>,
    duplicates: usize,
    skipped: usize,
}

impl IdentifierIndex {
    /// Builds an index from in-memory `(protein, gene)` pairs.
    pub fn from_pairs<I, P, G>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, G)>,
        P: AsRef<str>,
        G: AsRef<str>,
    {
        let mut builder = IndexBuilder::new();
        for (protein, gene) in pairs {
            builder.insert(protein.as_ref(), gene.as_ref());
        }
        builder.finish()
    }

    /// Loads a reference file, choosing the format by extension: `.json` is
    /// read as a universal export, anything else as delimited CSV.
    pub fn load(path: &Path, columns: &IndexColumns) -> Result<Self> {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let index = if is_json {
            super::universal::load_universal_json(path, columns)?
        } else {
            Self::from_csv_path(path, columns)?
        };
        info!(
            path = %path.display(),
            entries = index.len(),
            duplicates = index.duplicates,
            "identifier index built"
        );
        Ok(index)
    }

    /// Builds an index from a CSV file with a header row.
    pub fn from_csv_path(path: &Path, columns: &IndexColumns) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| PipelineError::File {
            message: format!("failed to open reference file: {e}"),
            path: path.display().to_string(),
        })?;
        Self::from_csv_reader(file, &path.display().to_string(), columns)
    }

    /// Builds an index from any CSV source. `label` names the source in
    /// errors.
    pub fn from_csv_reader<R: Read>(
        source: R,
        label: &str,
        columns: &IndexColumns,
    ) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| PipelineError::MalformedRecord {
                    message: format!("reference header has no '{name}' column"),
                    path: label.to_string(),
                    line: Some(1),
                })
        };
        let protein_col = column(&columns.protein)?;
        let gene_col = column(&columns.gene)?;

        let mut builder = IndexBuilder::new();
        for row in reader.records() {
            let row = row?;
            builder.insert(
                row.get(protein_col).unwrap_or(""),
                row.get(gene_col).unwrap_or(""),
            );
        }
        Ok(builder.finish())
    }

    /// Canonical gene id for a local protein id.
    pub fn get(&self, local_id: &str) -> Option<&str> {
        self.map.get(local_id).map(String::as_str)
    }

    pub fn contains(&self, local_id: &str) -> bool {
        self.map.contains_key(local_id)
    }

    /// Number of distinct local ids.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Rows that overwrote an earlier mapping for the same protein.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Rows skipped because the protein or gene field was empty.
    pub fn skipped_rows(&self) -> usize {
        self.skipped
    }
}
