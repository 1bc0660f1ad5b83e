//! Reader for the JSON "universal" gene export: an array of entries, each a
//! list of `{ "name": <column>, "value": <cell> }` pairs.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::identifier_index::{IdentifierIndex, IndexBuilder, IndexColumns};
use crate::errors::{PipelineError, Result};

#[derive(Debug, Deserialize)]
struct UniversalEntry {
    row: Vec<UniversalField>,
}

#[derive(Debug, Deserialize)]
struct UniversalField {
    name: String,
    #[serde(default)]
    value: Value,
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl UniversalEntry {
    fn get(&self, column: &str) -> Option<String> {
        // Later fields win, mirroring how the export flattens rows.
        self.row
            .iter()
            .rev()
            .find(|f| f.name == column)
            .map(|f| cell_text(&f.value))
    }
}

pub(super) fn load_universal_json(
    path: &Path,
    columns: &IndexColumns,
) -> Result<IdentifierIndex> {
    let file = File::open(path).map_err(|e| PipelineError::File {
        message: format!("failed to open reference file: {e}"),
        path: path.display().to_string(),
    })?;
    let entries: Vec<UniversalEntry> = serde_json::from_reader(BufReader::new(file))?;
    from_entries(&entries, &path.display().to_string(), columns)
}

fn from_entries(
    entries: &[UniversalEntry],
    label: &str,
    columns: &IndexColumns,
) -> Result<IdentifierIndex> {
    let mut builder = IndexBuilder::new();
    let mut saw_protein_column = false;

    for entry in entries {
        let protein = entry.get(&columns.protein);
        saw_protein_column |= protein.is_some();
        let gene = entry.get(&columns.gene).unwrap_or_default();
        builder.insert(protein.as_deref().unwrap_or(""), &gene);
    }

    if !entries.is_empty() && !saw_protein_column {
        return Err(PipelineError::MalformedRecord {
            message: format!("no entry has a '{}' field", columns.protein),
            path: label.to_string(),
            line: None,
        });
    }
    Ok(builder.finish())
}
