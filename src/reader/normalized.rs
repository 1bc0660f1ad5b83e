use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use super::{ReadOutcome, ReaderOptions};
use crate::errors::{PipelineError, Result};
use crate::types::{CompoundId, NormalizedInteractionRecord, Score, NORMALIZED_HEADER};

/// Column positions resolved from the stage-1 header.
struct Columns {
    protein1: usize,
    protein2: usize,
    combined_score: usize,
    weight: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord, path: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| PipelineError::MalformedRecord {
                    message: format!("missing column '{name}' in normalized header"),
                    path: path.to_string(),
                    line: Some(1),
                })
        };
        let [p1, p2, score, weight] = NORMALIZED_HEADER;
        Ok(Self {
            protein1: find(p1)?,
            protein2: find(p2)?,
            combined_score: find(score)?,
            weight: find(weight)?,
        })
    }
}

fn field<'r>(row: &'r StringRecord, index: usize, name: &str) -> Result<&'r str> {
    row.get(index)
        .ok_or_else(|| PipelineError::malformed(format!("row has no '{name}' field")))
}

fn parse_weight(text: &str) -> Result<f64> {
    let weight: f64 = text
        .trim()
        .parse()
        .map_err(|_| PipelineError::malformed(format!("weight '{text}' is not a number")))?;
    if weight.is_finite() && weight > 0.0 && weight <= 1.0 {
        Ok(weight)
    } else {
        Err(PipelineError::malformed(format!(
            "weight {weight} is outside the range (0, 1]"
        )))
    }
}

fn parse_row(
    row: &StringRecord,
    columns: &Columns,
    options: &ReaderOptions,
) -> Result<NormalizedInteractionRecord> {
    let sep = options.namespace_separator;
    Ok(NormalizedInteractionRecord {
        source_id: CompoundId::parse_with(field(row, columns.protein1, "protein1")?, sep)?,
        target_id: CompoundId::parse_with(field(row, columns.protein2, "protein2")?, sep)?,
        raw_score: Score::parse(field(row, columns.combined_score, "combined_score")?)?,
        normalized_weight: parse_weight(field(row, columns.weight, "new_combined_score")?)?,
    })
}

/// Reads a stage-1 normalized CSV (`protein1,protein2,combined_score,new_combined_score`).
///
/// Columns are located by name, so extra or reordered columns are accepted.
pub fn read_normalized(
    path: &Path,
    options: &ReaderOptions,
) -> Result<ReadOutcome<NormalizedInteractionRecord>> {
    let label = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| PipelineError::File {
            message: format!("failed to open normalized file: {e}"),
            path: label.clone(),
        })?;

    let columns = Columns::from_headers(reader.headers()?, &label)?;

    let mut outcome = ReadOutcome::default();
    for row in reader.records() {
        let (line, parsed) = match row {
            Ok(row) => (
                row.position().map(|p| p.line()).unwrap_or(0),
                parse_row(&row, &columns, options),
            ),
            Err(e) => {
                let utf8 = match e.kind() {
                    csv::ErrorKind::Utf8 { pos, err } => {
                        Some((pos.as_ref().map(|p| p.line()).unwrap_or(0), err.field() + 1))
                    }
                    _ => None,
                };
                let Some((line, field)) = utf8 else {
                    return Err(e.into());
                };
                (
                    line,
                    Err(PipelineError::malformed(format!(
                        "invalid UTF-8 in field {field}"
                    ))),
                )
            }
        };
        match parsed {
            Ok(record) => outcome.records.push(record),
            Err(e) if options.skip_malformed => {
                outcome.parse_errors += 1;
                warn!(path = %label, line, error = %e, "skipping malformed row");
            }
            Err(e) => return Err(e.at(&label, line)),
        }
    }

    debug!(
        path = %label,
        records = outcome.records.len(),
        parse_errors = outcome.parse_errors,
        "normalized file read"
    );
    Ok(outcome)
}
