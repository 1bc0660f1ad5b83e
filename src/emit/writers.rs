use std::path::Path;

use tracing::info;

use super::AtomicCsvWriter;
use crate::errors::Result;
use crate::resolution::ResolutionResult;
use crate::types::*;

/// Shortest representation that round-trips, e.g. `0.6666666666666666` or `1`.
pub fn format_weight(weight: f64) -> String {
    format!("{weight}")
}

fn stage_normalized(
    path: &Path,
    records: &[NormalizedInteractionRecord],
) -> Result<AtomicCsvWriter> {
    let mut writer = AtomicCsvWriter::create(path, &NORMALIZED_HEADER)?;
    for record in records {
        let score = record.raw_score.to_string();
        let weight = format_weight(record.normalized_weight);
        writer.write_row([
            record.source_id.as_str(),
            record.target_id.as_str(),
            score.as_str(),
            weight.as_str(),
        ])?;
    }
    Ok(writer)
}

fn stage_resolved(path: &Path, edges: &[ResolvedEdge]) -> Result<AtomicCsvWriter> {
    let mut writer = AtomicCsvWriter::create(path, &RESOLVED_HEADER)?;
    for edge in edges {
        let weight = format_weight(edge.weight);
        writer.write_row([
            edge.source_gene.as_str(),
            edge.target_gene.as_str(),
            weight.as_str(),
        ])?;
    }
    Ok(writer)
}

fn stage_unresolved(path: &Path, entries: &[UnresolvedEntry]) -> Result<AtomicCsvWriter> {
    let mut writer = AtomicCsvWriter::create(path, &UNRESOLVED_HEADER)?;
    for entry in entries {
        writer.write_row([
            entry.source_local_id.as_str(),
            entry.source_gene.as_deref().unwrap_or(""),
            entry.target_local_id.as_str(),
            entry.target_gene.as_deref().unwrap_or(""),
        ])?;
    }
    Ok(writer)
}

/// Writes the stage-1 normalized table.
pub fn write_normalized(path: &Path, records: &[NormalizedInteractionRecord]) -> Result<()> {
    stage_normalized(path, records)?.commit()?;
    info!(path = %path.display(), rows = records.len(), "normalized output written");
    Ok(())
}

/// Writes the resolved edge table (`node1,node2,weight`).
pub fn write_resolved(path: &Path, edges: &[ResolvedEdge]) -> Result<()> {
    stage_resolved(path, edges)?.commit()?;
    Ok(())
}

/// Writes the unresolved diagnostics table (`protein1,gene1,protein2,gene2`).
pub fn write_unresolved(path: &Path, entries: &[UnresolvedEntry]) -> Result<()> {
    stage_unresolved(path, entries)?.commit()?;
    Ok(())
}

/// Writes both resolution streams. Neither file appears under its final name
/// unless both were staged completely.
pub fn write_resolution(output: &Path, errors: &Path, result: &ResolutionResult) -> Result<()> {
    write_run_outputs(None, output, errors, result)
}

/// Writes the resolution streams and, when given, the normalized table. Every
/// file is staged before any of them is renamed into place.
pub fn write_run_outputs(
    normalized: Option<(&Path, &[NormalizedInteractionRecord])>,
    output: &Path,
    errors: &Path,
    result: &ResolutionResult,
) -> Result<()> {
    let normalized_writer = normalized
        .map(|(path, records)| stage_normalized(path, records))
        .transpose()?;
    let resolved = stage_resolved(output, &result.resolved)?;
    let unresolved = stage_unresolved(errors, &result.unresolved)?;

    if let Some(writer) = normalized_writer {
        let rows = writer.rows();
        let path = writer.commit()?;
        info!(path = %path.display(), rows, "normalized output written");
    }
    resolved.commit()?;
    unresolved.commit()?;
    info!(
        output = %output.display(),
        errors = %errors.display(),
        resolved = result.resolved_count(),
        unresolved = result.unresolved_count(),
        "resolution output written"
    );
    Ok(())
}
