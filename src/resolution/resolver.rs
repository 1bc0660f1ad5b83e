use rayon::prelude::*;
use tracing::info;

use crate::index::IdentifierIndex;
use crate::types::*;

/// Resolves normalized interactions against a fully built identifier index.
///
/// Lookups are pure: the same local id always resolves the same way for a
/// given index, so a miss is final for the run.
pub struct Resolver<'a> {
    index: &'a IdentifierIndex,
}

/// Both output streams of a resolution pass, in input order.
#[derive(Debug, Clone, Default)]
pub struct ResolutionResult {
    pub resolved: Vec<ResolvedEdge>,
    pub unresolved: Vec<UnresolvedEntry>,
    /// Number of records fed to the resolver.
    pub total: usize,
}

impl ResolutionResult {
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }

    /// Every input record landed in exactly one stream.
    pub fn is_complete(&self) -> bool {
        self.resolved.len() + self.unresolved.len() == self.total
    }
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a IdentifierIndex) -> Self {
        Self { index }
    }

    /// Resolves a single record.
    ///
    /// Both local ids must map for a [`ResolvedEdge`]; otherwise the record
    /// becomes an [`UnresolvedEntry`] with the failed side(s) left empty.
    pub fn resolve_one(&self, record: &NormalizedInteractionRecord) -> Resolution {
        let source_local = record.source_id.local_id();
        let target_local = record.target_id.local_id();

        match (self.index.get(source_local), self.index.get(target_local)) {
            (Some(source_gene), Some(target_gene)) => Resolution::Resolved(ResolvedEdge {
                source_gene: source_gene.to_string(),
                target_gene: target_gene.to_string(),
                weight: record.normalized_weight,
            }),
            (source_gene, target_gene) => Resolution::Unresolved(UnresolvedEntry {
                source_local_id: source_local.to_string(),
                source_gene: source_gene.map(str::to_string),
                target_local_id: target_local.to_string(),
                target_gene: target_gene.map(str::to_string),
            }),
        }
    }

    /// Resolves a batch in parallel and splits it into the two streams,
    /// preserving input order within each.
    pub fn resolve_all(&self, records: &[NormalizedInteractionRecord]) -> ResolutionResult {
        let outcomes: Vec<Resolution> = records.par_iter().map(|r| self.resolve_one(r)).collect();

        let mut result = ResolutionResult {
            total: records.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Resolution::Resolved(edge) => result.resolved.push(edge),
                Resolution::Unresolved(entry) => result.unresolved.push(entry),
            }
        }
        debug_assert!(result.is_complete());

        let (mut source_only, mut target_only, mut both) = (0usize, 0usize, 0usize);
        for entry in &result.unresolved {
            match (entry.source_missing(), entry.target_missing()) {
                (true, true) => both += 1,
                (true, false) => source_only += 1,
                (false, true) => target_only += 1,
                (false, false) => {}
            }
        }
        info!(
            total = result.total,
            resolved = result.resolved_count(),
            unresolved = result.unresolved_count(),
            source_only,
            target_only,
            both,
            "resolution complete"
        );

        result
    }
}
