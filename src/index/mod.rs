/// Identifier index.
///
/// Maps local protein identifiers (the part of a compound id after the
/// species prefix) to canonical gene identifiers. Built once per run from a
/// reference mapping file, then shared read-only with the resolver.
mod identifier_index;
mod universal;

pub use identifier_index::{IdentifierIndex, IndexBuilder, IndexColumns};
