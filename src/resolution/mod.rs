/// Identifier resolution module.
///
/// Maps both endpoints of each normalized interaction to gene identifiers.
/// Interactions with an unmapped endpoint are diverted to a diagnostic
/// stream, never dropped.
mod resolver;

pub use resolver::{ResolutionResult, Resolver};
