//! Turns source text into a set of resolved importee ids

use crate::error::ParseError;
use crate::model::ModuleId;
use std::collections::BTreeSet;

/// Extracts raw import specifiers from module source.
///
/// Must be deterministic for identical input and report malformed source as an
/// error rather than an empty set.
pub trait ImportParser: Send + Sync {
    fn parse(&self, source: &str, id: &ModuleId) -> Result<BTreeSet<String>, ParseError>;
}

/// Maps an import specifier to a module id. `None` means "cannot resolve".
pub trait Resolve: Send + Sync {
    fn resolve(&self, specifier: &str, importer: &ModuleId) -> Option<ModuleId>;
}

impl<F> Resolve for F
where
    F: Fn(&str, &ModuleId) -> Option<ModuleId> + Send + Sync,
{
    fn resolve(&self, specifier: &str, importer: &ModuleId) -> Option<ModuleId> {
        self(specifier, importer)
    }
}

/// Parse `source` and resolve every specifier against `importer`.
///
/// Unresolved specifiers are dropped; they only show up in debug logs.
pub fn build_importee_set(
    parser: &dyn ImportParser,
    source: &str,
    importer: &ModuleId,
    resolver: &dyn Resolve,
) -> Result<BTreeSet<ModuleId>, ParseError> {
    let specifiers = parser.parse(source, importer)?;
    let mut resolved = BTreeSet::new();

    for specifier in &specifiers {
        match resolver.resolve(specifier, importer) {
            Some(id) => {
                resolved.insert(id);
            }
            None => {
                tracing::debug!(importer = %importer, specifier = %specifier, "unresolved import dropped");
            }
        }
    }

    Ok(resolved)
}
