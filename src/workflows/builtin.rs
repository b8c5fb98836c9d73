// Workflows shipped with the binary

use super::catalog::StepCatalog;
use super::errors::CatalogError;
use super::loader::parse_catalog;

const BUILTINS: &[(&str, &str)] = &[
    ("review-loop", include_str!("catalogs/review-loop.toml")),
    ("doc-review", include_str!("catalogs/doc-review.toml")),
];

/// Names of the embedded workflows, in a fixed order
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.iter().any(|(builtin, _)| *builtin == name)
}

/// Parse an embedded workflow, `None` when no built-in has that name
pub fn load(name: &str) -> Option<Result<StepCatalog, CatalogError>> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| parse_catalog(source))
}
