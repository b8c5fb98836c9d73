// Catalog files - TOML workflow definitions supplied by the embedding application

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::catalog::StepCatalog;
use super::errors::CatalogError;
use super::types::{Dispatch, GateConfig, Routing, Step};

/// On-disk shape of a workflow catalog
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Command prefix for rendered next invocations
    pub invoke: String,
    #[serde(default)]
    pub min_total_steps: Option<u32>,
    #[serde(default)]
    pub steps: Vec<StepEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepEntry {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub routing: Routing,
    #[serde(default)]
    pub dispatch: Option<Dispatch>,
    #[serde(default)]
    pub gate: Option<GateConfig>,
}

impl From<CatalogFile> for StepCatalog {
    fn from(file: CatalogFile) -> Self {
        let mut catalog = StepCatalog::new(file.name, file.invoke).with_description(file.description);
        if let Some(minimum) = file.min_total_steps {
            catalog = catalog.with_min_total_steps(minimum);
        }
        for entry in file.steps {
            let step = Step {
                title: entry.title,
                actions: entry.actions,
                routing: entry.routing,
                dispatch: entry.dispatch,
                gate: entry.gate,
            };
            catalog = catalog.with_step(entry.number, step);
        }
        catalog
    }
}

/// Parse and validate a catalog from TOML text
pub fn parse_catalog(source: &str) -> Result<StepCatalog, CatalogError> {
    let file: CatalogFile = toml::from_str(source)?;

    let mut seen = std::collections::BTreeSet::new();
    if let Some(duplicate) = file.steps.iter().find(|entry| !seen.insert(entry.number)) {
        return Err(CatalogError::Parse(format!(
            "workflow '{}' defines step {} more than once",
            file.name, duplicate.number
        )));
    }

    let catalog = StepCatalog::from(file);
    catalog.validate()?;
    Ok(catalog)
}

/// Read a catalog file from disk.
///
/// I/O belongs to the embedding layer; the dispatcher only ever sees the
/// resulting `StepCatalog`.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> anyhow::Result<StepCatalog> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read workflow file {}: {}", path.display(), e))?;
    let catalog = parse_catalog(&source)
        .map_err(|e| anyhow::anyhow!("Invalid workflow file {}: {}", path.display(), e))?;
    tracing::info!(
        path = %path.display(),
        workflow = %catalog.name(),
        steps = catalog.len(),
        "Loaded workflow catalog"
    );
    Ok(catalog)
}
