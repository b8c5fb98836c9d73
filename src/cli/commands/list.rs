use anyhow::Result;
use std::path::Path;

use super::Command;
use crate::config::StepDispatchConfig;
use crate::workflows::{builtin, load_catalog};

pub struct ListCommand {
    pub config: StepDispatchConfig,
}

impl ListCommand {
    pub fn new(config: StepDispatchConfig) -> Self {
        Self { config }
    }

    /// One line per workflow: built-ins first, then catalogs in the search dir sorted by file name
    pub fn run(&self) -> Result<Vec<String>> {
        let mut lines = Vec::new();

        for name in builtin::names() {
            if let Some(Ok(catalog)) = builtin::load(name) {
                lines.push(format!(
                    "{:<20} {:>2} steps  (built-in) {}",
                    catalog.name(),
                    catalog.len(),
                    catalog.description()
                ));
            }
        }

        for path in catalog_files(&self.config.workflows.search_dir)? {
            match load_catalog(&path) {
                Ok(catalog) => lines.push(format!(
                    "{:<20} {:>2} steps  ({}) {}",
                    catalog.name(),
                    catalog.len(),
                    path.display(),
                    catalog.description()
                )),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping invalid workflow catalog");
                    lines.push(format!("{:<20} invalid  ({})", "-", path.display()));
                }
            }
        }

        Ok(lines)
    }
}

fn catalog_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    files.sort();
    Ok(files)
}

impl Command for ListCommand {
    fn execute(&self) -> Result<()> {
        for line in self.run()? {
            println!("{}", line.trim_end());
        }
        Ok(())
    }
}
