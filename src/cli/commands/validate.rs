use anyhow::Result;
use std::path::PathBuf;

use super::Command;
use crate::workflows::load_catalog;

pub struct ValidateCommand {
    pub path: PathBuf,
}

impl ValidateCommand {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Command for ValidateCommand {
    fn execute(&self) -> Result<()> {
        let catalog = load_catalog(&self.path)?;
        println!(
            "{}: workflow '{}' is valid ({} steps, min {} total steps)",
            self.path.display(),
            catalog.name(),
            catalog.len(),
            catalog.min_total_steps()
        );
        Ok(())
    }
}
