//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;

use invex_core::models::config::InvexConfig;
use invex_core::pdf::LopdfEngine;
use invex_core::DocumentProcessor;

/// Load the config from `--config`, else the default location, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvexConfig> {
    if let Some(path) = config_path {
        return Ok(InvexConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(InvexConfig::from_file(&default_path)?)
    } else {
        Ok(InvexConfig::default())
    }
}

/// Build a document processor from the loaded configuration.
pub fn build_processor(config: &InvexConfig) -> DocumentProcessor<LopdfEngine> {
    DocumentProcessor::with_engine(LopdfEngine::with_config(config.pdf.clone()))
        .with_config(config.extraction.clone())
}
