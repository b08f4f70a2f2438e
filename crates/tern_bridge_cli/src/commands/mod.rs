//! CLI commands.

pub mod project;
pub mod query;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tern_bridge_core::{Config, Project, ProjectLocator, CONFIG_FILE_NAME};

/// Load configuration from `path`, or `./tern-bridge.toml`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(Path::new(CONFIG_FILE_NAME));
    Config::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Locate and scan the project owning `file`, with a spinner while scanning.
pub fn find_project(config: &Config, file: &Path) -> Result<Option<Project>> {
    let mut locator = ProjectLocator::new(config.project.clone())?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")?,
    );
    pb.set_message(format!("Scanning project for {}", file.display()));
    pb.enable_steady_tick(Duration::from_millis(80));

    let project = locator
        .project_for_file(file)
        .with_context(|| format!("Failed to load project for {}", file.display()));

    pb.finish_and_clear();
    project
}
