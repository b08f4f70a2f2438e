//! Project inspection command.

use anyhow::Result;
use console::style;
use std::path::Path;
use tern_bridge_core::Config;

/// Show the project `file` belongs to and the files it declares.
pub fn show(config: &Config, file: &Path) -> Result<()> {
    let Some(project) = super::find_project(config, file)? else {
        println!(
            "{} {} is not part of any project (looked for {})",
            style("×").red(),
            file.display(),
            style(&config.project.project_file_pattern).cyan()
        );
        return Ok(());
    };

    println!("{}", style("Project:").bold());
    println!("  Id:  {}", style(&project.id).cyan());
    if let Some(dir) = &project.dir {
        println!("  Dir: {}", dir.display());
    }

    if let Some(plugins) = &project.plugins {
        let names: Vec<&str> = plugins.keys().map(String::as_str).collect();
        println!("  Plugins: {}", names.join(", "));
    }
    if let Some(libs) = &project.libs {
        println!("  Libs: {}", libs.len());
    }

    let files = project.files.unwrap_or_default();
    println!();
    println!("{} ({})", style("Files:").bold(), style(files.len()).cyan());
    for f in &files {
        println!("  {}", f);
    }

    Ok(())
}
