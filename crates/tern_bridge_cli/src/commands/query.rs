//! Query commands - hints, definition, references.

use crate::QueryArgs;
use anyhow::{Context, Result};
use console::style;
use serde_json::Value;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;
use tern_bridge_core::{
    absolute_from, BridgeError, BufferView, Config, DiskFileSystem, ProcessEngineFactory,
    SessionRegistry, Selection,
};

/// A started registry plus the view and project id a query runs against.
struct QueryContext {
    registry: SessionRegistry,
    project_id: String,
    view: BufferView,
}

impl QueryContext {
    fn open(config: &Config, args: &QueryArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let view = read_view(args, &cwd)?;

        let project = super::find_project(config, &args.file)?.with_context(|| {
            format!(
                "{} is not part of any project ({} not found)",
                args.file.display(),
                config.project.project_file_pattern
            )
        })?;
        let project_id = project.id.clone();

        let mut registry = SessionRegistry::new(
            ProcessEngineFactory::new(config.engine.clone()),
            DiskFileSystem,
        )
        .with_config(config.session.clone());
        registry
            .start_session(project.into(), Vec::new())
            .map_err(explain)?;
        debug!(project = %project_id, "session ready");

        Ok(Self {
            registry,
            project_id,
            view,
        })
    }
}

impl Drop for QueryContext {
    fn drop(&mut self) {
        self.registry.kill_all();
    }
}

/// Builds the view for `args.file`, named by its absolute path so it matches
/// the project's file list whatever directory the command runs from.
fn read_view(args: &QueryArgs, cwd: &Path) -> Result<BufferView> {
    let path = absolute_from(&args.file, cwd);
    let name = path.to_string_lossy().into_owned();
    let view = if args.stdin {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read buffer from stdin")?;
        BufferView::new(name, text).dirty(true)
    } else {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        BufferView::new(name, text)
    };

    let selection = match args.selection_end {
        Some(end) => Selection::range(args.offset, end),
        None => Selection::caret(args.offset),
    };
    Ok(view.with_selection(selection))
}

/// Attach the library's recovery hint to an error, if it has one.
fn explain(err: BridgeError) -> anyhow::Error {
    match err.recovery_suggestion() {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => err.into(),
    }
}

fn print_json(value: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

fn no_session(project_id: &str) {
    println!(
        "{} No analysis session for {}",
        style("×").red(),
        style(project_id).cyan()
    );
}

/// Print completions at the cursor.
pub fn hints(config: &Config, args: &QueryArgs) -> Result<()> {
    let mut ctx = QueryContext::open(config, args)?;
    let hints = ctx
        .registry
        .hints(&ctx.view, &ctx.project_id)
        .map_err(explain)?;

    let Some(hints) = hints else {
        no_session(&ctx.project_id);
        return Ok(());
    };

    if hints.list.is_empty() {
        println!("{} No completions", style("ℹ").blue());
        return Ok(());
    }

    println!(
        "{} {}..{}",
        style("Completions").bold(),
        hints.from,
        hints.to
    );
    for completion in &hints.list {
        let marker = if completion.guess { style("~").yellow() } else { style(" ").dim() };
        println!("{} {}", marker, completion.label());
    }
    Ok(())
}

/// Print the definition of the symbol at the cursor.
pub fn definition(config: &Config, args: &QueryArgs) -> Result<()> {
    let mut ctx = QueryContext::open(config, args)?;
    match ctx
        .registry
        .jump_to_definition(&ctx.view, &ctx.project_id)
        .map_err(explain)?
    {
        Some(answer) => print_json(&answer),
        None => {
            no_session(&ctx.project_id);
            Ok(())
        }
    }
}

/// Print references to the symbol at the cursor.
pub fn refs(config: &Config, args: &QueryArgs) -> Result<()> {
    let mut ctx = QueryContext::open(config, args)?;
    match ctx
        .registry
        .find_references(&ctx.view, &ctx.project_id)
        .map_err(explain)?
    {
        Some(answer) => print_json(&answer),
        None => {
            no_session(&ctx.project_id);
            Ok(())
        }
    }
}
