//! Incremental file-set synchronization between a project and its engine.

use crate::engine::AnalysisEngine;
use crate::error::Result;
use std::collections::HashSet;
use tracing::debug;

/// Difference between a session's loaded files and a declared file list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDelta {
    /// Declared but not loaded, in declaration order.
    pub to_add: Vec<String>,
    /// Loaded but no longer declared, in load order.
    pub to_remove: Vec<String>,
}

impl FileDelta {
    /// Computes the delta; order-insensitive, duplicates collapse.
    pub fn compute(loaded: &[String], declared: &[String]) -> Self {
        let loaded_set: HashSet<&str> = loaded.iter().map(String::as_str).collect();
        let declared_set: HashSet<&str> = declared.iter().map(String::as_str).collect();

        let mut seen = HashSet::new();
        let to_add = declared
            .iter()
            .filter(|f| !loaded_set.contains(f.as_str()) && seen.insert(f.as_str()))
            .cloned()
            .collect();
        let to_remove = loaded
            .iter()
            .filter(|f| !declared_set.contains(f.as_str()))
            .cloned()
            .collect();

        Self { to_add, to_remove }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Removing a file can invalidate cross-file inference, so it forces a reset.
    pub fn needs_reset(&self) -> bool {
        !self.to_remove.is_empty()
    }
}

/// Brings the engine's file set in line with `declared`.
///
/// Returns whether anything changed. A second call with the same list
/// touches nothing.
pub fn sync_files(engine: &mut dyn AnalysisEngine, declared: &[String]) -> Result<bool> {
    let delta = FileDelta::compute(&engine.files(), declared);
    if delta.is_empty() {
        return Ok(false);
    }

    for name in &delta.to_add {
        engine.add_file(name)?;
    }
    for name in &delta.to_remove {
        engine.remove_file(name)?;
    }
    if delta.needs_reset() {
        engine.reset()?;
    }

    debug!(
        added = delta.to_add.len(),
        removed = delta.to_remove.len(),
        reset = delta.needs_reset(),
        "synced project files"
    );
    Ok(true)
}
