//! Plugin resolution at session creation.

use crate::error::Result;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

/// A plugin turned into engine-level pieces.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlugin {
    /// Key the plugin's options are stored under.
    pub id: String,
    /// Definitions the plugin contributes.
    pub definitions: Vec<Value>,
    /// Options handed to the engine for this plugin.
    pub options: Value,
}

/// Turns a declared plugin into a [`ResolvedPlugin`].
///
/// `Ok(None)` means the plugin is unknown; it is skipped with a warning.
pub trait PluginLoader {
    fn load(&self, name: &str, config: &Value) -> Result<Option<ResolvedPlugin>>;
}

impl<F> PluginLoader for F
where
    F: Fn(&str, &Value) -> Result<Option<ResolvedPlugin>>,
{
    fn load(&self, name: &str, config: &Value) -> Result<Option<ResolvedPlugin>> {
        self(name, config)
    }
}

/// Loader that knows no plugins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlugins;

impl PluginLoader for NoPlugins {
    fn load(&self, _name: &str, _config: &Value) -> Result<Option<ResolvedPlugin>> {
        Ok(None)
    }
}

/// Definitions and options collected from a project's plugins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginSet {
    pub definitions: Vec<Value>,
    pub options: IndexMap<String, Value>,
}

/// Resolves plugins in declaration order.
pub fn resolve_plugins(
    plugins: Option<&IndexMap<String, Value>>,
    loader: &dyn PluginLoader,
) -> Result<PluginSet> {
    let mut set = PluginSet::default();
    for (name, config) in plugins.into_iter().flatten() {
        match loader.load(name, config)? {
            Some(plugin) => {
                debug!(plugin = %name, id = %plugin.id, "resolved plugin");
                set.definitions.extend(plugin.definitions);
                set.options.insert(plugin.id, plugin.options);
            }
            None => warn!(plugin = %name, "unknown plugin, skipping"),
        }
    }
    Ok(set)
}
