//! The analysis engine seam.
//!
//! The bridge never analyzes JavaScript itself. It drives an engine through
//! [`AnalysisEngine`] and builds engines through an [`EngineFactory`], so the
//! engine can live in a child process ([`ProcessEngine`]) or in memory.
//!
//! # Synchronous contract
//!
//! [`AnalysisEngine::request`] must not return until the engine has produced
//! a result or an error. Engines that are callback-driven internally have to
//! drive their callback to completion before returning. Sessions are used
//! from one thread of control and never see overlapping requests.

pub mod process;
pub mod protocol;

pub use process::{ProcessEngine, ProcessEngineFactory};
pub use protocol::{
    CompletionsResponse, FileKind, Query, QueryKind, RawCompletion, Request, VirtualFile,
};

use crate::content::ContentProvider;
use crate::error::Result;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::PathBuf;

/// One running engine instance bound to a single project.
pub trait AnalysisEngine {
    /// Registers a file; the engine pulls its content lazily.
    fn add_file(&mut self, name: &str) -> Result<()>;

    /// Unregisters a file.
    fn remove_file(&mut self, name: &str) -> Result<()>;

    /// Discards all cached analysis state.
    fn reset(&mut self) -> Result<()>;

    /// Names of the files currently loaded.
    fn files(&self) -> Vec<String>;

    /// Runs a request to completion.
    ///
    /// An error reported by the engine for this request comes back as
    /// [`BridgeError::Analysis`](crate::BridgeError::Analysis).
    fn request(&mut self, request: &Request) -> Result<Value>;
}

/// Everything an engine is constructed with.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Project the engine serves.
    pub project_id: String,
    /// Callback for pulling file content.
    pub content: ContentProvider,
    /// Library, environment and plugin definitions, in load order.
    pub definitions: Vec<Value>,
    /// Plugin id to plugin options.
    pub plugin_options: IndexMap<String, Value>,
    /// Directory relative names resolve against.
    pub project_dir: Option<PathBuf>,
}

/// Builds engine instances for new sessions.
pub trait EngineFactory {
    fn create(&self, options: EngineOptions) -> Result<Box<dyn AnalysisEngine>>;
}

impl<F> EngineFactory for F
where
    F: Fn(EngineOptions) -> Result<Box<dyn AnalysisEngine>>,
{
    fn create(&self, options: EngineOptions) -> Result<Box<dyn AnalysisEngine>> {
        self(options)
    }
}
