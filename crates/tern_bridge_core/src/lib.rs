//! Tern Bridge Core
//!
//! Manages per-project sessions of a JavaScript analysis engine and forwards
//! editor queries to them:
//! - One session per project, created lazily and reused
//! - Minimal add/remove synchronization of a project's file list
//! - Requests built from the cursor, with unsaved buffers sent inline
//! - Completions, jump-to-definition and find-references
//!
//! # Quick Start
//!
//! ```
//! use tern_bridge_core::{
//!     AnalysisEngine, BufferView, DiskFileSystem, EngineOptions, Project, Request, Result,
//!     SessionRegistry,
//! };
//! use serde_json::{json, Value};
//!
//! struct Echo(Vec<String>);
//!
//! impl AnalysisEngine for Echo {
//!     fn add_file(&mut self, name: &str) -> Result<()> {
//!         self.0.push(name.to_string());
//!         Ok(())
//!     }
//!     fn remove_file(&mut self, name: &str) -> Result<()> {
//!         self.0.retain(|f| f != name);
//!         Ok(())
//!     }
//!     fn reset(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!     fn files(&self) -> Vec<String> {
//!         self.0.clone()
//!     }
//!     fn request(&mut self, _request: &Request) -> Result<Value> {
//!         Ok(json!({"from": 4, "to": 4, "completions": [{"name": "length", "type": "number"}]}))
//!     }
//! }
//!
//! let factory = |_: EngineOptions| -> Result<Box<dyn AnalysisEngine>> {
//!     Ok(Box::new(Echo(Vec::new())))
//! };
//! let mut registry = SessionRegistry::new(factory, DiskFileSystem);
//!
//! let project = Project::new("/work/app.sublime-project").with_files(["/work/app.js"]);
//! registry.start_session(project.into(), vec![]).unwrap();
//! assert!(registry.has_session("/work/app.sublime-project"));
//!
//! let view = BufferView::new("/work/app.js", "arr.").with_caret(4);
//! let hints = registry.hints(&view, "/work/app.sublime-project").unwrap().unwrap();
//! assert_eq!(hints.list[0].label(), "length\t(num)");
//! ```
//!
//! # Missing sessions
//!
//! Requests against a project without a session are not errors:
//!
//! ```
//! use tern_bridge_core::{BufferView, DiskFileSystem, ProcessEngineFactory, SessionRegistry};
//!
//! let mut registry = SessionRegistry::new(
//!     ProcessEngineFactory::new(Default::default()),
//!     DiskFileSystem,
//! );
//! let view = BufferView::new("/work/app.js", "");
//! assert!(registry.hints(&view, "not-started").unwrap().is_none());
//! ```

mod completion;
mod config;
mod content;
mod dispatch;
mod engine;
mod error;
mod host;
mod plugins;
mod project;
mod registry;
mod request;
mod sync;
mod types;


pub use completion::{Completion, Hints, TypeHint};
pub use config::{Config, EngineConfig, ProjectConfig, SessionConfig, CONFIG_FILE_NAME};
pub use content::ContentProvider;
pub use engine::process::JsonRpcChannel;
pub use engine::{
    AnalysisEngine, CompletionsResponse, EngineFactory, EngineOptions, FileKind,
    ProcessEngine, ProcessEngineFactory, Query, QueryKind, RawCompletion, Request, VirtualFile,
};
pub use error::{BridgeError, Result};
pub use host::{untitled_buffer_id, BufferView, DiskFileSystem, EditorView, FileSystem};
pub use plugins::{resolve_plugins, NoPlugins, PluginLoader, PluginSet, ResolvedPlugin};
pub use project::{absolute_from, ProjectLocator, ProjectSettings};
pub use registry::{Session, SessionRegistry, SessionStart};
pub use request::{build_fake_request, build_flush_request, build_request, BuiltRequest, WARM_UP_FILE};
pub use sync::{sync_files, FileDelta};
pub use types::{resolve_definitions, Definition, Project, ProjectKey, Selection, Source};
