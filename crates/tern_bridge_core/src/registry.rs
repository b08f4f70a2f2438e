//! Session registry: one analysis session per project.
//!
//! The registry is owned by whoever drives the editor commands and is used
//! from a single thread of control, so it holds plain maps and `Rc`s rather
//! than locks. Dropping the registry tears every session down.

use crate::config::SessionConfig;
use crate::content::ContentProvider;
use crate::engine::{AnalysisEngine, EngineFactory, EngineOptions};
use crate::error::{BridgeError, Result};
use crate::host::FileSystem;
use crate::plugins::{resolve_plugins, NoPlugins, PluginLoader};
use crate::request::build_fake_request;
use crate::sync::sync_files;
use crate::types::{resolve_definitions, Definition, Project, ProjectKey, Source};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// A live analysis session bound to one project.
pub struct Session {
    project_id: String,
    pub(crate) engine: Box<dyn AnalysisEngine>,
    content: ContentProvider,
    plugin_options: IndexMap<String, Value>,
}

impl Session {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Files currently loaded into the engine.
    pub fn files(&self) -> Vec<String> {
        self.engine.files()
    }

    /// Plugin options fixed at creation time.
    pub fn plugin_options(&self) -> &IndexMap<String, Value> {
        &self.plugin_options
    }

    /// Content callback the engine reads through.
    pub fn content(&self) -> &ContentProvider {
        &self.content
    }
}

/// Outcome of [`SessionRegistry::start_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStart {
    /// A new session was created by this call.
    pub created: bool,
    /// The project's file list changed the session's loaded files.
    pub files_changed: bool,
}

/// Maps project ids to live sessions.
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
    factory: Box<dyn EngineFactory>,
    plugins: Box<dyn PluginLoader>,
    fs: Rc<dyn FileSystem>,
    config: SessionConfig,
}

impl SessionRegistry {
    /// An empty registry building engines with `factory` and reading files through `fs`.
    pub fn new(factory: impl EngineFactory + 'static, fs: impl FileSystem + 'static) -> Self {
        Self {
            sessions: HashMap::new(),
            factory: Box::new(factory),
            plugins: Box::new(NoPlugins),
            fs: Rc::new(fs),
            config: SessionConfig::default(),
        }
    }

    /// Uses `loader` to resolve project plugins.
    pub fn with_plugin_loader(mut self, loader: impl PluginLoader + 'static) -> Self {
        self.plugins = Box::new(loader);
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Ensures a session exists for the project, then syncs its files.
    ///
    /// Creation is idempotent: a live session is never replaced. Definitions
    /// load in this order: `libs`, the project's own libs, then plugin
    /// definitions in declaration order.
    ///
    /// # Errors
    ///
    /// Fails before touching the registry if the project or a definition is
    /// malformed, a plugin fails, or the engine cannot be created.
    pub fn start_session(
        &mut self,
        project: Source<Project>,
        libs: Vec<Definition>,
    ) -> Result<SessionStart> {
        let project = project.into_project()?;
        let mut outcome = SessionStart::default();

        if !self.sessions.contains_key(&project.id) {
            let session = self.create_session(&project, libs)?;
            self.sessions.insert(project.id.clone(), session);
            outcome.created = true;
        }

        if let Some(files) = &project.files {
            outcome.files_changed = self.sync_project(&project.id, files)?;
        }

        Ok(outcome)
    }

    fn create_session(&self, project: &Project, libs: Vec<Definition>) -> Result<Session> {
        let lib_count = libs.len();
        let explicit = libs
            .into_iter()
            .chain(project.libs.iter().flatten().cloned());
        let mut definitions = resolve_definitions(explicit)?;

        let plugins = resolve_plugins(project.plugins.as_ref(), self.plugins.as_ref())?;
        definitions.extend(plugins.definitions);

        info!(
            project = %project.id,
            libs = lib_count,
            definitions = definitions.len(),
            plugins = plugins.options.len(),
            "starting analysis session"
        );

        let content = ContentProvider::new(self.fs.clone(), Rc::new(project.clone()));
        let engine = self.factory.create(EngineOptions {
            project_id: project.id.clone(),
            content: content.clone(),
            definitions,
            plugin_options: plugins.options.clone(),
            project_dir: project.dir.clone(),
        })?;

        Ok(Session {
            project_id: project.id.clone(),
            engine,
            content,
            plugin_options: plugins.options,
        })
    }

    /// Syncs a live session's files with `files`, priming it when they changed.
    ///
    /// Returns `Ok(false)` if there is no session for `project_id`.
    pub fn sync_project(&mut self, project_id: &str, files: &[String]) -> Result<bool> {
        let warm_up = self.config.warm_up_on_sync;
        let Some(session) = self.sessions.get_mut(project_id) else {
            return Ok(false);
        };

        let changed = match sync_files(session.engine.as_mut(), files) {
            Ok(changed) => changed,
            Err(e) => return Err(self.evict_on_transport(project_id, e)),
        };
        if changed && warm_up {
            if let Err(e) = session.engine.request(&build_fake_request()) {
                warn!(project = %project_id, error = %e, "warm-up request failed");
                if e.is_transport() {
                    self.evict_on_transport(project_id, e);
                }
            }
        }
        Ok(changed)
    }

    /// Drops the project's session if `err` broke its engine link.
    ///
    /// The engine is not reset since it can no longer be reached; dropping it
    /// kills whatever is left of it. Returns `err` for propagation.
    pub(crate) fn evict_on_transport(&mut self, project_id: &str, err: BridgeError) -> BridgeError {
        if err.is_transport() && self.sessions.remove(project_id).is_some() {
            warn!(project = %project_id, error = %err, "engine link broken, session dropped");
        }
        err
    }

    /// Resets and removes the project's session. No-op if there is none.
    ///
    /// Returns whether a session was removed.
    pub fn kill_session<'a>(&mut self, project: impl Into<ProjectKey<'a>>) -> bool {
        let ProjectKey(id) = project.into();
        match self.sessions.remove(id) {
            Some(mut session) => {
                if let Err(e) = session.engine.reset() {
                    warn!(project = %id, error = %e, "engine reset failed during teardown");
                }
                info!(project = %id, "analysis session stopped");
                true
            }
            None => {
                debug!(project = %id, "no session to stop");
                false
            }
        }
    }

    /// Kills every session; returns how many were stopped.
    pub fn kill_all(&mut self) -> usize {
        let ids: Vec<String> = self.sessions.keys().cloned().collect();
        ids.iter().filter(|id| self.kill_session(id.as_str())).count()
    }

    pub fn has_session(&self, project_id: &str) -> bool {
        self.sessions.contains_key(project_id)
    }

    pub fn session(&self, project_id: &str) -> Option<&Session> {
        self.sessions.get(project_id)
    }

    pub(crate) fn session_mut(&mut self, project_id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(project_id)
    }

    /// Ids of all live sessions.
    pub fn session_ids(&self) -> Vec<&str> {
        self.sessions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.kill_all();
    }
}
