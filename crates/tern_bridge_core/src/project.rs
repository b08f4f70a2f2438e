//! Locating projects on disk and listing their files.
//!
//! A project is a JSON project file (by default `*.sublime-project`) whose
//! bridge section (by default `"ternjs"`) may hold `include`/`exclude` globs,
//! `plugins` and `libs`. The project id is the project file's path and its
//! directory is the project root.

use crate::config::ProjectConfig;
use crate::error::{BridgeError, Result};
use crate::types::{Definition, Project};
use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// The bridge section of a project file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub plugins: Option<IndexMap<String, Value>>,
    pub libs: Option<Vec<Definition>>,
}

/// Finds project files and builds [`Project`] descriptors from them.
pub struct ProjectLocator {
    config: ProjectConfig,
    project_file: GlobMatcher,
    known: Vec<PathBuf>,
    cache: HashMap<PathBuf, Project>,
}

impl ProjectLocator {
    /// # Errors
    ///
    /// Returns a config error if `project_file_pattern` is not a valid glob.
    pub fn new(config: ProjectConfig) -> Result<Self> {
        let project_file = Glob::new(&config.project_file_pattern)
            .map_err(|e| BridgeError::ConfigError(format!("bad project file pattern: {}", e)))?
            .compile_matcher();
        Ok(Self {
            config,
            project_file,
            known: Vec::new(),
            cache: HashMap::new(),
        })
    }

    /// Project file governing `file`, if any.
    ///
    /// Already-known projects whose directory contains `file` win; otherwise
    /// parent directories are searched upwards.
    pub fn locate_project(&self, file: &Path) -> Option<PathBuf> {
        let file = absolute(file);

        for known in &self.known {
            if let Some(dir) = known.parent() {
                if file.starts_with(dir) {
                    return Some(known.clone());
                }
            }
        }

        let mut parent = file.parent();
        while let Some(dir) = parent {
            if dir.is_dir() {
                if let Some(found) = self.find_project_in_dir(dir) {
                    return Some(found);
                }
            }
            parent = dir.parent();
        }
        None
    }

    /// First file in `dir` (by name) matching the project file pattern.
    pub fn find_project_in_dir(&self, dir: &Path) -> Option<PathBuf> {
        let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .is_some_and(|name| self.project_file.is_match(Path::new(name)))
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }

    /// Reads the bridge section of a project file; absent section means defaults.
    pub fn load_settings(&self, project_file: &Path) -> Result<ProjectSettings> {
        let text = fs::read_to_string(project_file)?;
        let mut doc: Value = serde_json::from_str(&text).map_err(|e| BridgeError::ProjectFile {
            path: project_file.to_path_buf(),
            reason: e.to_string(),
        })?;

        match doc.get_mut(&self.config.settings_key).map(Value::take) {
            Some(section) => {
                serde_json::from_value(section).map_err(|e| BridgeError::ProjectFile {
                    path: project_file.to_path_buf(),
                    reason: format!("invalid '{}' section: {}", self.config.settings_key, e),
                })
            }
            None => Ok(ProjectSettings::default()),
        }
    }

    /// Absolute paths under `dir` matching an include glob and no exclude glob, sorted.
    pub fn collect_files(&self, dir: &Path, settings: &ProjectSettings) -> Result<Vec<String>> {
        let include = build_globset(
            settings
                .include
                .as_deref()
                .unwrap_or(&self.config.default_include),
        )?;
        let exclude = build_globset(settings.exclude.as_deref().unwrap_or_default())?;

        let mut files: Vec<String> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path().strip_prefix(dir).is_ok_and(|rel| {
                    include.is_match(rel) && !exclude.is_match(rel)
                })
            })
            .map(|e| e.into_path().to_string_lossy().into_owned())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Builds the project described by `project_file`.
    pub fn load_project(&self, project_file: &Path) -> Result<Project> {
        let project_file = absolute(project_file);
        let settings = self.load_settings(&project_file)?;
        let dir = project_file
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| BridgeError::ProjectFile {
                path: project_file.clone(),
                reason: "project file has no parent directory".into(),
            })?;
        let files = self.collect_files(&dir, &settings)?;
        debug!(project = %project_file.display(), files = files.len(), "loaded project");

        Ok(Project {
            id: project_file.to_string_lossy().into_owned(),
            files: Some(files),
            dir: Some(dir),
            plugins: settings.plugins,
            libs: settings.libs,
        })
    }

    /// Project that `file` belongs to, using and refreshing the cache.
    ///
    /// A file missing from a cached project triggers a rescan, so files
    /// created since the last scan are picked up. Returns `None` if no
    /// project file governs `file` or its patterns exclude it.
    pub fn project_for_file(&mut self, file: &Path) -> Result<Option<Project>> {
        let file = absolute(file);
        let Some(project_file) = self.locate_project(&file) else {
            return Ok(None);
        };
        let needle = file.to_string_lossy().into_owned();

        let cached_hit = self
            .cache
            .get(&project_file)
            .is_some_and(|p| p.files.iter().flatten().any(|f| *f == needle));
        if !cached_hit {
            let project = self.load_project(&project_file)?;
            self.cache.insert(project_file.clone(), project);
        }
        if !self.known.contains(&project_file) {
            self.known.push(project_file.clone());
        }

        Ok(self
            .cache
            .get(&project_file)
            .filter(|p| p.files.iter().flatten().any(|f| *f == needle))
            .cloned())
    }

    /// Forgets every cached project.
    pub fn reset_cache(&mut self) {
        self.cache.clear();
        self.known.clear();
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| BridgeError::ConfigError(format!("bad glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| BridgeError::ConfigError(e.to_string()))
}

/// `path` made absolute against `base` when it is relative.
///
/// Project file lists hold absolute names, so anything compared against them
/// or handed to an engine goes through here first.
pub fn absolute_from(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn absolute(path: &Path) -> PathBuf {
    match std::env::current_dir() {
        Ok(cwd) => absolute_from(path, &cwd),
        Err(_) => path.to_path_buf(),
    }
}
