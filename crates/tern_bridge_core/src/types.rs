//! Core data types: projects, definitions, selections.

use crate::error::{BridgeError, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// A value that arrives either already parsed or in serialized JSON form.
///
/// Deserializes untagged: a JSON string becomes `Raw`, anything else `Parsed`.
/// Call [`Source::resolve`] once at the boundary and work with `T` afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source<T> {
    /// Serialized JSON text.
    Raw(String),
    /// Already-structured value.
    Parsed(T),
}

impl<T: DeserializeOwned> Source<T> {
    /// Wraps serialized JSON text.
    pub fn raw(text: impl Into<String>) -> Self {
        Source::Raw(text.into())
    }

    /// Parses the raw form, or returns the parsed value as is.
    pub fn resolve(self) -> std::result::Result<T, serde_json::Error> {
        match self {
            Source::Raw(text) => serde_json::from_str(&text),
            Source::Parsed(value) => Ok(value),
        }
    }
}

/// Engine-level description of a library or environment API.
pub type Definition = Source<Value>;

/// Resolves a list of definitions, failing on the first malformed entry.
pub fn resolve_definitions<I>(defs: I) -> Result<Vec<Value>>
where
    I: IntoIterator<Item = Definition>,
{
    defs.into_iter()
        .enumerate()
        .map(|(index, def)| {
            def.resolve().map_err(|e| BridgeError::MalformedDefinition {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// A project as declared by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique key of the project (the original plugin uses the project file path).
    pub id: String,

    /// Absolute paths of the files that belong to the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,

    /// Directory that relative file names resolve against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Plugin name to plugin config, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<IndexMap<String, Value>>,

    /// Library/environment definitions declared by the project itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libs: Option<Vec<Definition>>,
}

impl Project {
    /// Creates a bare project with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            files: None,
            dir: None,
            plugins: None,
            libs: None,
        }
    }

    /// Sets the declared file list.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the project directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Appends a plugin declaration.
    pub fn with_plugin(mut self, name: impl Into<String>, config: Value) -> Self {
        self.plugins
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), config);
        self
    }
}

impl Source<Project> {
    /// Resolves a project payload, rejecting unparseable input and empty ids.
    pub fn into_project(self) -> Result<Project> {
        let project = self
            .resolve()
            .map_err(|e| BridgeError::MalformedProject(e.to_string()))?;
        if project.id.trim().is_empty() {
            return Err(BridgeError::MalformedProject("project id is empty".into()));
        }
        Ok(project)
    }
}

impl From<Project> for Source<Project> {
    fn from(project: Project) -> Self {
        Source::Parsed(project)
    }
}

/// Identifies a session: either a raw project id or a project descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectKey<'a>(pub &'a str);

impl<'a> From<&'a str> for ProjectKey<'a> {
    fn from(id: &'a str) -> Self {
        ProjectKey(id)
    }
}

impl<'a> From<&'a String> for ProjectKey<'a> {
    fn from(id: &'a String) -> Self {
        ProjectKey(id.as_str())
    }
}

impl<'a> From<&'a Project> for ProjectKey<'a> {
    fn from(project: &'a Project) -> Self {
        ProjectKey(project.id.as_str())
    }
}

/// A selection range in buffer character offsets.
///
/// `anchor` may sit after `caret` for backwards selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub caret: usize,
}

impl Selection {
    /// A zero-width selection at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            caret: offset,
        }
    }

    /// A range selection from `anchor` to `caret`.
    pub fn range(anchor: usize, caret: usize) -> Self {
        Self { anchor, caret }
    }

    pub fn begin(&self) -> usize {
        self.anchor.min(self.caret)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.caret)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.caret
    }
}
