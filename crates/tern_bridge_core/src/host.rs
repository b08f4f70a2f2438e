//! Capabilities the bridge consumes from its host editor.

use crate::types::{Project, Selection};
use std::fs;
use std::path::Path;
use tracing::debug;

/// An editor view: one buffer plus its selections.
pub trait EditorView {
    /// Current selections, primary first.
    fn selections(&self) -> Vec<Selection>;

    /// Whether the buffer has unsaved modifications.
    fn is_dirty(&self) -> bool;

    /// Full text of the buffer.
    fn text(&self) -> String;

    /// File name the engine knows this buffer by.
    fn file_name(&self) -> String;
}

/// Host file reads, scoped to a project.
pub trait FileSystem {
    /// Returns the file's text, or `None` if the host cannot provide it.
    fn read_file(&self, path: &Path, project: &Project) -> Option<String>;

    /// Returns the text of the never-saved buffer `buffer_id`, if the host
    /// still has it open.
    ///
    /// Hosts without untitled buffers keep the default, which has none.
    fn read_buffer(&self, buffer_id: &str, project: &Project) -> Option<String> {
        let _ = (buffer_id, project);
        None
    }
}

/// The buffer id inside an untitled name such as `{17}`.
pub fn untitled_buffer_id(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|id| !id.is_empty())
}

/// Reads files straight from local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn read_file(&self, path: &Path, project: &Project) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(
                    project = %project.id,
                    path = %path.display(),
                    error = %e,
                    "file not readable"
                );
                None
            }
        }
    }
}

/// A self-contained view snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferView {
    file_name: String,
    text: String,
    dirty: bool,
    selections: Vec<Selection>,
}

impl BufferView {
    /// A clean view of a saved file.
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
            dirty: false,
            selections: vec![Selection::caret(0)],
        }
    }

    /// A view of a buffer that was never saved; named `{<buffer id>}`.
    pub fn untitled(buffer_id: u64, text: impl Into<String>) -> Self {
        Self::new(format!("{{{}}}", buffer_id), text).dirty(true)
    }

    /// Marks the buffer as modified (or not).
    pub fn dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    /// Places a single caret at `offset`.
    pub fn with_caret(mut self, offset: usize) -> Self {
        self.selections = vec![Selection::caret(offset)];
        self
    }

    /// Replaces the selections.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selections = vec![selection];
        self
    }
}

impl EditorView for BufferView {
    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn file_name(&self) -> String {
        self.file_name.clone()
    }
}
