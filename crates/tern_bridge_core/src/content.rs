//! Bridges the engine's pull-based file reads to the host file system.

use crate::host::{untitled_buffer_id, FileSystem};
use crate::types::Project;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

/// File-content callback handed to an engine, bound to one project.
///
/// Never fails: names the host cannot read resolve to empty content.
#[derive(Clone)]
pub struct ContentProvider {
    fs: Rc<dyn FileSystem>,
    project: Rc<Project>,
}

impl ContentProvider {
    pub fn new(fs: Rc<dyn FileSystem>, project: Rc<Project>) -> Self {
        Self { fs, project }
    }

    /// Project this provider reads for.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the text of `file_name`, or "" if the host cannot read it.
    ///
    /// Untitled `{<buffer id>}` names are looked up as open buffers.
    pub fn get_file_content(&self, file_name: &str) -> String {
        debug!(project = %self.project.id, file = %file_name, "engine requested file");
        if let Some(buffer_id) = untitled_buffer_id(file_name) {
            return self
                .fs
                .read_buffer(buffer_id, &self.project)
                .unwrap_or_default();
        }
        let path = self.resolve(file_name);
        self.fs.read_file(&path, &self.project).unwrap_or_default()
    }

    fn resolve(&self, file_name: &str) -> PathBuf {
        let path = PathBuf::from(file_name);
        match &self.project.dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        }
    }
}

impl fmt::Debug for ContentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentProvider")
            .field("project", &self.project.id)
            .finish()
    }
}
