//! Error types for tern_bridge_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for session management and request dispatch.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The project payload could not be parsed into a project descriptor.
    #[error("malformed project: {0}")]
    MalformedProject(String),

    /// A library or plugin definition in serialized form failed to parse.
    #[error("malformed definition #{index}: {reason}")]
    MalformedDefinition {
        /// Position of the definition in the resolved list
        index: usize,
        /// Parser message
        reason: String,
    },

    /// The plugin loader rejected a configured plugin.
    #[error("plugin '{plugin}' failed to load: {reason}")]
    PluginFailed {
        /// Plugin name as declared in the project settings
        plugin: String,
        /// Description of the failure
        reason: String,
    },

    /// The analysis engine reported an error for a request.
    #[error("analysis failed for project {project}: {message}")]
    Analysis {
        /// Project whose session served the request
        project: String,
        /// Engine-provided message
        message: String,
    },

    /// The engine process could not be started.
    #[error("failed to start analysis engine '{command}': {reason}")]
    EngineStartFailed {
        /// Command line that was spawned
        command: String,
        /// Description of the failure
        reason: String,
    },

    /// The engine process broke the wire protocol.
    #[error("engine protocol error: {0}")]
    EngineProtocol(String),

    /// The engine process went away while a call was in flight.
    #[error("analysis engine exited unexpectedly: {0}")]
    EngineExited(String),

    /// Serialization error while encoding a message or config.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error while decoding an engine response.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// I/O error during file or pipe operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A project file exists but cannot be used.
    #[error("invalid project file {}: {}", path.display(), reason)]
    ProjectFile {
        /// Path to the project file
        path: PathBuf,
        /// Description of what's wrong
        reason: String,
    },
}

impl BridgeError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::EngineStartFailed { .. } => {
                Some("Check the [engine] command in tern-bridge.toml and that it is on PATH.")
            }
            Self::EngineExited(_) => {
                Some("The engine crashed and its session was dropped; reopen the project.")
            }
            Self::MalformedProject(_) | Self::ProjectFile { .. } => {
                Some("Check that the project file is valid JSON and has a non-empty id.")
            }
            Self::PluginFailed { .. } => {
                Some("Remove the plugin from the project settings or fix its configuration.")
            }
            Self::Analysis { .. } => Some("Fix the syntax error in the queried file and retry."),
            _ => None,
        }
    }

    /// Whether the error means the link to the engine is broken, so the
    /// session behind it cannot be used again.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::EngineExited(_) | Self::EngineProtocol(_) | Self::Io(_)
        )
    }
}

/// Convenience Result type for tern_bridge_core operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
