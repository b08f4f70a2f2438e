//! Analysis engine hosted in a child process.
//!
//! Speaks JSON-RPC 2.0 with `Content-Length` framing over stdin/stdout.
//! While a call is outstanding the engine may ask for file contents with a
//! `getFile` request; those are answered from the session's
//! [`ContentProvider`] before the loop keeps waiting for the call's response.

use crate::config::EngineConfig;
use crate::content::ContentProvider;
use crate::engine::protocol::{JsonRpcError, JsonRpcMessage, Request};
use crate::engine::{AnalysisEngine, EngineFactory, EngineOptions};
use crate::error::{BridgeError, Result};
use indexmap::IndexSet;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tracing::debug;

const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// Largest message body accepted from the engine.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// Framed JSON-RPC channel over any reader/writer pair.
pub struct JsonRpcChannel<R, W> {
    reader: R,
    writer: W,
    next_id: u64,
}

impl<R: BufRead, W: Write> JsonRpcChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            next_id: 1,
        }
    }

    /// Send a notification (no response expected).
    pub fn notify(&mut self, method: &str, params: Value) -> Result<()> {
        self.send_message(&JsonRpcMessage::notification(method, params))
    }

    /// Send a request and wait for its response.
    ///
    /// The outer `Result` is the transport; the inner one is the engine's
    /// answer. `getFile` requests arriving meanwhile are served from `content`.
    pub fn call(
        &mut self,
        method: &str,
        params: Value,
        content: &ContentProvider,
    ) -> Result<std::result::Result<Value, JsonRpcError>> {
        let id = self.next_id;
        self.next_id += 1;

        self.send_message(&JsonRpcMessage::request(id, method, params))?;

        loop {
            let message = self.read_message()?;

            if message.is_request() {
                self.answer_engine_request(message, content)?;
                continue;
            }

            if message.is_response() && message.get_id_u64() == Some(id) {
                if let Some(error) = message.error {
                    return Ok(Err(error));
                }
                // A missing result is a legitimate null answer.
                return Ok(Ok(message.result.unwrap_or(Value::Null)));
            }

            // Notifications and stale responses are dropped.
        }
    }

    fn answer_engine_request(
        &mut self,
        message: JsonRpcMessage,
        content: &ContentProvider,
    ) -> Result<()> {
        let id = message.id.unwrap_or(Value::Null);
        let reply = match message.method.as_deref() {
            Some("getFile") => {
                match message
                    .params
                    .as_ref()
                    .and_then(|p| p.get("name"))
                    .and_then(Value::as_str)
                {
                    Some(name) => JsonRpcMessage::response(
                        id,
                        json!({ "text": content.get_file_content(name) }),
                    ),
                    None => JsonRpcMessage::error_response(
                        id,
                        INVALID_PARAMS,
                        "getFile requires a string 'name'",
                    ),
                }
            }
            other => {
                debug!(method = ?other, "engine sent unsupported request");
                JsonRpcMessage::error_response(id, METHOD_NOT_FOUND, "method not found")
            }
        };
        self.send_message(&reply)
    }

    fn send_message(&mut self, message: &JsonRpcMessage) -> Result<()> {
        let json = serde_json::to_string(message)
            .map_err(|e| BridgeError::Serialization(e.to_string()))?;

        write!(self.writer, "Content-Length: {}\r\n\r\n", json.len())?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.flush()?;

        Ok(())
    }

    fn read_message(&mut self) -> Result<JsonRpcMessage> {
        let mut content_length: Option<usize> = None;

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(BridgeError::EngineExited("engine closed its output".into()));
            }

            let line = line.trim();

            // Empty line marks end of headers
            if line.is_empty() {
                break;
            }

            if let Some(len_str) = line.strip_prefix("Content-Length: ") {
                content_length = Some(len_str.parse().map_err(|_| {
                    BridgeError::EngineProtocol("invalid Content-Length".into())
                })?);
            }
        }

        let content_length = content_length
            .ok_or_else(|| BridgeError::EngineProtocol("missing Content-Length header".into()))?;
        if content_length > MAX_MESSAGE_BYTES {
            return Err(BridgeError::EngineProtocol(format!(
                "Content-Length {} exceeds the {} byte limit",
                content_length, MAX_MESSAGE_BYTES
            )));
        }

        let mut content = vec![0u8; content_length];
        self.reader.read_exact(&mut content)?;

        serde_json::from_slice(&content).map_err(|e| BridgeError::Deserialization(e.to_string()))
    }
}

/// Files the engine has been told about.
///
/// A name only enters or leaves the set once its notification went out, so a
/// failed send leaves the set as it was and the next sync retries it.
#[derive(Debug, Default)]
struct LoadedFiles(IndexSet<String>);

impl LoadedFiles {
    fn add<R: BufRead, W: Write>(
        &mut self,
        channel: &mut JsonRpcChannel<R, W>,
        name: &str,
    ) -> Result<()> {
        if self.0.contains(name) {
            return Ok(());
        }
        channel.notify("addFile", json!({ "name": name }))?;
        self.0.insert(name.to_string());
        Ok(())
    }

    fn remove<R: BufRead, W: Write>(
        &mut self,
        channel: &mut JsonRpcChannel<R, W>,
        name: &str,
    ) -> Result<()> {
        if !self.0.contains(name) {
            return Ok(());
        }
        channel.notify("delFile", json!({ "name": name }))?;
        self.0.shift_remove(name);
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

/// Engine session living in a spawned process.
pub struct ProcessEngine {
    child: Child,
    channel: JsonRpcChannel<BufReader<ChildStdout>, BufWriter<ChildStdin>>,
    content: ContentProvider,
    project_id: String,
    files: LoadedFiles,
}

impl ProcessEngine {
    /// Spawn the engine and hand it its definitions and plugin options.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be started or rejects `initialize`.
    pub fn spawn(config: &EngineConfig, options: EngineOptions) -> Result<Self> {
        let start_failed = |reason: String| BridgeError::EngineStartFailed {
            command: config.command.clone(),
            reason,
        };

        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = &options.project_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| start_failed(e.to_string()))?;

        let stdin = BufWriter::new(
            child
                .stdin
                .take()
                .ok_or_else(|| start_failed("stdin not captured".into()))?,
        );
        let stdout = BufReader::new(
            child
                .stdout
                .take()
                .ok_or_else(|| start_failed("stdout not captured".into()))?,
        );

        let mut engine = Self {
            child,
            channel: JsonRpcChannel::new(stdout, stdin),
            content: options.content,
            project_id: options.project_id,
            files: LoadedFiles::default(),
        };

        let params = json!({
            "definitions": options.definitions,
            "plugins": options.plugin_options,
            "projectDir": options.project_dir,
        });
        engine
            .channel
            .call("initialize", params, &engine.content)?
            .map_err(|e| start_failed(e.message))?;

        debug!(project = %engine.project_id, command = %config.command, "engine process started");
        Ok(engine)
    }
}

impl AnalysisEngine for ProcessEngine {
    fn add_file(&mut self, name: &str) -> Result<()> {
        self.files.add(&mut self.channel, name)
    }

    fn remove_file(&mut self, name: &str) -> Result<()> {
        self.files.remove(&mut self.channel, name)
    }

    fn reset(&mut self) -> Result<()> {
        self.channel.notify("reset", Value::Null)
    }

    fn files(&self) -> Vec<String> {
        self.files.names()
    }

    fn request(&mut self, request: &Request) -> Result<Value> {
        let params =
            serde_json::to_value(request).map_err(|e| BridgeError::Serialization(e.to_string()))?;

        self.channel
            .call("request", params, &self.content)?
            .map_err(|e| BridgeError::Analysis {
                project: self.project_id.clone(),
                message: e.message,
            })
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Builds a [`ProcessEngine`] per session from the `[engine]` config.
#[derive(Debug, Clone)]
pub struct ProcessEngineFactory {
    config: EngineConfig,
}

impl ProcessEngineFactory {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl EngineFactory for ProcessEngineFactory {
    fn create(&self, options: EngineOptions) -> Result<Box<dyn AnalysisEngine>> {
        Ok(Box::new(ProcessEngine::spawn(&self.config, options)?))
    }
}
