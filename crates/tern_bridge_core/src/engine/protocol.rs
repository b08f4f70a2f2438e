//! Wire types: analysis requests/responses and the JSON-RPC envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Analysis operation requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Completions,
    Definition,
    Refs,
}

/// A structured analysis query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "type")]
    pub kind: QueryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    /// File name, or `#N` to point at the N-th virtual file of the request.
    #[serde(default)]
    pub file: String,
    /// Ask the engine to annotate results with types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<bool>,
}

impl Query {
    /// A query of the given kind; the range is derived from the view later.
    pub fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            start: None,
            end: None,
            file: String::new(),
            types: None,
        }
    }

    /// Sets an explicit range.
    pub fn with_range(mut self, start: Option<usize>, end: Option<usize>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Requests type annotations.
    pub fn with_types(mut self, types: bool) -> Self {
        self.types = Some(types);
        self
    }
}

impl From<QueryKind> for Query {
    fn from(kind: QueryKind) -> Self {
        Query::new(kind)
    }
}

/// How a virtual file's text relates to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// The complete document text.
    Full,
}

/// In-memory file content sent along with one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualFile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub text: String,
}

impl VirtualFile {
    pub fn full(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::Full,
            text: text.into(),
        }
    }
}

/// A request as sent to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub query: Query,
    #[serde(default)]
    pub files: Vec<VirtualFile>,
}

impl Request {
    /// Appends a virtual file and returns the `#N` reference to it.
    pub fn push_file(&mut self, file: VirtualFile) -> String {
        self.files.push(file);
        format!("#{}", self.files.len() - 1)
    }
}

/// One raw completion entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCompletion {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Engine answer to a `completions` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionsResponse {
    pub from: usize,
    pub to: usize,
    #[serde(default)]
    pub completions: Vec<RawCompletion>,
    #[serde(default)]
    pub guess: bool,
}

/// JSON-RPC message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcMessage {
    pub jsonrpc: String, // Always "2.0"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcMessage {
    /// Create a request message.
    pub fn request(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(Value::Number(id.into())),
            method: Some(method.into()),
            params: Some(params),
            result: None,
            error: None,
        }
    }

    /// Create a notification message.
    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: Some(method.into()),
            params: Some(params),
            result: None,
            error: None,
        }
    }

    /// Create a successful response to an engine-initiated request.
    pub fn response(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            method: None,
            params: None,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response to an engine-initiated request.
    pub fn error_response(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            method: None,
            params: None,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Check if this is a response.
    pub fn is_response(&self) -> bool {
        self.id.is_some() && self.method.is_none()
    }

    /// Check if this is a request initiated by the engine.
    pub fn is_request(&self) -> bool {
        self.id.is_some() && self.method.is_some()
    }

    /// Get request ID as u64.
    pub fn get_id_u64(&self) -> Option<u64> {
        self.id.as_ref()?.as_u64()
    }
}
