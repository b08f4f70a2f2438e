//! Completion results and how editors display them.

use serde::{Deserialize, Serialize};

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// The engine marked the whole result as a best-effort guess.
    pub guess: bool,
}

impl Completion {
    /// Text inserted into the buffer.
    pub fn insert_text(&self) -> &str {
        &self.text
    }

    /// Display label: `name(a, b)` for functions, `name\t<icon>` otherwise.
    pub fn label(&self) -> String {
        let kind = self.kind.as_deref().unwrap_or("?");
        match fn_params(kind) {
            Some(params) => {
                let args: Vec<&str> = params
                    .split(',')
                    .map(|p| p.split(':').next().unwrap_or_default().trim())
                    .collect();
                format!("{}({})", self.text, args.join(", "))
            }
            None => format!("{}\t{}", self.text, TypeHint::classify(kind).icon()),
        }
    }
}

/// Completions for one position, in buffer coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hints {
    pub from: usize,
    pub to: usize,
    pub list: Vec<Completion>,
}

/// Coarse type category shown next to a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    Object,
    Array,
    Number,
    String,
    Bool,
    Fn,
    Unknown,
}

impl TypeHint {
    /// Classifies an engine type string such as `number` or `fn(a: string)`.
    pub fn classify(kind: &str) -> Self {
        match kind {
            "?" => TypeHint::Unknown,
            "number" => TypeHint::Number,
            "string" => TypeHint::String,
            "bool" => TypeHint::Bool,
            k if k.starts_with("fn(") => TypeHint::Fn,
            k if k.starts_with('[') => TypeHint::Array,
            _ => TypeHint::Object,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TypeHint::Object => "{}",
            TypeHint::Array => "[]",
            TypeHint::Number => "(num)",
            TypeHint::String => "(str)",
            TypeHint::Bool => "(bool)",
            TypeHint::Fn => "fn()",
            TypeHint::Unknown => "(?)",
        }
    }
}

/// Parameter list of a `fn(...)` type, up to its last closing paren.
fn fn_params(kind: &str) -> Option<&str> {
    let rest = kind.strip_prefix("fn(")?;
    let close = rest.rfind(')')?;
    Some(&rest[..close])
}
