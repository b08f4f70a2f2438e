//! Scripted in-memory analysis engine.
//!
//! Completes identifiers found in the loaded files and the request's inline
//! files, resolves definitions and references by plain text search, and
//! records everything the bridge asks of it. Scenarios can queue canned
//! replies or failures ahead of the built-in behavior.

use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::rc::Rc;
use tern_bridge_core::{
    AnalysisEngine, BridgeError, ContentProvider, EngineOptions, QueryKind, Request,
    ResolvedPlugin, Result,
};

/// Something the bridge did to an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Created { project: String },
    Added { project: String, file: String },
    Removed { project: String, file: String },
    Reset { project: String },
    Request { project: String, request: Request },
}

/// Kind-only view of an [`EngineEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Added,
    Removed,
    Reset,
    Request,
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Created { .. } => EventKind::Created,
            Self::Added { .. } => EventKind::Added,
            Self::Removed { .. } => EventKind::Removed,
            Self::Reset { .. } => EventKind::Reset,
            Self::Request { .. } => EventKind::Request,
        }
    }
}

/// A canned answer for the next request.
#[derive(Debug, Clone)]
pub enum Reply {
    Answer(Value),
    Fail(String),
    /// The engine process dies mid-request.
    Crash(String),
}

/// Shared record of every engine a factory built.
#[derive(Debug, Default)]
pub struct EngineLog {
    pub events: Vec<EngineEvent>,
    pub replies: VecDeque<Reply>,
    /// Project ids whose engines fail to start.
    pub refuse_start: HashSet<String>,
    /// Options of every engine created, in creation order.
    pub created: Vec<EngineOptions>,
}

impl EngineLog {
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn last_request(&self) -> Option<&Request> {
        self.events.iter().rev().find_map(|e| match e {
            EngineEvent::Request { request, .. } => Some(request),
            _ => None,
        })
    }
}

pub type SharedLog = Rc<RefCell<EngineLog>>;

/// Engine factory recording into `log`.
pub fn factory(log: SharedLog) -> impl Fn(EngineOptions) -> Result<Box<dyn AnalysisEngine>> {
    move |options: EngineOptions| -> Result<Box<dyn AnalysisEngine>> {
        let mut state = log.borrow_mut();
        if state.refuse_start.contains(&options.project_id) {
            return Err(BridgeError::EngineStartFailed {
                command: "scripted".into(),
                reason: "start refused by scenario".into(),
            });
        }
        state.events.push(EngineEvent::Created {
            project: options.project_id.clone(),
        });
        state.created.push(options.clone());

        Ok(Box::new(ScriptedEngine {
            project: options.project_id,
            content: options.content,
            files: Vec::new(),
            log: log.clone(),
        }))
    }
}

/// Plugin loader knowing `node` and failing on `broken`.
pub fn plugin_loader(name: &str, config: &Value) -> Result<Option<ResolvedPlugin>> {
    match name {
        "node" => Ok(Some(ResolvedPlugin {
            id: "node".into(),
            definitions: vec![json!({"!name": "node"})],
            options: config.clone(),
        })),
        "broken" => Err(BridgeError::PluginFailed {
            plugin: name.into(),
            reason: "cannot load".into(),
        }),
        _ => Ok(None),
    }
}

pub struct ScriptedEngine {
    project: String,
    content: ContentProvider,
    files: Vec<String>,
    log: SharedLog,
}

impl ScriptedEngine {
    fn record(&self, event: EngineEvent) {
        self.log.borrow_mut().events.push(event);
    }

    /// Text of `name`, where `#N` points into the request's inline files.
    fn text_of(&self, request: &Request, name: &str) -> String {
        match name.strip_prefix('#') {
            Some(index) => index
                .parse::<usize>()
                .ok()
                .and_then(|i| request.files.get(i))
                .map(|f| f.text.clone())
                .unwrap_or_default(),
            None => self.content.get_file_content(name),
        }
    }

    /// Inline files first, then loaded files they don't shadow.
    fn sources(&self, request: &Request) -> Vec<(String, String)> {
        let mut sources: Vec<(String, String)> = request
            .files
            .iter()
            .map(|f| (f.name.clone(), f.text.clone()))
            .collect();
        for file in &self.files {
            if !sources.iter().any(|(name, _)| name == file) {
                sources.push((file.clone(), self.content.get_file_content(file)));
            }
        }
        sources
    }

    fn complete(&self, request: &Request, text: &str, end: usize) -> Value {
        let from = word_start(text, end);
        let prefix = &text[from..end];
        let sources = self.sources(request);

        let mut names = BTreeSet::new();
        for (_, src) in &sources {
            for word in words(src) {
                if word.starts_with(prefix) && word != prefix {
                    names.insert(word.to_string());
                }
            }
        }

        let completions: Vec<Value> = names
            .iter()
            .map(|name| {
                let kind = if declares_function(&sources, name) { "fn()" } else { "?" };
                json!({"name": name, "type": kind})
            })
            .collect();
        json!({"from": from, "to": end, "completions": completions})
    }

    fn definition(&self, request: &Request, word: &str) -> Value {
        let patterns = [
            format!("var {}", word),
            format!("{}: function", word),
            format!("{} = function", word),
        ];
        for (name, src) in self.sources(request) {
            for pattern in &patterns {
                if let Some(at) = src.find(pattern.as_str()) {
                    let start = at + pattern.find(word).unwrap_or(0);
                    return json!({"origin": name, "start": start, "end": start + word.len()});
                }
            }
        }
        json!({})
    }

    fn references(&self, request: &Request, word: &str) -> Value {
        let mut refs = Vec::new();
        for (name, src) in self.sources(request) {
            for (at, _) in src.match_indices(word) {
                let before = src[..at].chars().next_back();
                let after = src[at + word.len()..].chars().next();
                if !before.is_some_and(is_ident) && !after.is_some_and(is_ident) {
                    refs.push(json!({"file": name, "start": at, "end": at + word.len()}));
                }
            }
        }
        json!({"name": word, "refs": refs})
    }
}

impl AnalysisEngine for ScriptedEngine {
    fn add_file(&mut self, name: &str) -> Result<()> {
        self.files.push(name.to_string());
        self.record(EngineEvent::Added {
            project: self.project.clone(),
            file: name.to_string(),
        });
        Ok(())
    }

    fn remove_file(&mut self, name: &str) -> Result<()> {
        self.files.retain(|f| f != name);
        self.record(EngineEvent::Removed {
            project: self.project.clone(),
            file: name.to_string(),
        });
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.record(EngineEvent::Reset {
            project: self.project.clone(),
        });
        Ok(())
    }

    fn files(&self) -> Vec<String> {
        self.files.clone()
    }

    fn request(&mut self, request: &Request) -> Result<Value> {
        self.record(EngineEvent::Request {
            project: self.project.clone(),
            request: request.clone(),
        });

        let scripted = self.log.borrow_mut().replies.pop_front();
        match scripted {
            Some(Reply::Answer(value)) => return Ok(value),
            Some(Reply::Fail(message)) => {
                return Err(BridgeError::Analysis {
                    project: self.project.clone(),
                    message,
                })
            }
            Some(Reply::Crash(reason)) => return Err(BridgeError::EngineExited(reason)),
            None => {}
        }

        let text = self.text_of(request, &request.query.file);
        let end = request.query.end.unwrap_or(0).min(text.len());
        if request.query.kind == QueryKind::Completions {
            return Ok(self.complete(request, &text, end));
        }

        let word = word_at(&text, end).ok_or_else(|| BridgeError::Analysis {
            project: self.project.clone(),
            message: "No expression at the given position".into(),
        })?;
        match request.query.kind {
            QueryKind::Definition => Ok(self.definition(request, word)),
            _ => Ok(self.references(request, word)),
        }
    }
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_ident(c))
        .filter(|w| w.chars().next().is_some_and(|c| !c.is_ascii_digit()))
}

fn word_start(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident(*c))
        .last()
        .map_or(pos, |(i, _)| i)
}

fn word_at(text: &str, pos: usize) -> Option<&str> {
    let start = word_start(text, pos);
    let len: usize = text[pos..]
        .chars()
        .take_while(|c| is_ident(*c))
        .map(char::len_utf8)
        .sum();
    let word = &text[start..pos + len];
    (!word.is_empty()).then_some(word)
}

fn declares_function(sources: &[(String, String)], name: &str) -> bool {
    let patterns = [format!("{}: function", name), format!("{} = function", name)];
    sources
        .iter()
        .any(|(_, src)| patterns.iter().any(|p| src.contains(p.as_str())))
}
