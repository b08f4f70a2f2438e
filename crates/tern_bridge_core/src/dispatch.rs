//! Request dispatch and the editor-facing operations built on it.

use crate::completion::{Completion, Hints};
use crate::engine::{CompletionsResponse, Query, QueryKind, Request};
use crate::error::{BridgeError, Result};
use crate::host::EditorView;
use crate::registry::SessionRegistry;
use crate::request::{build_flush_request, build_request};
use serde_json::Value;
use tracing::{debug, warn};

impl SessionRegistry {
    /// Sends `request` to the project's session.
    ///
    /// A missing session is an expected race (project not started yet, or
    /// already killed): it is logged and yields `Ok(None)`. Errors reported
    /// by the engine come back as [`BridgeError::Analysis`] and leave the
    /// session in place. A broken engine link drops the session so the next
    /// start creates a fresh one.
    pub fn send_request(&mut self, request: &Request, project_id: &str) -> Result<Option<Value>> {
        let Some(session) = self.session_mut(project_id) else {
            warn!(project = %project_id, "no analysis session for project");
            return Ok(None);
        };

        debug!(project = %project_id, kind = ?request.query.kind, "dispatching request");
        match session.engine.request(request) {
            Ok(answer) => Ok(Some(answer)),
            Err(e) => Err(self.evict_on_transport(project_id, e)),
        }
    }

    /// Completions at the view's cursor, with types requested.
    pub fn hints(&mut self, view: &dyn EditorView, project_id: &str) -> Result<Option<Hints>> {
        let built = build_request(
            view,
            Query::new(QueryKind::Completions).with_types(true),
            true,
        );
        let Some(data) = self.send_request(&built.request, project_id)? else {
            return Ok(None);
        };

        let response: CompletionsResponse =
            serde_json::from_value(data).map_err(|e| BridgeError::Deserialization(e.to_string()))?;
        let guess = response.guess;
        let list = response
            .completions
            .into_iter()
            .map(|c| Completion {
                text: c.name,
                kind: c.kind,
                guess,
            })
            .collect();

        Ok(Some(Hints {
            from: response.from + built.offset,
            to: response.to + built.offset,
            list,
        }))
    }

    /// Definition of the symbol at the cursor, as the engine reports it.
    pub fn jump_to_definition(
        &mut self,
        view: &dyn EditorView,
        project_id: &str,
    ) -> Result<Option<Value>> {
        let built = build_request(view, QueryKind::Definition, false);
        self.send_request(&built.request, project_id)
    }

    /// References to the symbol at the cursor, as the engine reports them.
    pub fn find_references(
        &mut self,
        view: &dyn EditorView,
        project_id: &str,
    ) -> Result<Option<Value>> {
        let built = build_request(view, QueryKind::Refs, false);
        self.send_request(&built.request, project_id)
    }

    /// Pushes the view's current buffer into the engine without a real query.
    ///
    /// Returns whether a session received it.
    pub fn force_file_update(&mut self, view: &dyn EditorView, project_id: &str) -> Result<bool> {
        let request = build_flush_request(view);
        Ok(self.send_request(&request, project_id)?.is_some())
    }
}
