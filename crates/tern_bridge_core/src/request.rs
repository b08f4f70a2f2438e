//! Turns an editor view plus a query into a wire request.

use crate::engine::{Query, QueryKind, Request, VirtualFile};
use crate::host::EditorView;
use crate::types::Selection;
use tracing::debug;

/// Name of the empty virtual file targeted by warm-up requests.
pub const WARM_UP_FILE: &str = "#warm-up";

/// A request ready to send, plus the shift to apply to engine positions.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub request: Request,
    /// Added to engine-reported offsets to get buffer offsets.
    ///
    /// Fragment requests would send a window of the document and shift
    /// positions by the window start. Only whole-document requests are
    /// built, so this is always 0.
    pub offset: usize,
}

/// Builds a request for the view's file at its primary selection.
///
/// Without an explicit range, `end` is the selection end and `start` the
/// selection begin for a non-empty selection; `start` then defaults to
/// `end`. A dirty buffer travels as a full virtual file and the query
/// points at it by index.
pub fn build_request(
    view: &dyn EditorView,
    query: impl Into<Query>,
    allow_fragments: bool,
) -> BuiltRequest {
    let mut query = query.into();

    if query.start.is_none() && query.end.is_none() {
        let sel = primary_selection(view);
        query.end = Some(sel.end());
        if !sel.is_empty() {
            query.start = Some(sel.begin());
        }
    }
    if query.start.is_none() {
        query.start = query.end;
    }
    if query.end.is_none() {
        query.end = query.start;
    }

    let file_name = view.file_name();
    let mut request = Request {
        query,
        files: Vec::new(),
    };
    request.query.file = file_name.clone();

    if view.is_dirty() {
        request.query.file = request.push_file(VirtualFile::full(file_name, view.text()));
    }

    debug!(
        kind = ?request.query.kind,
        file = %request.query.file,
        allow_fragments,
        "built request"
    );

    BuiltRequest { request, offset: 0 }
}

/// A side-effect-free completions request against an empty virtual file.
///
/// Forces the engine through its lazy initialization.
pub fn build_fake_request() -> Request {
    let mut request = Request {
        query: Query::new(QueryKind::Completions).with_range(Some(0), Some(0)),
        files: Vec::new(),
    };
    request.query.file = request.push_file(VirtualFile::full(WARM_UP_FILE, ""));
    request
}

/// A warm-up request that also carries the view's current buffer.
pub fn build_flush_request(view: &dyn EditorView) -> Request {
    let mut request = build_fake_request();
    request.push_file(VirtualFile::full(view.file_name(), view.text()));
    request
}

fn primary_selection(view: &dyn EditorView) -> Selection {
    view.selections().first().copied().unwrap_or_default()
}
