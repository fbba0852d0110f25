//! Undo/redo management for editor operations.
//!
//! Provides:
//! - `UndoState` - a snapshot of content, selection and annotations
//! - `UndoHistory` - the bounded undo/redo stacks plus the pending state
//! - `UndoEngine` - snapshotting with coalescing, and restoration
//!
//! The history always holds a *current* state: the snapshot taken after the
//! latest edit. Undo stack entries are the snapshots that preceded it.

use std::time::Duration;

use web_time::Instant;

use crate::annotation::{Annotation, diff_annotations};
use crate::change::normalize_trailing_newline;
use crate::config::EditorConfig;
use crate::offset::OffsetMapper;
use crate::selection::SelectionManager;
use crate::session::Session;
use crate::surface::Surface;
use crate::text::{EditorRope, TextBuffer};
use crate::types::{EditMode, EditorEvent, Selection};

/// One undo snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoState {
    pub content: String,
    /// Selection before the edit that produced this state.
    pub selection_before: Selection,
    /// Selection after that edit.
    pub selection_after: Selection,
    pub annotations: Vec<Annotation>,
    pub mode: Option<EditMode>,
    pub timestamp: Option<Instant>,
}

/// Whether a new snapshot starts a new undo step rather than amending the pending one.
///
/// Comment edits always push. A change of mode pushes unless the previous
/// edit was a newline. Otherwise a gap longer than `window` pushes. With no
/// previous commit (`elapsed` is None) a snapshot always pushes.
pub fn should_push(
    previous: Option<EditMode>,
    current: Option<EditMode>,
    elapsed: Option<Duration>,
    window: Duration,
) -> bool {
    current == Some(EditMode::Comment)
        || (current != previous && previous != Some(EditMode::Newlines))
        || elapsed.is_none_or(|elapsed| elapsed > window)
}

/// Bounded undo and redo stacks.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    undo_stack: Vec<UndoState>,
    redo_stack: Vec<UndoState>,
    current: Option<UndoState>,
    /// Pre-edit selection for the next snapshot.
    selection_before: Selection,
    last_mode: Option<EditMode>,
    last_time: Option<Instant>,
    max_steps: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl UndoHistory {
    pub fn new(max_steps: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current: None,
            selection_before: Selection::default(),
            last_mode: None,
            last_time: None,
            max_steps,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn current(&self) -> Option<&UndoState> {
        self.current.as_ref()
    }

    /// Pre-edit selection that the next snapshot will carry.
    pub fn selection_before(&self) -> Selection {
        self.selection_before
    }

    fn push_undo(&mut self, state: UndoState) {
        self.undo_stack.push(state);
        // Trim if over max
        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.remove(0);
        }
    }

    /// Clear all undo/redo history.
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Snapshotting and restoration over a session's [`UndoHistory`].
#[derive(Clone, Copy, Debug, Default)]
pub struct UndoEngine;

impl UndoEngine {
    /// Reset the history for the session's file and write its content to the surface.
    ///
    /// The write is observed like a user edit, so the next content check
    /// adopts it.
    pub fn init<S: Surface + ?Sized>(session: &mut Session, surface: &mut S) {
        let file = &session.file;
        let start = file.selection_start;
        let end = file.selection_end;
        let initial = UndoState {
            content: normalize_trailing_newline(file.content.clone()),
            selection_before: Selection::new(start, end),
            selection_after: Selection::new(start, end),
            annotations: file.annotations.clone(),
            mode: None,
            timestamp: None,
        };
        let history = &mut session.history;
        history.clear_history();
        history.current = Some(initial);
        history.selection_before = Selection::new(start, end);
        history.last_mode = None;
        history.last_time = None;
        session.mode = None;
        surface.set_text(&session.file.content);
        tracing::debug!(target: "folio::undo", len = session.file.content.len(), "undo history reset");
    }

    /// Capture the pre-edit selection, unless an edit is already pending.
    pub fn save_selection_state(session: &mut Session) {
        if session.mode.is_none() {
            session.history.selection_before = session.selection.as_selection();
        }
    }

    /// Snapshot the session after an edit.
    ///
    /// Pushes the previous snapshot onto the undo stack or, when the edit
    /// coalesces with it, inherits its pre-edit selection. Always clears redo.
    pub fn save_state(session: &mut Session, now: Instant, config: &EditorConfig) {
        let mode = session.mode.take();
        let history = &mut session.history;
        history.redo_stack.clear();

        let elapsed = history.last_time.map(|t| now.saturating_duration_since(t));
        let push = should_push(history.last_mode, mode, elapsed, config.coalesce_window());
        if push {
            if let Some(previous) = history.current.take() {
                history.push_undo(previous);
            }
        } else if let Some(current) = &history.current {
            history.selection_before = current.selection_before;
        }
        tracing::debug!(
            target: "folio::undo",
            mode = mode.map(|m| m.as_str()),
            last_mode = history.last_mode.map(|m| m.as_str()),
            ?elapsed,
            push,
            depth = history.undo_stack.len(),
            "saved undo state"
        );

        history.current = Some(UndoState {
            content: session.document.to_string(),
            selection_before: history.selection_before,
            selection_after: session.selection.as_selection(),
            annotations: session.file.annotations.clone(),
            mode,
            timestamp: Some(now),
        });
        history.last_time = Some(now);
        history.last_mode = mode;
        Self::emit_button_state(session);
    }

    /// Step back one snapshot. Returns false if there is nothing to undo.
    ///
    /// The restored selection is the one captured before the undone edit.
    pub fn undo<S: Surface>(session: &mut Session, surface: &mut S) -> bool {
        let Some(state) = session.history.undo_stack.pop() else {
            return false;
        };
        let Some(current) = session.history.current.take() else {
            session.history.undo_stack.push(state);
            return false;
        };
        let selection = current.selection_before;
        session.history.redo_stack.push(current);
        tracing::debug!(target: "folio::undo", depth = session.history.undo_stack.len(), "undo");
        Self::restore_state(session, surface, state, selection);
        true
    }

    /// Re-apply one undone snapshot. Returns false if there is nothing to redo.
    ///
    /// The restored selection is the one the redone edit left behind.
    pub fn redo<S: Surface>(session: &mut Session, surface: &mut S) -> bool {
        let Some(state) = session.history.redo_stack.pop() else {
            return false;
        };
        if let Some(current) = session.history.current.take() {
            session.history.push_undo(current);
        }
        let selection = state.selection_after;
        tracing::debug!(target: "folio::undo", depth = session.history.redo_stack.len(), "redo");
        Self::restore_state(session, surface, state, selection);
        true
    }

    fn restore_state<S: Surface>(
        session: &mut Session,
        surface: &mut S,
        state: UndoState,
        selection: Selection,
    ) {
        surface.no_watch(|surface| {
            if session.document.to_string() != state.content {
                set_value(session, surface, &state.content);
                session.emit(EditorEvent::ContentChanged {
                    content: state.content.clone(),
                });
            }
            SelectionManager::set_selection_start_end(
                session,
                surface,
                Some(selection.anchor),
                Some(selection.head),
                false,
            );

            if session.file.annotations != state.annotations {
                let diff = diff_annotations(&session.file.annotations, &state.annotations);
                session.file.annotations = state.annotations.clone();
                for annotation in diff.created {
                    session.emit(EditorEvent::AnnotationCreated(annotation));
                }
                for annotation in diff.removed {
                    session.emit(EditorEvent::AnnotationRemoved(annotation));
                }
                if diff.changed {
                    session.emit(EditorEvent::AnnotationsChanged);
                }
            }
        });

        let history = &mut session.history;
        history.selection_before = selection;
        history.current = Some(state);
        history.last_mode = None;
        session.mode = None;
        Self::emit_button_state(session);
    }

    fn emit_button_state(session: &mut Session) {
        let can_undo = session.history.can_undo();
        let can_redo = session.history.can_redo();
        session.emit(EditorEvent::UndoStateChanged { can_undo, can_redo });
    }
}

/// Replace only the differing middle of the surface text and adopt `value` as canonical.
fn set_value<S: Surface + ?Sized>(session: &mut Session, surface: &mut S, value: &str) {
    let old = session.document.to_string();
    if let Err(error) = OffsetMapper::replace_changed(surface, &old, value) {
        tracing::warn!(target: "folio::undo", %error, "surface rejected restore, next reconcile repairs it");
    }
    session.document = EditorRope::from_str(value);
    session.file.content = value.to_owned();
}
