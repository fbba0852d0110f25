//! Per-file editing state.
//!
//! Everything that changes while a file is edited lives here, owned by the
//! caller and passed explicitly into each engine component. Opening a
//! different file replaces the whole session.

use crate::file::FileRecord;
use crate::sections::Section;
use crate::text::{EditorRope, TextBuffer};
use crate::types::{EditMode, EditorEvent, Selection};
use crate::undo::UndoHistory;

/// Selection bounds in the canonical document.
///
/// Bounds are always ordered; `backwards` records that the user's focus is at
/// `start`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionState {
    pub start: usize,
    pub end: usize,
    pub backwards: bool,
    /// Last caret y reported to the host.
    pub cursor_y: Option<f64>,
}

impl SelectionState {
    /// Offset of the caret end of the selection.
    pub fn focus(&self) -> usize {
        if self.backwards { self.start } else { self.end }
    }

    pub fn as_selection(&self) -> Selection {
        if self.backwards {
            Selection::new(self.end, self.start)
        } else {
            Selection::new(self.start, self.end)
        }
    }
}

/// State of the open file.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) document: EditorRope,
    pub(crate) file: FileRecord,
    pub(crate) selection: SelectionState,
    pub(crate) sections: Vec<Section>,
    pub(crate) history: UndoHistory,
    /// Kind of the edit waiting for its undo snapshot.
    pub(crate) mode: Option<EditMode>,
    /// Armed by a newline that inserted a list or quote prefix.
    pub(crate) clear_newline: bool,
    /// Set until the newly selected file's text has been adopted.
    pub(crate) file_changed: bool,
    /// Next id handed to a freshly rendered section. Never reused.
    pub(crate) next_section_id: u64,
    pub(crate) events: Vec<EditorEvent>,
}

impl Session {
    /// Session for a newly selected file. Its text is adopted on the first content check.
    pub fn new(file: FileRecord) -> Self {
        Self::with_undo_capacity(file, 100)
    }

    pub fn with_undo_capacity(file: FileRecord, undo_capacity: usize) -> Self {
        Self {
            document: EditorRope::from_str(&file.content),
            file,
            selection: SelectionState::default(),
            sections: Vec::new(),
            history: UndoHistory::new(undo_capacity),
            mode: None,
            clear_newline: false,
            file_changed: true,
            next_section_id: 0,
            events: Vec::new(),
        }
    }

    /// Canonical document text.
    pub fn content(&self) -> String {
        self.document.to_string()
    }

    pub fn document(&self) -> &EditorRope {
        &self.document
    }

    pub fn len_chars(&self) -> usize {
        self.document.len_chars()
    }

    pub fn file(&self) -> &FileRecord {
        &self.file
    }

    pub fn file_mut(&mut self) -> &mut FileRecord {
        &mut self.file
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn mode(&self) -> Option<EditMode> {
        self.mode
    }

    pub fn is_continuation_armed(&self) -> bool {
        self.clear_newline
    }

    pub fn is_file_open(&self) -> bool {
        !self.file_changed
    }

    pub(crate) fn emit(&mut self, event: EditorEvent) {
        tracing::trace!(target: "folio::events", ?event, "emit");
        self.events.push(event);
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }
}
