//! Core editor types: selection, edit modes, geometry, and outbound events.
//!
//! These types are surface-agnostic and shared by every engine component.

use std::ops::Range;

use crate::annotation::Annotation;

/// A selection as the user made it, recorded in undo snapshots.
///
/// `head` is the caret end; it may come before `anchor`.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// Kind of edit that produced the pending undo state.
///
/// Used to decide whether consecutive edits coalesce into one undo step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditMode {
    Typing,
    Paste,
    Cut,
    Comment,
    Newlines,
    Command,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Typing => "typing",
            Self::Paste => "paste",
            Self::Cut => "cut",
            Self::Comment => "comment",
            Self::Newlines => "newlines",
            Self::Command => "command",
        }
    }
}

impl std::fmt::Display for EditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned box in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Scroll container metrics for the editing surface.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Viewport {
    /// Offset of the surface's content box from the page origin.
    pub offset_left: f64,
    pub offset_top: f64,
    pub scroll_top: f64,
    pub height: f64,
}

/// Caret position in surface-local pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CaretCoordinates {
    pub x: f64,
    pub y: f64,
}

/// Notifications produced by the engine, drained by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    /// Canonical document text changed.
    ContentChanged { content: String },
    /// An annotation appeared (undo/redo brought it back).
    AnnotationCreated(Annotation),
    /// An annotation disappeared (undo/redo dropped it).
    AnnotationRemoved(Annotation),
    /// Annotation offsets or comments changed.
    AnnotationsChanged,
    /// Caret moved to a different line.
    CursorCoordinates { x: f64, y: f64 },
    /// A newly selected file finished opening.
    FileOpened { content: String },
    /// Undo/redo availability may have changed.
    UndoStateChanged { can_undo: bool, can_redo: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bounds_ignore_direction() {
        assert_eq!(Selection::new(5, 10).to_range(), 5..10);
        let backwards = Selection::new(10, 5);
        assert_eq!((backwards.start(), backwards.end()), (5, 10));
        assert_eq!(backwards.head, 5);
    }

    #[test]
    fn test_rect_center() {
        let rect = Rect::new(10.0, 20.0, 8.0, 16.0);
        assert_eq!(rect.center_x(), 14.0);
        assert_eq!(rect.center_y(), 28.0);
    }
}
