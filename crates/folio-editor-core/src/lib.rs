//! folio-editor-core: keeps a canonical markdown document in sync with an
//! editable display surface.
//!
//! This crate provides:
//! - `Surface` trait for the live display, plus the headless `MemorySurface`
//! - `OffsetMapper` - document offsets to surface positions and back
//! - `ChangeDetector` - diffing surface edits into the canonical text
//! - `SectionReconciler` - re-rendering only the sections that changed
//! - `UndoEngine` - coalescing undo/redo over content, selection and annotations
//! - `ActionDispatcher` - indent, outdent and list-continuing newlines
//! - `Editor` - all of the above wired to a parser, highlighter and scheduler

pub mod actions;
pub mod annotation;
pub mod change;
pub mod config;
pub mod editor;
pub mod error;
pub mod file;
pub mod keys;
pub mod offset;
pub mod reconcile;
pub mod render;
pub mod schedule;
pub mod sections;
pub mod selection;
pub mod session;
pub mod surface;
pub mod text;
pub mod types;
pub mod undo;

pub use actions::{ActionDispatcher, EditAction, EditState};
pub use annotation::{Annotation, AnnotationDiff, Comment, diff_annotations};
pub use change::{ChangeDetector, ChangeOutcome, DiffOp, diff};
pub use config::EditorConfig;
pub use editor::{Editor, Task};
pub use error::{ConfigError, SurfaceError};
pub use file::FileRecord;
pub use keys::{Direction, Key, KeyInput, KeydownResult, Modifiers};
pub use offset::OffsetMapper;
pub use reconcile::{ReconcilePlan, ReconcileReport, SectionReconciler};
pub use render::{Highlighter, PreviewRenderer};
pub use schedule::{Clock, ManualClock, Scheduler, SystemClock};
pub use sections::{BlankLineSections, ParsedSection, Section, SectionParser};
pub use selection::SelectionManager;
pub use session::{Session, SelectionState};
pub use smol_str::SmolStr;
pub use surface::{MemorySurface, Mutation, NodeId, Position, Surface, SurfaceRange, SurfaceSelection};
pub use text::{EditorRope, TextBuffer};
pub use types::{CaretCoordinates, EditMode, EditorEvent, Rect, Selection, Viewport};
pub use undo::{UndoEngine, UndoHistory, UndoState};
