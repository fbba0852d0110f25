//! Display surface abstraction.
//!
//! The surface is the live, user-editable rendering of the document. The engine
//! only talks to it through the [`Surface`] trait, so the same logic can drive a
//! browser DOM, a native widget tree, or the headless [`MemorySurface`].
//!
//! The surface is a content root whose children are section nodes (plus any
//! stray nodes a paste may inject). Section nodes hold text-bearing leaves.

mod memory;

pub use memory::MemorySurface;

use crate::error::SurfaceError;
use crate::types::{Rect, Viewport};

/// Identity of a node issued by a surface.
///
/// Identity is stable for the node's lifetime, which is what lets the
/// reconciler keep unchanged sections untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Container half of a surface position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    /// The content root; the position offset is a child index.
    Root,
    /// A text-bearing leaf; the position offset is a char offset into its text.
    Text(NodeId),
}

/// A point in the surface, DOM-style: container plus offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub container: Container,
    pub offset: usize,
}

impl Position {
    pub fn text(node: NodeId, offset: usize) -> Self {
        Self {
            container: Container::Text(node),
            offset,
        }
    }

    pub fn root(child_index: usize) -> Self {
        Self {
            container: Container::Root,
            offset: child_index,
        }
    }
}

/// A renderable range between two surface positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceRange {
    pub start: Position,
    pub end: Position,
}

impl SurfaceRange {
    pub fn collapsed(at: Position) -> Self {
        Self { start: at, end: at }
    }
}

/// The surface's native selection, in the order the user made it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSelection {
    pub anchor: Position,
    pub focus: Position,
}

/// One text-bearing leaf, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub node: NodeId,
    pub text: String,
}

/// A change the surface observed while watching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Text inside a leaf changed.
    CharacterData { node: NodeId },
    /// Root children were added or removed.
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
}

/// Capability the engine needs from a display surface.
///
/// Positions handed back by [`Surface::selection`] must point into a text leaf
/// or at a child index of the content root.
pub trait Surface {
    // === Structure ===

    /// Ordered children of the content root.
    fn children(&self) -> Vec<NodeId>;

    /// Whether `node` is currently a direct child of the content root.
    fn is_attached(&self, node: NodeId) -> bool;

    /// Whether `node` was produced by [`Surface::create_section`].
    fn is_generated(&self, node: NodeId) -> bool;

    /// Live text content of a node, or None if the node is unknown.
    fn node_text(&self, node: NodeId) -> Option<String>;

    /// Text-bearing leaves under the content root, in document order.
    fn text_nodes(&self) -> Vec<TextRun>;

    /// Full text the surface reports.
    fn text(&self) -> String {
        self.text_nodes().into_iter().map(|run| run.text).collect()
    }

    /// Build a detached node from highlighter markup, tagged as generated.
    fn create_section(&mut self, dom_id: &str, markup: &str) -> NodeId;

    /// Attach `node` under the root before `before`, or at the end.
    fn insert_before(&mut self, node: NodeId, before: Option<NodeId>) -> Result<(), SurfaceError>;

    /// Detach a root child.
    fn remove_child(&mut self, node: NodeId) -> Result<(), SurfaceError>;

    /// Remove every root child.
    fn clear(&mut self);

    /// Release a node the engine no longer tracks. Attached nodes are left alone.
    fn discard(&mut self, _node: NodeId) {}

    /// Replace all content with a single plain, non-generated text node.
    fn set_text(&mut self, text: &str);

    // === Editing ===

    /// Delete the contents of `range` and insert `text` at its start.
    fn replace_range(&mut self, range: &SurfaceRange, text: &str) -> Result<(), SurfaceError>;

    // === Selection ===

    fn set_selection(&mut self, range: &SurfaceRange);

    fn selection(&self) -> Option<SurfaceSelection>;

    // === Geometry ===

    /// Box of the line holding a text node, relative to the content origin.
    fn line_rect(&self, node: NodeId) -> Option<Rect>;

    /// Bounding box of a range in client coordinates.
    fn range_rect(&self, range: &SurfaceRange) -> Option<Rect>;

    fn viewport(&self) -> Viewport;

    fn set_scroll_top(&mut self, scroll_top: f64);

    // === Observation ===

    fn start_watching(&mut self);

    fn stop_watching(&mut self);

    fn is_watching(&self) -> bool;

    /// Drain mutations recorded while watching.
    fn take_mutations(&mut self) -> Vec<Mutation>;

    /// Run a programmatic write with observation paused.
    ///
    /// Observation resumes afterwards only if it was active before.
    fn no_watch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        if self.is_watching() {
            self.stop_watching();
            let result = f(self);
            self.start_watching();
            result
        } else {
            f(self)
        }
    }
}
