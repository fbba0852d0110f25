//! Headless surface backed by an in-memory node tree.
//!
//! Section nodes hold a flat list of text leaves (nested markup spans are
//! flattened, keeping the innermost class). Geometry uses a fixed monospace
//! grid. User-side helpers simulate what a browser does to a contenteditable
//! element so the engine can be driven end to end without a DOM.

use std::collections::HashMap;
use std::fmt::Write as _;

use smol_str::SmolStr;

use super::{Container, Mutation, NodeId, Position, Surface, SurfaceRange, SurfaceSelection, TextRun};
use crate::error::SurfaceError;
use crate::types::{Rect, Viewport};

#[derive(Clone, Debug)]
struct Leaf {
    id: NodeId,
    class: Option<SmolStr>,
    text: String,
}

#[derive(Clone, Debug)]
enum Block {
    Section {
        dom_id: SmolStr,
        generated: bool,
        leaves: Vec<Leaf>,
    },
    /// Root-level text outside any section.
    Stray(Leaf),
}

impl Block {
    fn leaves(&self) -> &[Leaf] {
        match self {
            Block::Section { leaves, .. } => leaves,
            Block::Stray(leaf) => std::slice::from_ref(leaf),
        }
    }

    fn leaves_mut(&mut self) -> &mut [Leaf] {
        match self {
            Block::Section { leaves, .. } => leaves,
            Block::Stray(leaf) => std::slice::from_mut(leaf),
        }
    }

    fn text(&self) -> String {
        self.leaves().iter().map(|l| l.text.as_str()).collect()
    }
}

/// In-memory [`Surface`] implementation.
#[derive(Clone, Debug)]
pub struct MemorySurface {
    children: Vec<NodeId>,
    blocks: HashMap<NodeId, Block>,
    leaf_owner: HashMap<NodeId, NodeId>,
    next_id: u64,
    selection: Option<SurfaceSelection>,
    watching: bool,
    mutations: Vec<Mutation>,
    viewport: Viewport,
    line_height: f64,
    char_width: f64,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            blocks: HashMap::new(),
            leaf_owner: HashMap::new(),
            next_id: 0,
            selection: None,
            watching: false,
            mutations: Vec::new(),
            viewport: Viewport {
                height: 400.0,
                ..Default::default()
            },
            line_height: 20.0,
            char_width: 8.0,
        }
    }

    /// Set the monospace grid used for geometry.
    pub fn with_metrics(mut self, line_height: f64, char_width: f64) -> Self {
        self.line_height = line_height;
        self.char_width = char_width;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn record(&mut self, mutation: Mutation) {
        if self.watching {
            self.mutations.push(mutation);
        }
    }

    fn attached_leaves(&self) -> Vec<&Leaf> {
        self.children
            .iter()
            .filter_map(|id| self.blocks.get(id))
            .flat_map(|block| block.leaves().iter())
            .collect()
    }

    fn new_stray(&mut self, text: &str) -> NodeId {
        let id = self.alloc();
        self.blocks.insert(
            id,
            Block::Stray(Leaf {
                id,
                class: None,
                text: text.to_owned(),
            }),
        );
        self.leaf_owner.insert(id, id);
        id
    }

    fn forget(&mut self, node: NodeId) {
        if let Some(block) = self.blocks.remove(&node) {
            for leaf in block.leaves() {
                self.leaf_owner.remove(&leaf.id);
            }
        }
    }

    /// Global char offset of a position, if it resolves.
    fn resolve(&self, position: &Position) -> Option<usize> {
        match position.container {
            Container::Root => Some(
                self.children
                    .iter()
                    .take(position.offset)
                    .filter_map(|id| self.blocks.get(id))
                    .map(|b| b.text().chars().count())
                    .sum(),
            ),
            Container::Text(node) => {
                let mut acc = 0;
                for leaf in self.attached_leaves() {
                    let len = leaf.text.chars().count();
                    if leaf.id == node {
                        return Some(acc + position.offset.min(len));
                    }
                    acc += len;
                }
                None
            }
        }
    }

    /// Position for a global offset.
    ///
    /// With `prefer_earlier`, an offset on a leaf boundary lands at the end of
    /// the earlier leaf, which is where a browser keeps the caret while typing.
    fn locate(&self, offset: usize, prefer_earlier: bool) -> Position {
        let mut acc = 0;
        for leaf in self.attached_leaves() {
            let len = leaf.text.chars().count();
            if offset < acc + len || (prefer_earlier && len > 0 && offset == acc + len) {
                return Position::text(leaf.id, offset - acc);
            }
            acc += len;
        }
        Position::root(self.children.len())
    }

    fn delete_global(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let mut acc = 0;
        for id in self.children.clone() {
            let Some(block) = self.blocks.get_mut(&id) else {
                continue;
            };
            for leaf in block.leaves_mut() {
                let len = leaf.text.chars().count();
                let s = start.max(acc);
                let e = end.min(acc + len);
                if s < e {
                    let from = byte_index(&leaf.text, s - acc);
                    let to = byte_index(&leaf.text, e - acc);
                    leaf.text.replace_range(from..to, "");
                }
                acc += len;
            }
        }
    }

    /// Insert a new text node at `at`, splitting the containing leaf.
    fn insert_node_at(&mut self, at: Position, text: &str) -> NodeId {
        let new_id = self.alloc();
        let Container::Text(target) = at.container else {
            let id = self.new_stray(text);
            let index = at.offset.min(self.children.len());
            self.children.insert(index, id);
            return id;
        };
        let Some(owner) = self.leaf_owner.get(&target).copied() else {
            let id = self.new_stray(text);
            self.children.push(id);
            return id;
        };
        let rest_id = self.alloc();

        match self.blocks.get_mut(&owner) {
            Some(Block::Section { leaves, .. }) => {
                let Some(idx) = leaves.iter().position(|l| l.id == target) else {
                    return new_id;
                };
                let split = byte_index(&leaves[idx].text, at.offset);
                let rest = leaves[idx].text.split_off(split);
                let class = leaves[idx].class.clone();
                leaves.insert(
                    idx + 1,
                    Leaf {
                        id: new_id,
                        class: class.clone(),
                        text: text.to_owned(),
                    },
                );
                if !rest.is_empty() {
                    leaves.insert(
                        idx + 2,
                        Leaf {
                            id: rest_id,
                            class,
                            text: rest,
                        },
                    );
                    self.leaf_owner.insert(rest_id, owner);
                }
                self.leaf_owner.insert(new_id, owner);
            }
            Some(Block::Stray(leaf)) => {
                let split = byte_index(&leaf.text, at.offset);
                let rest = leaf.text.split_off(split);
                let index = self
                    .children
                    .iter()
                    .position(|c| *c == owner)
                    .map_or(self.children.len(), |i| i + 1);
                self.blocks.insert(
                    new_id,
                    Block::Stray(Leaf {
                        id: new_id,
                        class: None,
                        text: text.to_owned(),
                    }),
                );
                self.leaf_owner.insert(new_id, new_id);
                self.children.insert(index, new_id);
                if !rest.is_empty() {
                    self.blocks.insert(
                        rest_id,
                        Block::Stray(Leaf {
                            id: rest_id,
                            class: None,
                            text: rest,
                        }),
                    );
                    self.leaf_owner.insert(rest_id, rest_id);
                    self.children.insert(index + 1, rest_id);
                }
            }
            None => {}
        }
        new_id
    }

    fn line_col(&self, text: &str, offset: usize) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for ch in text.chars().take(offset) {
            if ch == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    // === User-side simulation ===

    /// Global (anchor, focus) offsets of the native selection.
    pub fn selection_offsets(&self) -> Option<(usize, usize)> {
        let sel = self.selection?;
        Some((self.resolve(&sel.anchor)?, self.resolve(&sel.focus)?))
    }

    /// Place the native selection, like a mouse drag from `anchor` to `focus`.
    pub fn select(&mut self, anchor: usize, focus: usize) {
        self.selection = Some(SurfaceSelection {
            anchor: self.locate(anchor, true),
            focus: self.locate(focus, true),
        });
    }

    /// Type `text` over the current selection, editing the caret's text node in place.
    pub fn type_text(&mut self, text: &str) {
        let len = self.text().chars().count();
        let (start, end) = match self.selection_offsets() {
            Some((a, f)) => (a.min(f), a.max(f)),
            None => (len, len),
        };
        self.delete_global(start, end);

        let node = match self.locate(start, true) {
            Position {
                container: Container::Text(node),
                offset,
            } => {
                let owner = self.leaf_owner.get(&node).copied();
                if let Some(leaf) = owner
                    .and_then(|o| self.blocks.get_mut(&o))
                    .and_then(|b| b.leaves_mut().iter_mut().find(|l| l.id == node))
                {
                    let at = byte_index(&leaf.text, offset);
                    leaf.text.insert_str(at, text);
                }
                node
            }
            Position { offset, .. } => {
                let id = self.new_stray(text);
                let index = offset.min(self.children.len());
                self.children.insert(index, id);
                id
            }
        };

        let caret = start + text.chars().count();
        self.select(caret, caret);
        self.record(Mutation::CharacterData { node });
    }

    /// Backspace: delete the selection, or the char before the caret.
    pub fn delete_backward(&mut self) {
        let Some((a, f)) = self.selection_offsets() else {
            return;
        };
        let (start, end) = (a.min(f), a.max(f));
        let (start, end) = if start == end {
            (start.saturating_sub(1), end)
        } else {
            (start, end)
        };
        if start == end {
            return;
        }
        let node = match self.locate(start, false).container {
            Container::Text(node) => node,
            Container::Root => NodeId(u64::MAX),
        };
        self.delete_global(start, end);
        self.select(start, start);
        self.record(Mutation::CharacterData { node });
    }

    /// Insert a root-level text node that no section owns, as a rich paste would.
    pub fn inject_foreign_text(&mut self, child_index: usize, text: &str) -> NodeId {
        let id = self.new_stray(text);
        let index = child_index.min(self.children.len());
        self.children.insert(index, id);
        self.record(Mutation::ChildList {
            added: vec![id],
            removed: Vec::new(),
        });
        id
    }

    /// Unlink a root child but keep the node alive, as a browser does when
    /// something outside the engine removes it.
    pub fn detach(&mut self, node: NodeId) {
        let before = self.children.len();
        self.children.retain(|c| *c != node);
        if self.children.len() != before {
            self.record(Mutation::ChildList {
                added: Vec::new(),
                removed: vec![node],
            });
        }
    }

    /// Dom id of a section node.
    pub fn dom_id(&self, node: NodeId) -> Option<&str> {
        match self.blocks.get(&node)? {
            Block::Section { dom_id, .. } => Some(dom_id.as_str()),
            Block::Stray(_) => None,
        }
    }

    /// Render the root's children one per line, for snapshot tests.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for id in &self.children {
            let Some(block) = self.blocks.get(id) else {
                continue;
            };
            match block {
                Block::Section {
                    dom_id, generated, ..
                } => {
                    let _ = write!(out, "<{}{}>", dom_id, if *generated { "" } else { " foreign" });
                }
                Block::Stray(_) => out.push_str("<text>"),
            }
            for leaf in block.leaves() {
                match &leaf.class {
                    Some(class) => {
                        let _ = write!(out, " {}:{:?}", class, leaf.text);
                    }
                    None => {
                        let _ = write!(out, " {:?}", leaf.text);
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

impl Surface for MemorySurface {
    fn children(&self) -> Vec<NodeId> {
        self.children.clone()
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.children.contains(&node)
    }

    fn is_generated(&self, node: NodeId) -> bool {
        matches!(
            self.blocks.get(&node),
            Some(Block::Section {
                generated: true,
                ..
            })
        )
    }

    fn node_text(&self, node: NodeId) -> Option<String> {
        if let Some(block) = self.blocks.get(&node) {
            return Some(block.text());
        }
        let owner = self.leaf_owner.get(&node)?;
        self.blocks
            .get(owner)?
            .leaves()
            .iter()
            .find(|l| l.id == node)
            .map(|l| l.text.clone())
    }

    fn text_nodes(&self) -> Vec<TextRun> {
        self.attached_leaves()
            .into_iter()
            .map(|leaf| TextRun {
                node: leaf.id,
                text: leaf.text.clone(),
            })
            .collect()
    }

    fn create_section(&mut self, dom_id: &str, markup: &str) -> NodeId {
        let id = self.alloc();
        let mut leaves = Vec::new();
        for (class, text) in parse_markup(markup) {
            let leaf_id = self.alloc();
            self.leaf_owner.insert(leaf_id, id);
            leaves.push(Leaf {
                id: leaf_id,
                class,
                text,
            });
        }
        self.blocks.insert(
            id,
            Block::Section {
                dom_id: dom_id.into(),
                generated: true,
                leaves,
            },
        );
        id
    }

    fn insert_before(&mut self, node: NodeId, before: Option<NodeId>) -> Result<(), SurfaceError> {
        if !self.blocks.contains_key(&node) {
            return Err(SurfaceError::UnknownNode(node));
        }
        self.children.retain(|c| *c != node);
        let index = match before {
            Some(anchor) => self
                .children
                .iter()
                .position(|c| *c == anchor)
                .ok_or(SurfaceError::Detached(anchor))?,
            None => self.children.len(),
        };
        self.children.insert(index, node);
        self.record(Mutation::ChildList {
            added: vec![node],
            removed: Vec::new(),
        });
        Ok(())
    }

    fn remove_child(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        let index = self
            .children
            .iter()
            .position(|c| *c == node)
            .ok_or(SurfaceError::Detached(node))?;
        self.children.remove(index);
        self.forget(node);
        self.record(Mutation::ChildList {
            added: Vec::new(),
            removed: vec![node],
        });
        Ok(())
    }

    fn clear(&mut self) {
        let removed = std::mem::take(&mut self.children);
        for node in &removed {
            self.forget(*node);
        }
        self.record(Mutation::ChildList {
            added: Vec::new(),
            removed,
        });
    }

    fn discard(&mut self, node: NodeId) {
        if !self.children.contains(&node) {
            self.forget(node);
        }
    }

    fn set_text(&mut self, text: &str) {
        self.clear();
        if !text.is_empty() {
            let id = self.new_stray(text);
            self.children.push(id);
            self.record(Mutation::ChildList {
                added: vec![id],
                removed: Vec::new(),
            });
        }
    }

    fn replace_range(&mut self, range: &SurfaceRange, text: &str) -> Result<(), SurfaceError> {
        let start = self
            .resolve(&range.start)
            .ok_or_else(|| SurfaceError::InvalidRange(format!("start {:?}", range.start)))?;
        let end = self
            .resolve(&range.end)
            .ok_or_else(|| SurfaceError::InvalidRange(format!("end {:?}", range.end)))?;
        let (start, end) = (start.min(end), start.max(end));
        tracing::trace!(target: "folio::surface", start, end, inserted = text.len(), "replace_range");

        self.delete_global(start, end);
        if text.is_empty() {
            if start < end
                && let Container::Text(node) = self.locate(start, true).container
            {
                self.record(Mutation::CharacterData { node });
            }
            return Ok(());
        }
        let at = if self.resolve(&range.start) == Some(start) {
            range.start
        } else {
            self.locate(start, true)
        };
        let node = self.insert_node_at(at, text);
        self.record(Mutation::CharacterData { node });
        Ok(())
    }

    fn set_selection(&mut self, range: &SurfaceRange) {
        self.selection = Some(SurfaceSelection {
            anchor: range.start,
            focus: range.end,
        });
    }

    fn selection(&self) -> Option<SurfaceSelection> {
        self.selection
    }

    fn line_rect(&self, node: NodeId) -> Option<Rect> {
        let start = self.resolve(&Position::text(node, 0))?;
        let text = self.text();
        let (line, _) = self.line_col(&text, start);
        let width = text.lines().nth(line).map_or(0, |l| l.chars().count());
        Some(Rect::new(
            0.0,
            line as f64 * self.line_height,
            width as f64 * self.char_width,
            self.line_height,
        ))
    }

    fn range_rect(&self, range: &SurfaceRange) -> Option<Rect> {
        let start = self.resolve(&range.start)?;
        let end = self.resolve(&range.end)?;
        let (start, end) = (start.min(end), start.max(end));
        let text = self.text();
        let (l0, c0) = self.line_col(&text, start);
        let (l1, c1) = self.line_col(&text, end);
        let top = self.viewport.offset_top + l0 as f64 * self.line_height - self.viewport.scroll_top;
        let rect = if l0 == l1 {
            Rect::new(
                self.viewport.offset_left + c0 as f64 * self.char_width,
                top,
                (c1 - c0) as f64 * self.char_width,
                self.line_height,
            )
        } else {
            Rect::new(
                self.viewport.offset_left,
                top,
                c0.max(c1) as f64 * self.char_width,
                (l1 - l0 + 1) as f64 * self.line_height,
            )
        };
        Some(rect)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_scroll_top(&mut self, scroll_top: f64) {
        self.viewport.scroll_top = scroll_top.max(0.0);
    }

    fn start_watching(&mut self) {
        self.watching = true;
    }

    fn stop_watching(&mut self) {
        self.watching = false;
    }

    fn is_watching(&self) -> bool {
        self.watching
    }

    fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }
}

fn byte_index(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map_or(s.len(), |(idx, _)| idx)
}

/// Flatten `<span class="...">` markup into (class, text) leaves.
///
/// Entities `&amp;`, `&lt;`, `&gt;`, `&quot;` and `&#39;` are decoded; any
/// other tag or entity is kept as literal text.
fn parse_markup(markup: &str) -> Vec<(Option<SmolStr>, String)> {
    let mut leaves = Vec::new();
    let mut classes: Vec<Option<SmolStr>> = Vec::new();
    let mut current = String::new();
    let mut rest = markup;

    let flush = |current: &mut String,
                 classes: &[Option<SmolStr>],
                 leaves: &mut Vec<(Option<SmolStr>, String)>| {
        if !current.is_empty() {
            leaves.push((classes.last().cloned().flatten(), std::mem::take(current)));
        }
    };

    while let Some(ch) = rest.chars().next() {
        if rest.starts_with("<span") {
            if let Some(close) = rest.find('>') {
                flush(&mut current, &classes, &mut leaves);
                classes.push(class_attr(&rest[..close]));
                rest = &rest[close + 1..];
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix("</span>") {
            flush(&mut current, &classes, &mut leaves);
            classes.pop();
            rest = after;
            continue;
        }
        if ch == '&' {
            let entity = [
                ("&amp;", '&'),
                ("&lt;", '<'),
                ("&gt;", '>'),
                ("&quot;", '"'),
                ("&#39;", '\''),
            ]
            .into_iter()
            .find(|(name, _)| rest.starts_with(name));
            if let Some((name, decoded)) = entity {
                current.push(decoded);
                rest = &rest[name.len()..];
                continue;
            }
        }
        current.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    flush(&mut current, &classes, &mut leaves);
    leaves
}

fn class_attr(tag: &str) -> Option<SmolStr> {
    let start = tag.find("class=\"")? + "class=\"".len();
    let len = tag[start..].find('"')?;
    Some(SmolStr::new(&tag[start..start + len]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(surface: &mut MemorySurface, id: &str, markup: &str) -> NodeId {
        let node = surface.create_section(id, markup);
        surface.insert_before(node, None).unwrap();
        node
    }

    #[test]
    fn test_parse_markup_flattens_and_decodes() {
        let leaves = parse_markup(r#"a &amp; <span class="token bold">**b**</span>&lt;c"#);
        let expected: Vec<(Option<SmolStr>, String)> = vec![
            (None, "a & ".to_string()),
            (Some(SmolStr::new("token bold")), "**b**".to_string()),
            (None, "<c".to_string()),
        ];
        assert_eq!(leaves, expected);
    }

    #[test]
    fn test_created_sections_are_detached_until_inserted() {
        let mut surface = MemorySurface::new();
        let node = surface.create_section("s1", "hello\n");
        assert!(surface.is_generated(node));
        assert!(!surface.is_attached(node));
        assert_eq!(surface.text(), "");

        surface.insert_before(node, None).unwrap();
        assert!(surface.is_attached(node));
        assert_eq!(surface.text(), "hello\n");
    }

    #[test]
    fn test_mutations_only_recorded_while_watching() {
        let mut surface = MemorySurface::new();
        section(&mut surface, "s1", "abc\n");
        assert!(surface.take_mutations().is_empty());

        surface.start_watching();
        surface.select(3, 3);
        surface.type_text("d");
        assert_eq!(surface.take_mutations().len(), 1);

        surface.no_watch(|s| s.set_text("zzz\n"));
        assert!(surface.is_watching());
        assert!(surface.take_mutations().is_empty());
    }

    #[test]
    fn test_type_text_edits_in_place() {
        let mut surface = MemorySurface::new();
        let node = section(&mut surface, "s1", "<span class=\"h\"># Hi</span>\n");
        surface.select(4, 4);
        surface.type_text("!");
        assert_eq!(surface.text(), "# Hi!\n");
        assert_eq!(surface.node_text(node).as_deref(), Some("# Hi!\n"));
        assert_eq!(surface.selection_offsets(), Some((5, 5)));
    }

    #[test]
    fn test_replace_range_splits_leaf() {
        let mut surface = MemorySurface::new();
        section(&mut surface, "s1", "hello world\n");
        let runs = surface.text_nodes();
        let range = SurfaceRange {
            start: Position::text(runs[0].node, 6),
            end: Position::text(runs[0].node, 11),
        };
        surface.replace_range(&range, "rust").unwrap();
        assert_eq!(surface.text(), "hello rust\n");
        assert_eq!(surface.text_nodes().len(), 3);
    }

    #[test]
    fn test_replace_range_across_sections() {
        let mut surface = MemorySurface::new();
        section(&mut surface, "s1", "ab\n");
        section(&mut surface, "s2", "cd\n");
        let start = surface.locate(1, false);
        let end = surface.locate(4, false);
        surface
            .replace_range(&SurfaceRange { start, end }, "X")
            .unwrap();
        assert_eq!(surface.text(), "aXd\n");
    }

    #[test]
    fn test_insert_before_unknown_anchor_fails() {
        let mut surface = MemorySurface::new();
        let node = surface.create_section("s1", "x\n");
        let err = surface.insert_before(node, Some(NodeId(999))).unwrap_err();
        assert_eq!(err, SurfaceError::Detached(NodeId(999)));
    }

    #[test]
    fn test_range_rect_single_line() {
        let mut surface = MemorySurface::new().with_metrics(10.0, 5.0);
        section(&mut surface, "s1", "ab\ncd\n");
        let start = surface.locate(4, false);
        let end = surface.locate(5, false);
        let rect = surface.range_rect(&SurfaceRange { start, end }).unwrap();
        assert_eq!(rect, Rect::new(5.0, 10.0, 5.0, 10.0));
    }

    #[test]
    fn test_dump() {
        let mut surface = MemorySurface::new();
        section(&mut surface, "s1", "<span class=\"token md\">a</span>b");
        surface.inject_foreign_text(0, "x");
        insta::assert_snapshot!(surface.dump().trim_end(), @r#"
        <text> "x"
        <s1> token md:"a" "b"
        "#);
    }

    #[test]
    fn test_discard_frees_only_detached_nodes() {
        let mut surface = MemorySurface::new();
        let kept = section(&mut surface, "s1", "a\n");
        let gone = section(&mut surface, "s2", "b\n");
        surface.detach(gone);
        assert_eq!(surface.node_text(gone).as_deref(), Some("b\n"));

        surface.discard(kept);
        surface.discard(gone);
        assert_eq!(surface.node_text(kept).as_deref(), Some("a\n"));
        assert_eq!(surface.node_text(gone), None);
        assert_eq!(surface.text(), "a\n");
    }
}
