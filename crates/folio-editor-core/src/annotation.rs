//! Comment annotations anchored into the canonical document.
//!
//! Annotations track edits through [`Annotation::shift`], and undo snapshots of
//! them are compared with [`diff_annotations`].

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A single comment inside a discussion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub content: String,
}

/// A discussion anchored to a text range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: SmolStr,
    pub selection_start: usize,
    pub selection_end: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

impl Annotation {
    pub fn new(id: impl Into<SmolStr>, selection_start: usize, selection_end: usize) -> Self {
        Self {
            id: id.into(),
            selection_start,
            selection_end,
            comments: Vec::new(),
        }
    }

    pub fn with_comment(mut self, author: Option<&str>, content: impl Into<String>) -> Self {
        self.comments.push(Comment {
            author: author.map(str::to_owned),
            content: content.into(),
        });
        self
    }

    pub fn range(&self) -> Range<usize> {
        self.selection_start..self.selection_end
    }

    /// Move both endpoints through one change window.
    ///
    /// `window` is the affected range before the change (empty for insertions),
    /// `delta` is the signed length change. Returns true if either endpoint moved.
    pub fn shift(&mut self, window: Range<usize>, delta: isize) -> bool {
        let start = shift_endpoint(self.selection_start, &window, delta);
        let end = shift_endpoint(self.selection_end, &window, delta);
        let moved = start != self.selection_start || end != self.selection_end;
        self.selection_start = start;
        self.selection_end = end;
        moved
    }

    /// Clamp both endpoints into `0..=len`. Returns true if anything changed.
    pub fn clamp(&mut self, len: usize) -> bool {
        let start = self.selection_start.min(len);
        let end = self.selection_end.min(len).max(start);
        let changed = start != self.selection_start || end != self.selection_end;
        self.selection_start = start;
        self.selection_end = end;
        changed
    }
}

fn shift_endpoint(pos: usize, window: &Range<usize>, delta: isize) -> usize {
    if pos >= window.end {
        apply_delta(pos, delta)
    } else if pos > window.start {
        window.start
    } else {
        pos
    }
}

/// Apply a signed delta to a usize, saturating at 0 on underflow.
pub fn apply_delta(val: usize, delta: isize) -> usize {
    if delta >= 0 {
        val.saturating_add(delta as usize)
    } else {
        val.saturating_sub(delta.unsigned_abs())
    }
}

/// Structural difference between two annotation snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationDiff {
    /// Present only in the new snapshot.
    pub created: Vec<Annotation>,
    /// Present only in the old snapshot.
    pub removed: Vec<Annotation>,
    /// Some annotation present in both differs.
    pub changed: bool,
}

impl AnnotationDiff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty() && !self.changed
    }
}

/// Compare two snapshots by annotation id.
pub fn diff_annotations(old: &[Annotation], new: &[Annotation]) -> AnnotationDiff {
    let old_by_id: BTreeMap<&str, &Annotation> = old.iter().map(|a| (a.id.as_str(), a)).collect();
    let new_by_id: BTreeMap<&str, &Annotation> = new.iter().map(|a| (a.id.as_str(), a)).collect();

    let mut diff = AnnotationDiff::default();
    for annotation in new {
        match old_by_id.get(annotation.id.as_str()) {
            None => diff.created.push(annotation.clone()),
            Some(previous) if *previous != annotation => diff.changed = true,
            Some(_) => {}
        }
    }
    for annotation in old {
        if !new_by_id.contains_key(annotation.id.as_str()) {
            diff.removed.push(annotation.clone());
        }
    }
    diff
}
