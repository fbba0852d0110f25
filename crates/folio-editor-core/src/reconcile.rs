//! Incremental section re-rendering.
//!
//! A fresh parse is compared against the tracked section list from both ends.
//! Only the differing middle is rendered again; sections outside it keep their
//! surface nodes.

use std::collections::HashSet;
use std::ops::Range;

use crate::render::{Highlighter, render_section, section_dom_id};
use crate::sections::{ParsedSection, Section};
use crate::selection::SelectionManager;
use crate::session::Session;
use crate::surface::{NodeId, Surface};

/// What a reconcile pass will change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Everything is rendered again and the surface is cleared first.
    pub full: bool,
    /// Indices in the new section list that need rendering.
    pub modified: Range<usize>,
    /// Nodes of the sections being replaced.
    pub remove: Vec<NodeId>,
    /// First kept node after the modified range, if any.
    pub insert_before: Option<NodeId>,
}

/// Counts from one reconcile pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub rendered: usize,
    pub removed: usize,
    pub purged: usize,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SectionReconciler;

impl SectionReconciler {
    /// Diff the session's sections against a new parse and update the list.
    ///
    /// A section counts as unchanged only if its text matches, its node is
    /// still attached, and the node's live text matches. Sections in the
    /// returned `modified` range have no node yet and get fresh ids from the
    /// session; kept sections keep theirs.
    pub fn update_section_list<S: Surface + ?Sized>(
        session: &mut Session,
        surface: &S,
        mut new_sections: Vec<ParsedSection>,
    ) -> ReconcilePlan {
        let old = std::mem::take(&mut session.sections);

        if session.file_changed {
            let plan = ReconcilePlan {
                full: true,
                modified: 0..new_sections.len(),
                remove: old.iter().filter_map(|s| s.node).collect(),
                insert_before: None,
            };
            let next_id = &mut session.next_section_id;
            session.sections = new_sections.into_iter().map(|p| Self::issue(next_id, p)).collect();
            return plan;
        }

        let unchanged = |old: &Section, new: &ParsedSection| {
            old.text_with_front_matter == new.text_with_front_matter
                && old.node.is_some_and(|node| {
                    surface.is_attached(node)
                        && surface.node_text(node).as_deref() == Some(new.text_with_front_matter.as_str())
                })
        };

        let old_len = old.len();
        let new_len = new_sections.len();

        let left = old
            .iter()
            .enumerate()
            .position(|(i, section)| i >= new_len || !unchanged(section, &new_sections[i]))
            .unwrap_or(old_len);
        let mut right = old
            .iter()
            .rev()
            .enumerate()
            .position(|(i, section)| i >= new_len || !unchanged(section, &new_sections[new_len - 1 - i]))
            .unwrap_or(old_len);
        // Both scans can claim the same sections when neighbours are identical.
        let limit = old_len.min(new_len);
        if left + right > limit {
            right = limit - left;
        }

        let modified = left..new_len - right;
        let kept_right = old_len - right;
        let plan = ReconcilePlan {
            full: false,
            modified: modified.clone(),
            remove: old[left..kept_right].iter().filter_map(|s| s.node).collect(),
            insert_before: old[kept_right..].first().and_then(|s| s.node),
        };
        tracing::debug!(
            target: "folio::sections",
            left,
            right,
            old = old_len,
            new = new_len,
            "modified section window"
        );

        let next_id = &mut session.next_section_id;
        let middle: Vec<Section> = new_sections
            .drain(modified)
            .map(|parsed| Self::issue(next_id, parsed))
            .collect();
        let mut old = old;
        let tail = old.split_off(kept_right);
        old.truncate(left);
        old.extend(middle);
        old.extend(tail);
        session.sections = old;
        plan
    }

    /// Track a parsed section under an id no other section has carried.
    fn issue(next_id: &mut u64, parsed: ParsedSection) -> Section {
        let mut section = Section::from(parsed);
        section.id = *next_id;
        *next_id += 1;
        section
    }

    /// Render the planned sections and patch the surface.
    ///
    /// All writes happen with observation paused. The selection is restored
    /// from the session afterwards.
    pub fn highlight_sections<S, H>(
        session: &mut Session,
        surface: &mut S,
        plan: &ReconcilePlan,
        highlighter: &H,
    ) -> ReconcileReport
    where
        S: Surface,
        H: Highlighter + ?Sized,
    {
        let mut report = ReconcileReport::default();
        let mut fresh = Vec::with_capacity(plan.modified.len());
        for section in &mut session.sections[plan.modified.clone()] {
            let markup = render_section(&section.parsed(), highlighter);
            let node = surface.create_section(&section_dom_id(section.id), &markup);
            section.node = Some(node);
            fresh.push(node);
        }
        report.rendered = fresh.len();

        surface.no_watch(|surface| {
            if plan.full {
                surface.clear();
                for node in &plan.remove {
                    surface.discard(*node);
                }
                report.removed = plan.remove.len();
                for node in &fresh {
                    if let Err(error) = surface.insert_before(*node, None) {
                        tracing::warn!(target: "folio::sections", %error, "failed to attach section");
                    }
                }
            } else {
                for node in &plan.remove {
                    if !surface.is_attached(*node) {
                        tracing::warn!(target: "folio::sections", ?node, "section already detached");
                        surface.discard(*node);
                        continue;
                    }
                    match surface.remove_child(*node) {
                        Ok(()) => report.removed += 1,
                        Err(error) => tracing::warn!(target: "folio::sections", %error, "failed to remove section"),
                    }
                }
                let anchor = plan.insert_before.filter(|node| surface.is_attached(*node));
                for node in &fresh {
                    if let Err(error) = surface.insert_before(*node, anchor) {
                        tracing::warn!(target: "folio::sections", %error, "failed to attach section");
                    }
                }
                report.purged = Self::purge(session, surface);
            }
            SelectionManager::set_selection_start_end(session, surface, None, None, false);
        });

        tracing::debug!(
            target: "folio::sections",
            rendered = report.rendered,
            removed = report.removed,
            purged = report.purged,
            "sections reconciled"
        );
        report
    }

    /// Diff and patch in one pass.
    pub fn reconcile<S, H>(
        session: &mut Session,
        surface: &mut S,
        new_sections: Vec<ParsedSection>,
        highlighter: &H,
    ) -> ReconcileReport
    where
        S: Surface,
        H: Highlighter + ?Sized,
    {
        let plan = Self::update_section_list(session, surface, new_sections);
        Self::highlight_sections(session, surface, &plan, highlighter)
    }

    /// Remove root children no tracked section owns, such as text or
    /// duplicated spans a rich paste left behind.
    fn purge<S: Surface + ?Sized>(session: &Session, surface: &mut S) -> usize {
        let owned: HashSet<NodeId> = session.sections.iter().filter_map(|s| s.node).collect();
        let mut purged = 0;
        for child in surface.children() {
            if surface.is_generated(child) && owned.contains(&child) {
                continue;
            }
            if tracing::enabled!(target: "folio::sections", tracing::Level::WARN) {
                let text = surface.node_text(child).unwrap_or_default();
                tracing::warn!(target: "folio::sections", ?child, ?text, "purging foreign node");
            }
            match surface.remove_child(child) {
                Ok(()) => purged += 1,
                Err(error) => tracing::warn!(target: "folio::sections", %error, "failed to purge node"),
            }
        }
        purged
    }
}
