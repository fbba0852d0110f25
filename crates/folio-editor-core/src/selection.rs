//! Keeping the session selection and the surface selection in step.

use crate::config::EditorConfig;
use crate::offset::OffsetMapper;
use crate::session::Session;
use crate::surface::Surface;
use crate::types::EditorEvent;

#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionManager;

impl SelectionManager {
    /// Set the selection bounds. Missing bounds keep their current value.
    ///
    /// Bounds are clamped into the document and ordered. Unless
    /// `skip_surface_update` is set, the surface selection is rewritten to
    /// match. A `start` past `end` is only kept as a backwards selection when
    /// the bounds came from the surface (`skip_surface_update`).
    pub fn set_selection_start_end<S: Surface + ?Sized>(
        session: &mut Session,
        surface: &mut S,
        start: Option<usize>,
        end: Option<usize>,
        skip_surface_update: bool,
    ) {
        let len = session.len_chars();
        let start = start.unwrap_or(session.selection.start).min(len);
        let end = end.unwrap_or(session.selection.end).min(len);
        let (min, max) = (start.min(end), start.max(end));

        session.selection.start = min;
        session.selection.end = max;
        session.selection.backwards = skip_surface_update && start > end;

        if !skip_surface_update {
            let range = OffsetMapper::range_for(surface, min, Some(max));
            surface.set_selection(&range);
        }

        session.file.selection_start = min;
        session.file.selection_end = max;
        Self::update_cursor_coordinates(session, surface);
    }

    /// Report caret coordinates to the host when the caret changed line.
    pub fn update_cursor_coordinates<S: Surface + ?Sized>(session: &mut Session, surface: &S) {
        let focus = session.selection.focus();
        let Some(coords) = OffsetMapper::caret_coordinates(surface, &session.document, focus) else {
            return;
        };
        if session.selection.cursor_y != Some(coords.y) {
            session.selection.cursor_y = Some(coords.y);
            session.emit(EditorEvent::CursorCoordinates {
                x: coords.x,
                y: coords.y,
            });
        }
    }

    /// Read the surface selection into the session.
    ///
    /// Skipped while a newly selected file is pending. Returns true if the
    /// surface reported a resolvable selection.
    pub fn save_selection_state<S: Surface + ?Sized>(session: &mut Session, surface: &mut S) -> bool {
        if session.file_changed {
            return false;
        }
        let Some(selection) = surface.selection() else {
            return false;
        };
        let anchor = OffsetMapper::offset_of(surface, &selection.anchor);
        let focus = OffsetMapper::offset_of(surface, &selection.focus);
        let (Some(anchor), Some(focus)) = (anchor, focus) else {
            tracing::debug!(target: "folio::selection", ?selection, "surface selection does not resolve");
            return false;
        };
        tracing::trace!(target: "folio::selection", anchor, focus, "captured surface selection");
        Self::set_selection_start_end(session, surface, Some(anchor), Some(focus), true);
        true
    }

    /// Scroll so the caret keeps a margin from the top and bottom edges.
    ///
    /// The margin is half the viewport height, capped at `max_scroll_adjust`.
    /// Returns true if the surface scrolled.
    pub fn adjust_cursor_position<S: Surface + ?Sized>(
        session: &mut Session,
        surface: &mut S,
        config: &EditorConfig,
    ) -> bool {
        let Some(cursor_y) = session.selection.cursor_y else {
            return false;
        };
        let viewport = surface.viewport();
        let adjust = (viewport.height / 2.0).min(config.max_scroll_adjust);
        let min_y = viewport.scroll_top + adjust;
        let max_y = viewport.scroll_top + viewport.height - adjust;

        let scroll_top = if cursor_y < min_y {
            viewport.scroll_top + cursor_y - min_y
        } else if cursor_y > max_y {
            viewport.scroll_top + cursor_y - max_y
        } else {
            return false;
        };
        surface.set_scroll_top(scroll_top);
        let applied = surface.viewport().scroll_top;
        tracing::trace!(target: "folio::selection", cursor_y, scroll_top = applied, "keeping caret visible");
        if !session.file_changed {
            session.file.editor_scroll_top = applied;
        }
        applied != viewport.scroll_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileRecord;
    use crate::surface::MemorySurface;
    use crate::text::EditorRope;
    use crate::types::Viewport;

    fn setup(text: &str) -> (Session, MemorySurface) {
        let mut session = Session::new(FileRecord::new(text));
        session.document = EditorRope::from_str(text);
        session.file_changed = false;
        let mut surface = MemorySurface::new().with_metrics(20.0, 10.0);
        surface.set_text(text);
        (session, surface)
    }

    #[test]
    fn test_set_selection_clamps_orders_and_mirrors() {
        let (mut session, mut surface) = setup("hello\nworld\n");
        SelectionManager::set_selection_start_end(&mut session, &mut surface, Some(8), Some(2), false);
        let sel = session.selection();
        assert_eq!((sel.start, sel.end, sel.backwards), (2, 8, false));
        assert_eq!(surface.selection_offsets(), Some((2, 8)));
        assert_eq!((session.file.selection_start, session.file.selection_end), (2, 8));

        SelectionManager::set_selection_start_end(&mut session, &mut surface, Some(99), None, false);
        assert_eq!((session.selection().start, session.selection().end), (8, 12));
    }

    #[test]
    fn test_cursor_event_only_on_line_change() {
        let (mut session, mut surface) = setup("hello\nworld\n");
        SelectionManager::set_selection_start_end(&mut session, &mut surface, Some(1), Some(1), false);
        assert_eq!(session.drain_events().len(), 1);

        SelectionManager::set_selection_start_end(&mut session, &mut surface, Some(3), Some(3), false);
        assert!(session.drain_events().is_empty());

        SelectionManager::set_selection_start_end(&mut session, &mut surface, Some(7), Some(7), false);
        assert_eq!(
            session.drain_events(),
            vec![EditorEvent::CursorCoordinates { x: 15.0, y: 30.0 }]
        );
    }

    #[test]
    fn test_save_selection_detects_backwards() {
        let (mut session, mut surface) = setup("hello\nworld\n");
        surface.select(9, 4);
        assert!(SelectionManager::save_selection_state(&mut session, &mut surface));
        let sel = session.selection();
        assert_eq!((sel.start, sel.end, sel.backwards), (4, 9, true));
        assert_eq!(sel.focus(), 4);
    }

    #[test]
    fn test_save_selection_skipped_while_file_pending() {
        let (mut session, mut surface) = setup("abc\n");
        session.file_changed = true;
        surface.select(2, 2);
        assert!(!SelectionManager::save_selection_state(&mut session, &mut surface));
        assert_eq!(session.selection().end, 0);
    }

    #[test]
    fn test_adjust_scrolls_caret_into_view() {
        let text = "l\n".repeat(50);
        let (mut session, surface) = setup(&text);
        let mut surface = surface.with_viewport(Viewport {
            height: 200.0,
            ..Default::default()
        });
        let config = EditorConfig::default();

        // Line 20 center is y = 410; margin is min(100, 130) = 100.
        SelectionManager::set_selection_start_end(&mut session, &mut surface, Some(40), Some(40), false);
        assert!(SelectionManager::adjust_cursor_position(&mut session, &mut surface, &config));
        assert_eq!(surface.viewport().scroll_top, 310.0);
        assert_eq!(session.file.editor_scroll_top, 310.0);

        // Already inside the comfortable band.
        assert!(!SelectionManager::adjust_cursor_position(&mut session, &mut surface, &config));
    }
}
