//! Mapping between linear document offsets and surface positions.

use crate::change::common_affixes;
use crate::error::SurfaceError;
use crate::surface::{Container, Position, Surface, SurfaceRange};
use crate::text::TextBuffer;
use crate::types::CaretCoordinates;

/// Converts document offsets to surface positions and back.
///
/// Stateless: every call walks the surface's text leaves in document order.
#[derive(Clone, Copy, Debug, Default)]
pub struct OffsetMapper;

impl OffsetMapper {
    /// Find the text leaf holding `offset`.
    ///
    /// An offset on a leaf boundary resolves to the start of the following
    /// leaf. Offsets at or past the end of the text resolve to the end of the
    /// content root.
    pub fn locate<S: Surface + ?Sized>(surface: &S, offset: usize) -> Position {
        let mut remaining = offset;
        for run in surface.text_nodes() {
            let len = run.text.chars().count();
            if len > remaining {
                return Position::text(run.node, remaining);
            }
            remaining -= len;
        }
        Position::root(surface.children().len())
    }

    /// Build a surface range from two offsets. A missing `end` collapses onto `start`.
    pub fn range_for<S: Surface + ?Sized>(surface: &S, start: usize, end: Option<usize>) -> SurfaceRange {
        let start_pos = Self::locate(surface, start);
        match end {
            Some(end) if end != start => SurfaceRange {
                start: start_pos,
                end: Self::locate(surface, end),
            },
            _ => SurfaceRange::collapsed(start_pos),
        }
    }

    /// Rewrite the surface from `old` to `new`, touching only the differing middle.
    ///
    /// `old` must be the text the surface currently reports.
    pub fn replace_changed<S: Surface + ?Sized>(surface: &mut S, old: &str, new: &str) -> Result<(), SurfaceError> {
        let (prefix, suffix) = common_affixes(old, new);
        let old_len = old.chars().count();
        let new_len = new.chars().count();
        if prefix + suffix == old_len && old_len == new_len {
            return Ok(());
        }
        let replacement: String = new.chars().skip(prefix).take(new_len - prefix - suffix).collect();
        let range = Self::range_for(surface, prefix, Some(old_len - suffix));
        surface.replace_range(&range, &replacement)
    }

    /// Document offset of a surface position, or None if its node is not attached.
    pub fn offset_of<S: Surface + ?Sized>(surface: &S, position: &Position) -> Option<usize> {
        match position.container {
            Container::Root => Some(
                surface
                    .children()
                    .into_iter()
                    .take(position.offset)
                    .filter_map(|child| surface.node_text(child))
                    .map(|text| text.chars().count())
                    .sum(),
            ),
            Container::Text(node) => {
                let mut acc = 0;
                for run in surface.text_nodes() {
                    let len = run.text.chars().count();
                    if run.node == node {
                        return Some(acc + position.offset.min(len));
                    }
                    acc += len;
                }
                None
            }
        }
    }

    /// Caret coordinates for `offset`, relative to the surface content.
    ///
    /// A caret sitting on a lone newline node has no glyph to measure, so the
    /// line box midpoint is used. Otherwise a one-char sample next to the caret
    /// is measured: backwards when the char at the caret is a newline or the
    /// end of the document, forwards otherwise.
    pub fn caret_coordinates<S, T>(surface: &S, document: &T, offset: usize) -> Option<CaretCoordinates>
    where
        S: Surface + ?Sized,
        T: TextBuffer + ?Sized,
    {
        let position = Self::locate(surface, offset);
        if let Container::Text(node) = position.container {
            if surface.node_text(node).as_deref() == Some("\n") {
                let line = surface.line_rect(node)?;
                return Some(CaretCoordinates {
                    x: line.left,
                    y: line.center_y(),
                });
            }
        }

        let (sample_start, sample_end) = match document.char_at(offset) {
            None | Some('\n') => (offset.saturating_sub(1), offset),
            Some(_) => (offset, offset + 1),
        };
        let range = SurfaceRange {
            start: Self::locate(surface, sample_start),
            end: Self::locate(surface, sample_end),
        };
        let rect = surface.range_rect(&range)?;
        let viewport = surface.viewport();
        Some(CaretCoordinates {
            x: rect.center_x() - viewport.offset_left,
            y: rect.center_y() - viewport.offset_top + viewport.scroll_top,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use crate::text::EditorRope;

    fn surface_with(sections: &[&str]) -> MemorySurface {
        let mut surface = MemorySurface::new().with_metrics(20.0, 10.0);
        for (i, markup) in sections.iter().enumerate() {
            let node = surface.create_section(&format!("s{i}"), markup);
            surface.insert_before(node, None).unwrap();
        }
        surface
    }

    #[test]
    fn test_locate_boundary_goes_to_next_leaf() {
        let surface = surface_with(&["ab\n", "cd\n"]);
        let runs = surface.text_nodes();
        assert_eq!(OffsetMapper::locate(&surface, 1), Position::text(runs[0].node, 1));
        assert_eq!(OffsetMapper::locate(&surface, 3), Position::text(runs[1].node, 0));
    }

    #[test]
    fn test_locate_past_end_falls_back_to_root() {
        let surface = surface_with(&["ab\n", "cd\n"]);
        assert_eq!(OffsetMapper::locate(&surface, 6), Position::root(2));
        assert_eq!(OffsetMapper::locate(&surface, 600), Position::root(2));
        assert_eq!(OffsetMapper::locate(&MemorySurface::new(), 3), Position::root(0));
    }

    #[test]
    fn test_offset_of_inverts_locate() {
        let surface = surface_with(&["<span class=\"h\"># a</span>\n", "b\n"]);
        for offset in 0..=6 {
            let position = OffsetMapper::locate(&surface, offset);
            assert_eq!(OffsetMapper::offset_of(&surface, &position), Some(offset));
        }
    }

    #[test]
    fn test_range_for_defaults_end_to_start() {
        let surface = surface_with(&["abc\n"]);
        let range = OffsetMapper::range_for(&surface, 2, None);
        assert_eq!(range.start, range.end);
        let range = OffsetMapper::range_for(&surface, 1, Some(3));
        assert_ne!(range.start, range.end);
    }

    #[test]
    fn test_replace_changed_touches_only_the_middle() {
        let mut surface = surface_with(&["ab\n", "cd\n"]);
        let first = surface.children()[0];
        OffsetMapper::replace_changed(&mut surface, "ab\ncd\n", "ab\ncXd\n").unwrap();
        assert_eq!(surface.text(), "ab\ncXd\n");
        assert_eq!(surface.node_text(first).as_deref(), Some("ab\n"));

        // Nothing to do.
        OffsetMapper::replace_changed(&mut surface, "ab\ncXd\n", "ab\ncXd\n").unwrap();
        assert_eq!(surface.text(), "ab\ncXd\n");
    }

    #[test]
    fn test_caret_coordinates_sample_forward_and_back() {
        let surface = surface_with(&["ab\n", "cd\n"]);
        let doc = EditorRope::from_str("ab\ncd\n");

        // Probe [0, 1) on line 0.
        let at_start = OffsetMapper::caret_coordinates(&surface, &doc, 0).unwrap();
        assert_eq!(at_start, CaretCoordinates { x: 5.0, y: 10.0 });

        // Char at 2 is a newline, so sample [1, 2).
        let before_newline = OffsetMapper::caret_coordinates(&surface, &doc, 2).unwrap();
        assert_eq!(before_newline, CaretCoordinates { x: 15.0, y: 10.0 });

        // Second line.
        let second = OffsetMapper::caret_coordinates(&surface, &doc, 4).unwrap();
        assert_eq!(second.y, 30.0);
    }

    #[test]
    fn test_caret_coordinates_on_lone_newline_uses_line_box() {
        let surface = surface_with(&["a\n", "<span class=\"token lf\">\n</span>b\n"]);
        let doc = EditorRope::from_str("a\n\nb\n");
        let coords = OffsetMapper::caret_coordinates(&surface, &doc, 2).unwrap();
        assert_eq!(coords, CaretCoordinates { x: 0.0, y: 30.0 });
    }
}
