//! Detecting surface edits and committing them to the canonical document.
//!
//! The surface may batch any number of keystrokes into one observation, so
//! every check is a single diff of the whole reported text against the
//! canonical text.

use crate::annotation::Annotation;
use crate::session::Session;
use crate::surface::Surface;
use crate::text::{EditorRope, TextBuffer};
use crate::types::{EditMode, EditorEvent};

/// One step of a text diff. Text is carried so windows can be measured in chars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffOp {
    Equal(String),
    Delete(String),
    Insert(String),
}

impl DiffOp {
    pub fn text(&self) -> &str {
        match self {
            DiffOp::Equal(t) | DiffOp::Delete(t) | DiffOp::Insert(t) => t,
        }
    }

    fn char_len(&self) -> usize {
        self.text().chars().count()
    }
}

/// Prefix/suffix-trimmed diff. The changed middle is reported as a deletion
/// followed by an insertion.
pub fn diff(old: &str, new: &str) -> Vec<DiffOp> {
    let (prefix, suffix) = common_affixes(old, new);
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let mut ops = Vec::with_capacity(4);
    let mut push = |op: DiffOp| {
        if !op.text().is_empty() {
            ops.push(op);
        }
    };
    push(DiffOp::Equal(old_chars[..prefix].iter().collect()));
    push(DiffOp::Delete(old_chars[prefix..old_chars.len() - suffix].iter().collect()));
    push(DiffOp::Insert(new_chars[prefix..new_chars.len() - suffix].iter().collect()));
    push(DiffOp::Equal(old_chars[old_chars.len() - suffix..].iter().collect()));
    ops
}

/// Lengths in chars of the common prefix and the common suffix.
///
/// The suffix never overlaps the prefix in either string.
pub fn common_affixes(old: &str, new: &str) -> (usize, usize) {
    let prefix = old
        .chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let old_len = old.chars().count();
    let new_len = new.chars().count();
    let max_suffix = (old_len - prefix).min(new_len - prefix);
    let suffix = old
        .chars()
        .rev()
        .zip(new.chars().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    (prefix, suffix)
}

/// Append a newline if the text does not already end with one.
pub fn normalize_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Move annotation endpoints through a diff. Returns true if any endpoint moved.
///
/// Windows are tracked in post-edit coordinates as the ops are walked, so
/// each op sees the annotations already shifted by the ones before it.
pub fn shift_annotations<'a>(
    ops: &[DiffOp],
    annotations: impl IntoIterator<Item = &'a mut Annotation>,
) -> bool {
    let mut annotations: Vec<&mut Annotation> = annotations.into_iter().collect();
    let mut moved = false;
    let mut pos = 0usize;
    for op in ops {
        let len = op.char_len();
        let (window, delta) = match op {
            DiffOp::Equal(_) => {
                pos += len;
                continue;
            }
            DiffOp::Delete(_) => (pos..pos + len, -(len as isize)),
            DiffOp::Insert(_) => {
                let window = pos..pos;
                pos += len;
                (window, len as isize)
            }
        };
        tracing::trace!(target: "folio::change", ?window, delta, "shifting annotations");
        for annotation in annotations.iter_mut() {
            moved |= annotation.shift(window.clone(), delta);
        }
    }
    moved
}

/// Apply diff ops to a buffer holding the old text.
pub fn apply_ops<T: TextBuffer + ?Sized>(buffer: &mut T, ops: &[DiffOp]) {
    let mut pos = 0;
    for op in ops {
        let len = op.char_len();
        match op {
            DiffOp::Equal(_) => pos += len,
            DiffOp::Delete(_) => buffer.delete(pos..pos + len),
            DiffOp::Insert(text) => {
                buffer.insert(pos, text);
                pos += len;
            }
        }
    }
}

/// Result of one content check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Reported text matches the canonical document.
    Unchanged,
    /// A newly selected file's text was adopted as canonical.
    Opened,
    /// An edit was committed.
    Changed { annotations_moved: bool },
}

/// Commits surface edits to the session.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    /// Compare the surface's text with the canonical document and commit any edit.
    ///
    /// While a file change is pending, the reported text is adopted wholesale
    /// instead of diffed.
    pub fn check_content_change<S: Surface + ?Sized>(session: &mut Session, surface: &S) -> ChangeOutcome {
        let reported = normalize_trailing_newline(surface.text());

        if session.file_changed {
            session.document = EditorRope::from_str(&reported);
            session.file.content = reported;
            return ChangeOutcome::Opened;
        }

        let old = session.document.to_string();
        if old == reported {
            return ChangeOutcome::Unchanged;
        }

        let mode = *session.mode.get_or_insert(EditMode::Typing);
        let ops = diff(&old, &reported);
        if tracing::enabled!(target: "folio::change", tracing::Level::TRACE) {
            tracing::trace!(target: "folio::change", %mode, ?ops, "committing edit");
        }

        let len = reported.chars().count();
        apply_ops(&mut session.document, &ops);
        session.file.content = reported.clone();

        let file = &mut session.file;
        let mut moved = shift_annotations(
            &ops,
            file.annotations.iter_mut().chain(file.pending_annotation.iter_mut()),
        );
        for annotation in file.annotations.iter_mut().chain(file.pending_annotation.iter_mut()) {
            moved |= annotation.clamp(len);
        }

        tracing::debug!(target: "folio::change", %mode, len, annotations_moved = moved, "content changed");
        session.emit(EditorEvent::ContentChanged { content: reported });
        if moved {
            session.emit(EditorEvent::AnnotationsChanged);
        }
        ChangeOutcome::Changed {
            annotations_moved: moved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileRecord;
    use crate::surface::MemorySurface;

    #[test]
    fn test_diff_insert() {
        assert_eq!(
            diff("# Title\n", "# Hello Title\n"),
            vec![
                DiffOp::Equal("# ".into()),
                DiffOp::Insert("Hello ".into()),
                DiffOp::Equal("Title\n".into()),
            ]
        );
    }

    #[test]
    fn test_diff_replace_is_delete_then_insert() {
        assert_eq!(
            diff("abcd\n", "aXd\n"),
            vec![
                DiffOp::Equal("a".into()),
                DiffOp::Delete("bc".into()),
                DiffOp::Insert("X".into()),
                DiffOp::Equal("d\n".into()),
            ]
        );
        assert!(diff("same\n", "same\n").iter().all(|op| matches!(op, DiffOp::Equal(_))));
    }

    #[test]
    fn test_apply_ops_edits_in_place() {
        let mut rope = EditorRope::from_str("abcdef\n");
        apply_ops(&mut rope, &diff("abcdef\n", "aXdef\n"));
        assert_eq!(rope.to_string(), "aXdef\n");
    }

    #[test]
    fn test_affixes_do_not_overlap() {
        // "aa" -> "aaa": prefix eats both, suffix limited to what is left.
        assert_eq!(common_affixes("aa", "aaa"), (2, 0));
        assert_eq!(common_affixes("xay", "xy"), (1, 1));
        assert_eq!(common_affixes("héllo", "hello"), (1, 3));
    }

    #[test]
    fn test_shift_through_insert() {
        let mut a = Annotation::new("a", 2, 7);
        let ops = diff("# Title\n", "# Hello Title\n");
        assert!(shift_annotations(&ops, [&mut a]));
        assert_eq!(a.range(), 8..13);
    }

    #[test]
    fn test_shift_through_replace() {
        // Delete "bc" at [1, 3), then insert "X" at 1.
        let ops = diff("abcdef\n", "aXdef\n");
        let mut after = Annotation::new("after", 3, 5);
        let mut inside = Annotation::new("inside", 2, 2);
        let mut touching = Annotation::new("touching", 0, 1);
        let mut untouched = Annotation::new("untouched", 0, 0);
        assert!(shift_annotations(
            &ops,
            [&mut after, &mut inside, &mut touching, &mut untouched]
        ));
        assert_eq!(after.range(), 2..4);
        // Clamped to the deletion point, then pushed by the insertion there.
        assert_eq!(inside.range(), 2..2);
        assert_eq!(touching.range(), 0..2);
        assert_eq!(untouched.range(), 0..0);
    }

    fn open_session(content: &str) -> Session {
        let mut session = Session::new(FileRecord::new(content));
        session.document = EditorRope::from_str(content);
        session.file_changed = false;
        session
    }

    fn plain_surface(text: &str) -> MemorySurface {
        let mut surface = MemorySurface::new();
        surface.set_text(text);
        surface
    }

    #[test]
    fn test_unchanged_after_normalizing_newline() {
        let mut session = open_session("abc\n");
        let outcome = ChangeDetector::check_content_change(&mut session, &plain_surface("abc"));
        assert_eq!(outcome, ChangeOutcome::Unchanged);
        assert_eq!(session.mode, None);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_commit_tags_typing_and_shifts() {
        let mut session = open_session("# Title\n");
        session.file.annotations.push(Annotation::new("d1", 2, 7));
        session.file.pending_annotation = Some(Annotation::new("new", 7, 7));

        let outcome = ChangeDetector::check_content_change(&mut session, &plain_surface("# Hello Title\n"));
        assert_eq!(outcome, ChangeOutcome::Changed { annotations_moved: true });
        assert_eq!(session.content(), "# Hello Title\n");
        assert_eq!(session.file.content, "# Hello Title\n");
        assert_eq!(session.mode, Some(EditMode::Typing));
        assert_eq!(session.file.annotations[0].range(), 8..13);
        assert_eq!(session.file.pending_annotation.as_ref().map(|a| a.range()), Some(13..13));
        assert_eq!(
            session.drain_events(),
            vec![
                EditorEvent::ContentChanged {
                    content: "# Hello Title\n".into()
                },
                EditorEvent::AnnotationsChanged,
            ]
        );
    }

    #[test]
    fn test_specific_mode_is_kept() {
        let mut session = open_session("a\n");
        session.mode = Some(EditMode::Paste);
        ChangeDetector::check_content_change(&mut session, &plain_surface("a pasted\n"));
        assert_eq!(session.mode, Some(EditMode::Paste));
    }

    #[test]
    fn test_annotations_clamped_into_document() {
        let mut session = open_session("abcdef\n");
        session.file.annotations.push(Annotation::new("d1", 3, 40));
        let outcome = ChangeDetector::check_content_change(&mut session, &plain_surface("abc\n"));
        assert_eq!(outcome, ChangeOutcome::Changed { annotations_moved: true });
        assert_eq!(session.file.annotations[0].range(), 3..4);
    }

    #[test]
    fn test_pending_file_change_adopts_text() {
        let mut session = Session::new(FileRecord::new("stale\n"));
        let outcome = ChangeDetector::check_content_change(&mut session, &plain_surface("fresh"));
        assert_eq!(outcome, ChangeOutcome::Opened);
        assert_eq!(session.content(), "fresh\n");
        assert_eq!(session.file.content, "fresh\n");
    }
}
