//! Structured edit actions.
//!
//! Actions are pure transforms over an [`EditState`] sliced from the canonical
//! text at the selection bounds. The caller writes the result back through the
//! surface so it is committed like any user edit.

use std::ops::Range;

use crate::config::EditorConfig;
use crate::offset::OffsetMapper;
use crate::session::Session;
use crate::surface::Surface;
use crate::text::{EditorRope, TextBuffer};
use crate::types::EditMode;

/// Text around the selection, plus the selection bounds, all in chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub selection_start: usize,
    pub selection_end: usize,
    pub before: String,
    pub selection: String,
    pub after: String,
}

impl EditState {
    /// Slice `text` at the given bounds. Bounds are ordered and clamped.
    pub fn new(text: &str, start: usize, end: usize) -> Self {
        Self::from_buffer(&EditorRope::from_str(text), start, end)
    }

    pub fn from_buffer<T: TextBuffer + ?Sized>(buffer: &T, start: usize, end: usize) -> Self {
        let len = buffer.len_chars();
        let (start, end) = (start.min(end).min(len), start.max(end).min(len));
        let slice = |range: Range<usize>| buffer.slice(range).map(|s| s.to_string()).unwrap_or_default();
        Self {
            selection_start: start,
            selection_end: end,
            before: slice(0..start),
            selection: slice(start..end),
            after: slice(end..len),
        }
    }

    /// The full replacement text.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.before.len() + self.selection.len() + self.after.len());
        out.push_str(&self.before);
        out.push_str(&self.selection);
        out.push_str(&self.after);
        out
    }

    /// Char offset where the caret's line starts within `before`.
    fn line_start(&self) -> usize {
        self.before
            .rfind('\n')
            .map_or(0, |i| self.before[..i].chars().count() + 1)
    }

    fn line_start_byte(&self) -> usize {
        self.before.rfind('\n').map_or(0, |i| i + 1)
    }
}

/// Structured edits the dispatcher applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Indent,
    Outdent,
    Newline,
}

/// Insert one indent unit.
///
/// With a selection, the unit goes at the start of the first selected line and
/// after every line break inside the selection, and the selection grows to
/// cover the inserted text. Without one, the unit goes at the caret.
pub fn indent(state: &mut EditState, unit: &str) {
    let unit_len = unit.chars().count();
    if state.selection.is_empty() {
        state.before.push_str(unit);
        state.selection_start += unit_len;
        state.selection_end += unit_len;
        return;
    }

    let lf = state.line_start_byte();
    state.before.insert_str(lf, unit);

    let mut indented = String::with_capacity(state.selection.len());
    let mut chars = state.selection.chars().peekable();
    while let Some(ch) = chars.next() {
        indented.push(ch);
        if ch == '\n' && chars.peek().is_some() {
            indented.push_str(unit);
        }
    }
    state.selection = indented;
    state.selection_start += unit_len;
    state.selection_end = state.selection_start + state.selection.chars().count();
}

/// Remove one level of indentation.
///
/// One whitespace char is removed from the start of the caret's line, and one
/// leading space or tab from every line inside the selection.
pub fn outdent(state: &mut EditState) {
    let lf = state.line_start_byte();
    if state.before[lf..].chars().next().is_some_and(char::is_whitespace) {
        let width = state.before[lf..].chars().next().map_or(0, char::len_utf8);
        state.before.replace_range(lf..lf + width, "");
        state.selection_start = state.selection_start.saturating_sub(1);
        state.selection_end = state.selection_end.saturating_sub(1);
    }

    state.selection = state
        .selection
        .split_inclusive('\n')
        .map(|line| line.strip_prefix([' ', '\t']).unwrap_or(line))
        .collect();
    state.selection_end = state.selection_start + state.selection.chars().count();
}

/// Prefix that continues the structure of `line` on the next line, if any.
///
/// Blockquote markers, list markers and plain leading whitespace continue.
/// Ordered list numbers are incremented.
pub fn continuation_prefix(line: &str) -> Option<String> {
    blockquote_prefix(line)
        .or_else(|| list_prefix(line))
        .or_else(|| {
            let ws: String = line.chars().take_while(|c| c.is_whitespace()).collect();
            (!ws.is_empty()).then_some(ws)
        })
}

/// Up to three spaces, `>`, then any spaces.
fn blockquote_prefix(line: &str) -> Option<String> {
    let spaces = line.chars().take_while(|&c| c == ' ').count();
    if spaces > 3 || line[spaces..].chars().next() != Some('>') {
        return None;
    }
    let rest = &line[spaces + 1..];
    let trailing = rest.chars().take_while(|&c| c == ' ').count();
    Some(line[..spaces + 1 + trailing].to_owned())
}

/// Spaces or tabs, a `*`/`+`/`-` bullet or `N.`, then one space or tab.
fn list_prefix(line: &str) -> Option<String> {
    let indent_len = line.chars().take_while(|&c| c == ' ' || c == '\t').count();
    let (indent, rest) = line.split_at(indent_len);

    let (marker, rest) = match rest.chars().next()? {
        c @ ('*' | '+' | '-') => (c.to_string(), &rest[1..]),
        c if c.is_ascii_digit() => {
            let digits_len = rest.chars().take_while(char::is_ascii_digit).count();
            let (digits, after) = rest.split_at(digits_len);
            let after = after.strip_prefix('.')?;
            let next = digits
                .parse::<u64>()
                .ok()
                .and_then(|n| n.checked_add(1))
                .map_or_else(|| digits.to_owned(), |n| n.to_string());
            (format!("{next}."), after)
        }
        _ => return None,
    };

    let gap = rest.chars().next().filter(|&c| c == ' ' || c == '\t')?;
    Some(format!("{indent}{marker}{gap}"))
}

/// Break the line, continuing list or quote structure.
///
/// `clear_continuation` is the one-shot flag armed by a previous newline that
/// inserted a prefix. When it is set the prefix on the (now empty) line is
/// dropped instead. Returns the new flag value.
pub fn newline(state: &mut EditState, clear_continuation: bool) -> bool {
    let lf_chars = state.line_start();
    let lf = state.line_start_byte();

    if clear_continuation {
        state.before.truncate(lf);
        state.selection.clear();
        state.selection_start = lf_chars;
        state.selection_end = lf_chars;
        return false;
    }

    let prefix = continuation_prefix(&state.before[lf..]).unwrap_or_default();
    let armed = !prefix.is_empty();
    state.before.push('\n');
    state.before.push_str(&prefix);
    state.selection.clear();
    state.selection_start += prefix.chars().count() + 1;
    state.selection_end = state.selection_start;
    armed
}

/// Runs structured edits against a session and writes them to the surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionDispatcher;

impl ActionDispatcher {
    /// Transform the session's text at its selection.
    ///
    /// Newline updates the continuation flag and tags the pending edit as
    /// [`EditMode::Newlines`]. Nothing is committed yet.
    pub fn prepare(session: &mut Session, action: EditAction, config: &EditorConfig) -> EditState {
        let selection = session.selection;
        let mut state = EditState::from_buffer(&session.document, selection.start, selection.end);
        match action {
            EditAction::Indent => indent(&mut state, &config.indent_unit),
            EditAction::Outdent => outdent(&mut state),
            EditAction::Newline => {
                session.clear_newline = newline(&mut state, session.clear_newline);
                session.mode = Some(EditMode::Newlines);
            }
        }
        tracing::debug!(
            target: "folio::actions",
            ?action,
            start = state.selection_start,
            end = state.selection_end,
            continuation = session.clear_newline,
            "prepared edit"
        );
        state
    }

    /// Write a prepared edit to the surface and select its bounds.
    ///
    /// The write is left observable so it is committed through the same
    /// content check as typing. Returns false if the surface rejected it.
    pub fn write<S: Surface + ?Sized>(session: &Session, surface: &mut S, state: &EditState) -> bool {
        let old = session.content();
        if let Err(error) = OffsetMapper::replace_changed(surface, &old, &state.text()) {
            tracing::warn!(target: "folio::actions", %error, "surface rejected edit");
            return false;
        }
        let range = OffsetMapper::range_for(surface, state.selection_start, Some(state.selection_end));
        surface.set_selection(&range);
        true
    }
}
