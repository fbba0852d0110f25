//! The editing engine wired to a surface, a parser and a scheduler.
//!
//! [`Editor`] owns the [`Session`] and routes host events through the
//! components in order: capture the selection, commit the content change,
//! reconcile sections, then snapshot for undo on the next poll. Debounced work
//! is queued on a [`Scheduler`]; the host calls [`Editor::poll`] when
//! [`Editor::next_deadline`] passes.

use std::time::Duration;

use web_time::Instant;

use crate::actions::{ActionDispatcher, EditAction};
use crate::annotation::Annotation;
use crate::change::{ChangeDetector, ChangeOutcome};
use crate::config::EditorConfig;
use crate::error::ConfigError;
use crate::file::FileRecord;
use crate::keys::{Key, KeyInput, KeydownResult};
use crate::reconcile::{ReconcileReport, SectionReconciler};
use crate::render::{Highlighter, PreviewRenderer};
use crate::schedule::{Clock, Scheduler, SystemClock};
use crate::sections::{BlankLineSections, SectionParser};
use crate::selection::SelectionManager;
use crate::session::Session;
use crate::surface::Surface;
use crate::types::{EditMode, EditorEvent};
use crate::undo::UndoEngine;

/// Debounced work the editor defers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Task {
    /// Snapshot the session for undo.
    SaveUndoState,
    /// Record the pre-edit selection for the next undo snapshot.
    CaptureSelection,
    /// Scroll the caret back into the comfortable band.
    AdjustCursor,
    /// Re-render the preview.
    RefreshPreview,
}

/// Editing engine over a display surface.
pub struct Editor<S, P = BlankLineSections, H = (), R = (), C = SystemClock> {
    session: Session,
    surface: S,
    parser: P,
    highlighter: H,
    preview: R,
    clock: C,
    config: EditorConfig,
    scheduler: Scheduler<Task>,
    last_render: Duration,
}

impl<S: Surface> Editor<S> {
    /// Editor with the default parser, no highlighting and no preview.
    ///
    /// The config is validated first. The surface starts being observed
    /// immediately.
    pub fn new(mut surface: S, config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        surface.start_watching();
        Ok(Self {
            session: Session::with_undo_capacity(FileRecord::default(), config.undo_capacity),
            surface,
            parser: BlankLineSections,
            highlighter: (),
            preview: (),
            clock: SystemClock,
            config,
            scheduler: Scheduler::new(),
            last_render: Duration::ZERO,
        })
    }
}

impl<S, P, H, R, C> Editor<S, P, H, R, C> {
    pub fn with_parser<P2: SectionParser>(self, parser: P2) -> Editor<S, P2, H, R, C> {
        Editor {
            session: self.session,
            surface: self.surface,
            parser,
            highlighter: self.highlighter,
            preview: self.preview,
            clock: self.clock,
            config: self.config,
            scheduler: self.scheduler,
            last_render: self.last_render,
        }
    }

    pub fn with_highlighter<H2: Highlighter>(self, highlighter: H2) -> Editor<S, P, H2, R, C> {
        Editor {
            session: self.session,
            surface: self.surface,
            parser: self.parser,
            highlighter,
            preview: self.preview,
            clock: self.clock,
            config: self.config,
            scheduler: self.scheduler,
            last_render: self.last_render,
        }
    }

    pub fn with_preview<R2: PreviewRenderer>(self, preview: R2) -> Editor<S, P, H, R2, C> {
        Editor {
            session: self.session,
            surface: self.surface,
            parser: self.parser,
            highlighter: self.highlighter,
            preview,
            clock: self.clock,
            config: self.config,
            scheduler: self.scheduler,
            last_render: self.last_render,
        }
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> Editor<S, P, H, R, C2> {
        Editor {
            session: self.session,
            surface: self.surface,
            parser: self.parser,
            highlighter: self.highlighter,
            preview: self.preview,
            clock,
            config: self.config,
            scheduler: self.scheduler,
            last_render: self.last_render,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access for the host's own event plumbing (and tests simulating users).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn preview(&self) -> &R {
        &self.preview
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn file(&self) -> &FileRecord {
        self.session.file()
    }

    /// Canonical document text.
    pub fn content(&self) -> String {
        self.session.content()
    }

    pub fn can_undo(&self) -> bool {
        self.session.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.history().can_redo()
    }

    pub fn is_pending(&self, task: Task) -> bool {
        self.scheduler.is_pending(task)
    }

    /// When the host should next call [`Editor::poll`].
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Take all queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.session.drain_events()
    }
}

impl<S, P, H, R, C> Editor<S, P, H, R, C>
where
    S: Surface,
    P: SectionParser,
    H: Highlighter,
    R: PreviewRenderer,
    C: Clock,
{
    /// Replace the session with a newly selected file.
    ///
    /// The file's text is written to the surface and adopted as canonical,
    /// its stored selection and scroll offsets are restored, and every section
    /// is rendered from scratch.
    pub fn open_file(&mut self, file: FileRecord) {
        self.scheduler.clear();
        let pending = self.session.drain_events();
        self.session = Session::with_undo_capacity(file, self.config.undo_capacity);
        self.session.events = pending;
        UndoEngine::init(&mut self.session, &mut self.surface);
        self.surface.take_mutations();

        let outcome = ChangeDetector::check_content_change(&mut self.session, &self.surface);
        debug_assert_eq!(outcome, ChangeOutcome::Opened);

        let file = self.session.file();
        let (start, end) = (file.selection_start, file.selection_end);
        let (editor_scroll, preview_scroll) = (file.editor_scroll_top, file.preview_scroll_top);
        SelectionManager::set_selection_start_end(&mut self.session, &mut self.surface, Some(start), Some(end), false);
        let content = self.session.content();
        self.session.emit(EditorEvent::FileOpened { content });

        self.surface.set_scroll_top(editor_scroll);
        self.preview.scroll_to(preview_scroll);
        self.reconcile();
        self.refresh_preview();
        self.session.file_changed = false;
        tracing::debug!(
            target: "folio::events",
            len = self.session.len_chars(),
            sections = self.session.sections().len(),
            "file opened"
        );
    }

    /// Handle a batch of surface mutations.
    ///
    /// Any number of user edits may be folded into one batch; they are
    /// committed as one diff.
    pub fn on_mutations(&mut self) -> ChangeOutcome {
        let mutations = self.surface.take_mutations();
        if mutations.is_empty() {
            return ChangeOutcome::Unchanged;
        }
        tracing::trace!(target: "folio::change", count = mutations.len(), "surface mutations");
        self.check_content_change()
    }

    /// Commit whatever the surface currently shows.
    pub fn check_content_change(&mut self) -> ChangeOutcome {
        self.flush_capture();
        let outcome = ChangeDetector::check_content_change(&mut self.session, &self.surface);
        if let ChangeOutcome::Changed { .. } = outcome {
            SelectionManager::save_selection_state(&mut self.session, &mut self.surface);
            let now = self.clock.now();
            self.schedule_capture(now);
            self.scheduler.schedule(Task::SaveUndoState, now);
            self.reconcile();
            self.schedule_preview(now);
        }
        outcome
    }

    /// Route a key press.
    ///
    /// Tab indents (Shift+Tab outdents) and Enter breaks the line with list
    /// continuation; both are handled here and must not reach the surface.
    /// Everything else is left to the surface.
    pub fn on_key_down(&mut self, input: &KeyInput) -> KeydownResult {
        if input.key.is_modifier() {
            return KeydownResult::PassThrough;
        }
        // Edits the observer has not delivered yet belong before this key.
        self.on_mutations();
        let now = self.clock.now();
        SelectionManager::save_selection_state(&mut self.session, &mut self.surface);
        self.schedule_capture(now);

        let cmd = input.modifiers.cmd_or_ctrl();
        if !cmd {
            self.scheduler.schedule(Task::AdjustCursor, now);
        }
        if input.key != Key::Enter {
            self.session.clear_newline = false;
        }

        match input.key {
            Key::Tab if !cmd => {
                let action = if input.modifiers.shift {
                    EditAction::Outdent
                } else {
                    EditAction::Indent
                };
                self.apply_action(action);
                KeydownResult::Handled
            }
            Key::Enter => {
                self.apply_action(EditAction::Newline);
                KeydownResult::Handled
            }
            _ => KeydownResult::NotHandled,
        }
    }

    /// Apply a structured edit at the current selection.
    ///
    /// The edit is committed like typing and the selection is set to the
    /// transformed bounds. Returns false if the surface rejected the write.
    pub fn apply_action(&mut self, action: EditAction) -> bool {
        self.on_mutations();
        self.flush_capture();
        let state = ActionDispatcher::prepare(&mut self.session, action, &self.config);
        if !ActionDispatcher::write(&self.session, &mut self.surface, &state) {
            return false;
        }
        self.surface.take_mutations();
        self.check_content_change();
        SelectionManager::set_selection_start_end(
            &mut self.session,
            &mut self.surface,
            Some(state.selection_start),
            Some(state.selection_end),
            false,
        );
        true
    }

    /// Step back one undo entry. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.flush_task(Task::SaveUndoState);
        if !UndoEngine::undo(&mut self.session, &mut self.surface) {
            return false;
        }
        self.after_restore();
        true
    }

    /// Re-apply one undone entry. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.flush_task(Task::SaveUndoState);
        if !UndoEngine::redo(&mut self.session, &mut self.surface) {
            return false;
        }
        self.after_restore();
        true
    }

    pub fn on_paste(&mut self) {
        self.tag_pending(EditMode::Paste);
        self.scheduler.schedule(Task::AdjustCursor, self.clock.now());
    }

    pub fn on_cut(&mut self) {
        self.tag_pending(EditMode::Cut);
        self.scheduler.schedule(Task::AdjustCursor, self.clock.now());
    }

    pub fn on_mouse_up(&mut self) {
        SelectionManager::save_selection_state(&mut self.session, &mut self.surface);
        self.schedule_capture(self.clock.now());
    }

    /// Tag the next edit as toolbar-driven.
    pub fn set_command_mode(&mut self) {
        self.tag_pending(EditMode::Command);
    }

    /// Record an annotation change made by the host as its own undo step.
    ///
    /// Ignored while the surface is not being observed.
    pub fn on_annotations_edited(&mut self) {
        if !self.surface.is_watching() {
            return;
        }
        self.tag_pending(EditMode::Comment);
        self.scheduler.schedule(Task::SaveUndoState, self.clock.now());
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.session.file.annotations.push(annotation);
        self.on_annotations_edited();
    }

    pub fn remove_annotation(&mut self, id: &str) -> Option<Annotation> {
        let index = self.session.file.annotations.iter().position(|a| a.id == id)?;
        let removed = self.session.file.annotations.remove(index);
        self.on_annotations_edited();
        Some(removed)
    }

    /// Set the selection programmatically.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        SelectionManager::set_selection_start_end(&mut self.session, &mut self.surface, Some(start), Some(end), false);
    }

    pub fn on_layout_resize(&mut self) {
        self.scheduler.schedule(Task::AdjustCursor, self.clock.now());
    }

    pub fn on_editor_scroll(&mut self, scroll_top: f64) {
        if self.session.is_file_open() {
            self.session.file.editor_scroll_top = scroll_top;
        }
    }

    pub fn on_preview_scroll(&mut self, scroll_top: f64) {
        if self.session.is_file_open() {
            self.session.file.preview_scroll_top = scroll_top;
        }
    }

    /// Run every task that is due. Returns how many ran.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        while let Some(task) = self.scheduler.pop_due(now) {
            self.run(task);
            ran += 1;
        }
        ran
    }

    /// Run every pending task now, in deadline order. Returns how many ran.
    pub fn flush(&mut self) -> usize {
        let mut ran = 0;
        while let Some(at) = self.scheduler.next_deadline() {
            let Some(task) = self.scheduler.pop_due(at) else {
                break;
            };
            self.run(task);
            ran += 1;
        }
        ran
    }

    fn run(&mut self, task: Task) {
        tracing::trace!(target: "folio::schedule", ?task, "running task");
        match task {
            Task::SaveUndoState => {
                UndoEngine::save_state(&mut self.session, self.clock.now(), &self.config);
            }
            Task::CaptureSelection => UndoEngine::save_selection_state(&mut self.session),
            Task::AdjustCursor => {
                SelectionManager::save_selection_state(&mut self.session, &mut self.surface);
                self.schedule_capture(self.clock.now());
                SelectionManager::adjust_cursor_position(&mut self.session, &mut self.surface, &self.config);
            }
            Task::RefreshPreview => self.refresh_preview(),
        }
    }

    fn flush_task(&mut self, task: Task) {
        if self.scheduler.cancel(task) {
            self.run(task);
        }
    }

    /// A pending selection capture must land before an edit tags the mode.
    fn flush_capture(&mut self) {
        self.flush_task(Task::CaptureSelection);
    }

    fn tag_pending(&mut self, mode: EditMode) {
        self.flush_capture();
        self.session.mode = Some(mode);
    }

    fn schedule_capture(&mut self, now: Instant) {
        self.scheduler
            .schedule(Task::CaptureSelection, now + self.config.selection_capture_delay());
    }

    fn schedule_preview(&mut self, now: Instant) {
        let delay = if self.config.lazy_rendering {
            self.last_render.min(self.config.max_render_delay())
        } else {
            Duration::ZERO
        };
        self.scheduler.schedule(Task::RefreshPreview, now + delay);
    }

    fn refresh_preview(&mut self) {
        let started = self.clock.now();
        self.preview.refresh(&self.session.content());
        self.last_render = self.clock.now().saturating_duration_since(started);
        tracing::trace!(target: "folio::schedule", elapsed = ?self.last_render, "preview refreshed");
    }

    fn reconcile(&mut self) -> ReconcileReport {
        let text = self.session.content();
        let sections = self.parser.parse(&text);
        SectionReconciler::reconcile(&mut self.session, &mut self.surface, sections, &self.highlighter)
    }

    fn after_restore(&mut self) {
        self.session.clear_newline = false;
        self.reconcile();
        let now = self.clock.now();
        self.scheduler.schedule(Task::AdjustCursor, now);
        self.schedule_preview(now);
    }
}
