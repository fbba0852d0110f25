// Scenario tests for the edit path: surface edits in, canonical text and
// surface structure out.

mod common;

use std::collections::HashSet;

use common::{open, type_at};
use folio_editor_core::{Annotation, EditorEvent, FileRecord, Key, KeyInput, KeydownResult, Surface};

#[test]
fn test_surface_and_document_stay_in_step() {
    let (mut editor, _clock) = open(FileRecord::new("# Title\n\nBody text\n"));

    type_at(&mut editor, 0, "x");
    assert_eq!(editor.content(), editor.surface().text());

    // Two keystrokes folded into one observer batch.
    editor.surface_mut().select(10, 10);
    editor.surface_mut().type_text("a");
    editor.surface_mut().type_text("b");
    editor.on_mutations();
    assert_eq!(editor.content(), "x# Title\n\nabBody text\n");
    assert_eq!(editor.content(), editor.surface().text());

    editor.surface_mut().select(3, 3);
    editor.surface_mut().delete_backward();
    editor.on_mutations();
    assert_eq!(editor.content(), "x#Title\n\nabBody text\n");
    assert_eq!(editor.content(), editor.surface().text());

    // A blank line splits a section.
    type_at(&mut editor, 7, "\n\nmore");
    assert_eq!(editor.content(), editor.surface().text());
    assert_eq!(editor.session().sections().len(), 3);
}

#[test]
fn test_annotation_follows_insert_before_it() {
    let file = FileRecord::new("# Title\n").with_annotation(Annotation::new("c1", 2, 7));
    let (mut editor, _clock) = open(file);

    type_at(&mut editor, 2, "Hello ");
    assert_eq!(editor.content(), "# Hello Title\n");
    let annotation = &editor.file().annotations[0];
    assert_eq!((annotation.selection_start, annotation.selection_end), (8, 13));

    let events = editor.drain_events();
    assert!(events.contains(&EditorEvent::AnnotationsChanged));
    assert!(events.contains(&EditorEvent::ContentChanged {
        content: "# Hello Title\n".into()
    }));
}

#[test]
fn test_annotation_untouched_by_edit_after_it() {
    let file = FileRecord::new("# Title\n").with_annotation(Annotation::new("c1", 2, 7));
    let (mut editor, _clock) = open(file);

    type_at(&mut editor, 8, "more\n");
    assert_eq!(editor.file().annotations[0].range(), 2..7);
    assert!(!editor.drain_events().contains(&EditorEvent::AnnotationsChanged));
}

#[test]
fn test_interior_edit_keeps_other_section_nodes() {
    let (mut editor, _clock) = open(FileRecord::new("# A\n\nalpha\n\n# B\n\nbeta\n"));
    let before: Vec<_> = editor.session().sections().iter().map(|s| s.node).collect();
    assert_eq!(before.len(), 4);

    type_at(&mut editor, 7, "X");
    assert_eq!(editor.content(), "# A\n\nalXpha\n\n# B\n\nbeta\n");

    let after: Vec<_> = editor.session().sections().iter().map(|s| s.node).collect();
    assert_eq!(after[0], before[0]);
    assert_ne!(after[1], before[1]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[3], before[3]);
}

#[test]
fn test_pasted_foreign_node_is_adopted_then_purged() {
    let (mut editor, _clock) = open(FileRecord::new("a\n\nb\n"));
    let stray = editor.surface_mut().inject_foreign_text(1, "junk\n");

    editor.on_mutations();
    assert_eq!(editor.content(), "a\njunk\n\nb\n");
    assert!(!editor.surface().is_attached(stray));

    let children = editor.surface().children();
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|c| editor.surface().is_generated(*c)));
    assert_eq!(editor.surface().text(), editor.content());
    insta::assert_snapshot!(editor.surface().dump().trim_end(), @r#"
    <folio-section-2> "a\njunk\n"
    <folio-section-1> token lf:"\n" "b\n"
    "#);
}

#[test]
fn test_engine_writes_are_not_observed() {
    let (mut editor, _clock) = open(FileRecord::new("a\n\nb\n"));
    type_at(&mut editor, 1, "z");
    assert!(editor.surface().is_watching());
    assert!(editor.surface_mut().take_mutations().is_empty());

    editor.flush();
    assert!(editor.undo());
    assert!(editor.surface().is_watching());
    assert!(editor.surface_mut().take_mutations().is_empty());
}

#[test]
fn test_smart_newline_continues_and_collapses() {
    let (mut editor, _clock) = open(FileRecord::new("- item\n"));
    editor.surface_mut().select(6, 6);

    editor.on_key_down(&KeyInput::new(Key::Enter));
    assert_eq!(editor.content(), "- item\n- \n");
    assert!(editor.session().is_continuation_armed());
    assert_eq!(editor.surface().selection_offsets(), Some((9, 9)));

    editor.on_key_down(&KeyInput::new(Key::Enter));
    assert_eq!(editor.content(), "- item\n\n");
    assert!(!editor.session().is_continuation_armed());
    assert_eq!(editor.surface().selection_offsets(), Some((7, 7)));
    assert_eq!(editor.surface().text(), editor.content());
}

#[test]
fn test_ordered_list_numbers_continue() {
    let (mut editor, _clock) = open(FileRecord::new("1. one\n"));
    editor.surface_mut().select(6, 6);
    editor.on_key_down(&KeyInput::new(Key::Enter));
    type_at(&mut editor, 10, "two");
    assert_eq!(editor.content(), "1. one\n2. two\n");
}

#[test]
fn test_opening_a_file() {
    let file = FileRecord::new("first\n").with_selection(1, 3);
    let (mut editor, _clock) = open(file);
    type_at(&mut editor, 5, "!");
    editor.flush();
    assert!(editor.can_undo());
    editor.drain_events();

    editor.open_file(FileRecord::new("second\n\nfile"));
    let events = editor.drain_events();
    assert!(events.contains(&EditorEvent::FileOpened {
        content: "second\n\nfile\n".into()
    }));
    assert!(!events.iter().any(|e| matches!(e, EditorEvent::ContentChanged { .. })));

    assert!(!editor.can_undo());
    assert!(editor.session().is_file_open());
    assert_eq!(editor.content(), "second\n\nfile\n");
    assert_eq!(editor.surface().text(), "second\n\nfile\n");
    assert_eq!(editor.session().sections().len(), 2);
    assert!(editor.next_deadline().is_none());
}

#[test]
fn test_split_section_gets_its_own_dom_ids() {
    let (mut editor, _clock) = open(FileRecord::new("a\n\nb\n\nc\n"));
    type_at(&mut editor, 1, "\n\nz");
    assert_eq!(editor.content(), "a\n\nz\n\nb\n\nc\n");

    let surface = editor.surface();
    let dom_ids: Vec<&str> = surface.children().into_iter().filter_map(|c| surface.dom_id(c)).collect();
    let unique: HashSet<&str> = dom_ids.iter().copied().collect();
    assert_eq!(dom_ids.len(), 4);
    assert_eq!(unique.len(), dom_ids.len(), "{dom_ids:?}");

    let ids: HashSet<u64> = editor.session().sections().iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_enter_commits_undelivered_typing_first() {
    let (mut editor, _clock) = open(FileRecord::new("- a\n"));
    editor.surface_mut().select(3, 3);
    // The observer has not reported this batch yet.
    editor.surface_mut().type_text("bc");

    assert_eq!(editor.on_key_down(&KeyInput::new(Key::Enter)), KeydownResult::Handled);
    editor.on_mutations();
    assert_eq!(editor.content(), "- abc\n- \n");
    assert_eq!(editor.surface().text(), editor.content());
    assert_eq!(editor.surface().selection_offsets(), Some((9, 9)));
}
