// Shared helpers for the scenario tests.

#![allow(dead_code)]

use std::sync::Once;

use folio_editor_core::{BlankLineSections, Editor, EditorConfig, FileRecord, KeyInput, ManualClock, MemorySurface};

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per binary. `RUST_LOG` overrides the filter.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("folio=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub type TestEditor = Editor<MemorySurface, BlankLineSections, (), (), ManualClock>;

/// Editor on a headless surface with a manual clock, with `file` open and events drained.
pub fn open(file: FileRecord) -> (TestEditor, ManualClock) {
    init_tracing();
    let clock = ManualClock::new();
    let mut editor = Editor::new(MemorySurface::new(), EditorConfig::default())
        .expect("default config is valid")
        .with_clock(clock.clone());
    editor.open_file(file);
    editor.drain_events();
    (editor, clock)
}

/// Place the caret, press a key and type `text`, committed as one observer callback.
pub fn type_at(editor: &mut TestEditor, at: usize, text: &str) {
    editor.surface_mut().select(at, at);
    editor.on_key_down(&KeyInput::character("k"));
    editor.surface_mut().type_text(text);
    editor.on_mutations();
}
