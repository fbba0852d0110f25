//! The externally persisted file record the engine reads and writes.

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;

/// State of one open file, shared with the persistence layer.
///
/// The engine mutates these fields while editing but never saves them itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileRecord {
    pub content: String,
    pub selection_start: usize,
    pub selection_end: usize,
    pub editor_scroll_top: f64,
    pub preview_scroll_top: f64,
    pub annotations: Vec<Annotation>,
    /// Discussion being drafted; tracks edits but is not part of undo snapshots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_annotation: Option<Annotation>,
}

impl FileRecord {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.selection_start = start;
        self.selection_end = end;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip_uses_camel_case() {
        let record = FileRecord::new("# Title\n")
            .with_selection(2, 7)
            .with_annotation(Annotation::new("d1", 2, 7));
        let json = record.to_json().unwrap();
        assert!(json.contains("\"selectionStart\":2"));
        assert!(json.contains("\"editorScrollTop\""));
        assert!(!json.contains("pendingAnnotation"));
        assert_eq!(FileRecord::from_json(&json).unwrap(), record);
    }

    #[test]
    fn test_missing_fields_default() {
        let record = FileRecord::from_json(r#"{"content":"x\n"}"#).unwrap();
        assert_eq!(record.content, "x\n");
        assert!(record.annotations.is_empty());
        assert_eq!(record.selection_end, 0);
    }
}
