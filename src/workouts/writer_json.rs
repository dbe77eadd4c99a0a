//! JSON workout writer.

use crate::workouts::types::{ExportError, WorkoutDocument};

/// Render a document as pretty-printed JSON.
pub fn write_json(document: &WorkoutDocument) -> Result<String, ExportError> {
    serde_json::to_string_pretty(document).map_err(|e| ExportError::SerializeError(e.to_string()))
}

/// Read a document back from JSON.
pub fn read_json(content: &str) -> Result<WorkoutDocument, ExportError> {
    serde_json::from_str(content).map_err(|e| ExportError::SerializeError(e.to_string()))
}
