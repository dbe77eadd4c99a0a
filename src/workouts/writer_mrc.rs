//! MRC/ERG course file writer.
//!
//! MRC has no repeat or band construct, so it is always written from the
//! flat timeline: two course points (start, end) per segment.

use std::io::Write;

use crate::workouts::types::{ExportError, Segment, WorkoutDocument};

/// Render a document as an MRC course file.
pub fn write_mrc(document: &WorkoutDocument) -> Result<String, ExportError> {
    let mut output = Vec::new();

    let description = document
        .description
        .as_deref()
        .unwrap_or_default()
        .replace(['\r', '\n'], " ");

    writeln!(output, "[COURSE HEADER]").map_err(write_failed)?;
    writeln!(output, "VERSION = 2").map_err(write_failed)?;
    writeln!(output, "UNITS = ENGLISH").map_err(write_failed)?;
    writeln!(output, "DESCRIPTION = {description}").map_err(write_failed)?;
    writeln!(output, "FILE NAME = {}", document.name).map_err(write_failed)?;
    writeln!(output, "MINUTES PERCENT").map_err(write_failed)?;
    writeln!(output, "[END COURSE HEADER]").map_err(write_failed)?;

    writeln!(output, "[COURSE DATA]").map_err(write_failed)?;
    let mut elapsed_seconds = 0u32;
    let mut text_events = Vec::new();
    for segment in &document.segments {
        if let Some(label) = segment_label(segment) {
            text_events.push((elapsed_seconds, label.to_string()));
        }
        for entry in segment.expand() {
            let end_seconds = elapsed_seconds.saturating_add(entry.duration_seconds);
            writeln!(
                output,
                "{:.2}\t{:.0}",
                minutes(elapsed_seconds),
                entry.power_start * 100.0
            )
            .map_err(write_failed)?;
            writeln!(
                output,
                "{:.2}\t{:.0}",
                minutes(end_seconds),
                entry.power_end * 100.0
            )
            .map_err(write_failed)?;
            elapsed_seconds = end_seconds;
        }
    }
    writeln!(output, "[END COURSE DATA]").map_err(write_failed)?;

    if !text_events.is_empty() {
        writeln!(output, "[COURSE TEXT]").map_err(write_failed)?;
        for (at_seconds, text) in text_events {
            writeln!(output, "{:.2}\t\"{}\"", minutes(at_seconds), text).map_err(write_failed)?;
        }
        writeln!(output, "[END COURSE TEXT]").map_err(write_failed)?;
    }

    String::from_utf8(output).map_err(|e| ExportError::WriteFailed(e.to_string()))
}

fn segment_label(segment: &Segment) -> Option<&str> {
    match segment {
        Segment::SteadyState { label, .. } | Segment::Range { label, .. } => label.as_deref(),
        Segment::Warmup { .. } => Some("Warm up"),
        Segment::Cooldown { .. } => Some("Cool down"),
        Segment::Intervals { .. } => None,
    }
}

fn minutes(seconds: u32) -> f64 {
    f64::from(seconds) / 60.0
}

fn write_failed(e: std::io::Error) -> ExportError {
    ExportError::WriteFailed(e.to_string())
}
