//! Workout building and rendering.

pub mod builder;
pub mod document;
pub mod parser_zwo;
pub mod types;
pub mod writer_json;
pub mod writer_mrc;
pub mod writer_zwo;

pub use builder::{
    build_steps, minutes_to_seconds, BasePlacement, BuilderSettings, BuiltWorkout, RangeMode,
};
pub use document::{compose, DocumentMetadata};
pub use parser_zwo::{parse_zwo, parse_zwo_timeline};
pub use types::{
    BlockPosition, ConversionWarning, ExportError, FormatCapabilities, OutputFormat, RestKind,
    Segment, Step, StepKind, StepPower, TimelineEntry, WorkoutDocument, WorkoutParseError,
};
pub use writer_json::write_json;
pub use writer_mrc::write_mrc;
pub use writer_zwo::write_zwo;

/// Render a document in the given format.
pub fn render(document: &WorkoutDocument, format: OutputFormat) -> Result<String, ExportError> {
    match format {
        OutputFormat::Zwo => write_zwo(document),
        OutputFormat::Mrc => write_mrc(document),
        OutputFormat::Json => write_json(document),
    }
}
