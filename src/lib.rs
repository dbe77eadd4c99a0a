//! rideplan - training plan to structured trainer workouts
//!
//! Reads a periodized cycling plan written in interval notation (one row per
//! workout), resolves intensity codes to power targets, builds the timed
//! step sequence of every workout and renders it as a Zwift `.zwo`, MRC or
//! JSON workout document.

pub mod config;
pub mod convert;
pub mod intensity;
pub mod plan;
pub mod workouts;

// Re-export commonly used types
pub use config::AppConfig;
pub use convert::{ConversionReport, ConvertedWorkout, Converter};
pub use intensity::IntensityTable;
pub use plan::{PlanRow, PlanTable};
pub use workouts::{OutputFormat, Step, WorkoutDocument};
