//! Intensity notation: codes, zones and compound patterns.

pub mod pattern;
pub mod resolver;
pub mod types;

pub use resolver::{standard_zones, IntensityTable};
pub use types::{
    IntensityDefinition, IntensityError, MicroPattern, PatternSegment, PowerLevel, ZoneDefinition,
};
