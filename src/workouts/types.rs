//! Workout step and document types.
//!
//! Steps are the flat timeline produced by the builder; documents are what
//! the writers render.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a rest step exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestKind {
    /// Between reps of a set
    BetweenIntervals,
    /// Between sets of a block
    BetweenSets,
    /// Once after the last set of a block
    AfterSets,
}

/// Role of a step in the workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Progressive ramp up
    WarmUp,
    /// Steady base effort
    Base,
    /// On-interval (or one sub-segment of a compound pattern)
    Work,
    /// Recovery
    Rest(RestKind),
    /// Ramp down
    CoolDown,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepKind::WarmUp => write!(f, "Warm up"),
            StepKind::Base => write!(f, "Base"),
            StepKind::Work => write!(f, "Work"),
            StepKind::Rest(RestKind::BetweenIntervals) => write!(f, "RBI"),
            StepKind::Rest(RestKind::BetweenSets) => write!(f, "RBS"),
            StepKind::Rest(RestKind::AfterSets) => write!(f, "RAS"),
            StepKind::CoolDown => write!(f, "Cool down"),
        }
    }
}

/// Power target of a step, as fractions of FTP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StepPower {
    /// Constant target
    Steady { power: f32 },
    /// Hold anywhere inside the band
    Range { low: f32, high: f32 },
    /// Linear change over the step
    Ramp { from: f32, to: f32 },
}

impl StepPower {
    pub fn steady(power: f32) -> Self {
        StepPower::Steady { power }
    }

    pub fn ramp(from: f32, to: f32) -> Self {
        StepPower::Ramp { from, to }
    }

    /// Power at the start and at the end of the step.
    pub fn endpoints(&self) -> (f32, f32) {
        match *self {
            StepPower::Steady { power } => (power, power),
            StepPower::Range { low, high } => {
                let mid = (low + high) / 2.0;
                (mid, mid)
            }
            StepPower::Ramp { from, to } => (from, to),
        }
    }
}

/// Where a step sits inside a block's repeated structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    /// 0-based block index within the row
    pub block: usize,
    /// 0-based set index
    pub set: u32,
    /// 0-based rep index within the set
    pub rep: u32,
}

/// Atomic timeline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    pub duration_seconds: u32,
    pub power: StepPower,
    /// Set when the step belongs to a block's repeated group
    pub position: Option<BlockPosition>,
    /// Intensity code or pattern sub-segment name
    pub label: Option<String>,
}

impl Step {
    pub fn new(kind: StepKind, duration_seconds: u32, power: StepPower) -> Self {
        Self {
            kind,
            duration_seconds,
            power,
            position: None,
            label: None,
        }
    }

    pub fn at(mut self, position: BlockPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.kind, StepKind::Rest(_))
    }
}

/// Total seconds of a step sequence.
pub fn total_seconds(steps: &[Step]) -> u32 {
    steps
        .iter()
        .fold(0u32, |total, s| total.saturating_add(s.duration_seconds))
}

/// Rendered segment of a workout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Segment {
    /// Ramp from `power_start` to `power_end`
    Warmup {
        duration_seconds: u32,
        power_start: f32,
        power_end: f32,
    },
    /// Ramp from `power_start` to `power_end`
    Cooldown {
        duration_seconds: u32,
        power_start: f32,
        power_end: f32,
    },
    /// Constant power
    SteadyState {
        duration_seconds: u32,
        power: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Power band (only for formats with native ranges)
    Range {
        duration_seconds: u32,
        power_low: f32,
        power_high: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// `repeat` x (on, off)
    Intervals {
        repeat: u32,
        on_duration_seconds: u32,
        off_duration_seconds: u32,
        on_power: f32,
        off_power: f32,
    },
}

impl Segment {
    /// Total length of the segment.
    pub fn duration_seconds(&self) -> u32 {
        match self {
            Segment::Warmup {
                duration_seconds, ..
            }
            | Segment::Cooldown {
                duration_seconds, ..
            }
            | Segment::SteadyState {
                duration_seconds, ..
            }
            | Segment::Range {
                duration_seconds, ..
            } => *duration_seconds,
            Segment::Intervals {
                repeat,
                on_duration_seconds,
                off_duration_seconds,
                ..
            } => repeat.saturating_mul(on_duration_seconds.saturating_add(*off_duration_seconds)),
        }
    }

    /// Flat timeline entries this segment stands for.
    pub fn expand(&self) -> Vec<TimelineEntry> {
        match self {
            Segment::Warmup {
                duration_seconds,
                power_start,
                power_end,
            }
            | Segment::Cooldown {
                duration_seconds,
                power_start,
                power_end,
            } => vec![TimelineEntry::new(*duration_seconds, *power_start, *power_end)],
            Segment::SteadyState {
                duration_seconds,
                power,
                ..
            } => vec![TimelineEntry::new(*duration_seconds, *power, *power)],
            Segment::Range {
                duration_seconds,
                power_low,
                power_high,
                ..
            } => {
                let mid = (power_low + power_high) / 2.0;
                vec![TimelineEntry::new(*duration_seconds, mid, mid)]
            }
            Segment::Intervals {
                repeat,
                on_duration_seconds,
                off_duration_seconds,
                on_power,
                off_power,
            } => {
                let mut entries = Vec::with_capacity(*repeat as usize * 2);
                for _ in 0..*repeat {
                    entries.push(TimelineEntry::new(*on_duration_seconds, *on_power, *on_power));
                    entries.push(TimelineEntry::new(
                        *off_duration_seconds,
                        *off_power,
                        *off_power,
                    ));
                }
                entries
            }
        }
    }
}

/// One flat stretch of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub duration_seconds: u32,
    pub power_start: f32,
    pub power_end: f32,
}

impl TimelineEntry {
    pub fn new(duration_seconds: u32, power_start: f32, power_end: f32) -> Self {
        Self {
            duration_seconds,
            power_start,
            power_end,
        }
    }

    /// Equal duration and powers within `epsilon`.
    pub fn approx_eq(&self, other: &TimelineEntry, epsilon: f32) -> bool {
        self.duration_seconds == other.duration_seconds
            && (self.power_start - other.power_start).abs() <= epsilon
            && (self.power_end - other.power_end).abs() <= epsilon
    }
}

/// A structured workout ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sport_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub segments: Vec<Segment>,
}

impl WorkoutDocument {
    /// Total workout duration in seconds.
    pub fn total_duration_seconds(&self) -> u32 {
        self.segments
            .iter()
            .fold(0u32, |total, s| total.saturating_add(s.duration_seconds()))
    }

    /// Fully unrolled timeline of the document.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.segments.iter().flat_map(Segment::expand).collect()
    }
}

/// Output format of a rendered workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Zwift workout XML (.zwo)
    #[default]
    Zwo,
    /// Minutes/percent course file (.mrc)
    Mrc,
    /// Document as JSON
    Json,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Zwo => "zwo",
            OutputFormat::Mrc => "mrc",
            OutputFormat::Json => "json",
        }
    }

    /// What the format can express natively.
    pub fn capabilities(&self) -> FormatCapabilities {
        match self {
            OutputFormat::Zwo => FormatCapabilities {
                native_repeats: true,
                native_ranges: false,
            },
            OutputFormat::Mrc => FormatCapabilities {
                native_repeats: false,
                native_ranges: false,
            },
            OutputFormat::Json => FormatCapabilities {
                native_repeats: true,
                native_ranges: true,
            },
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Zwo => write!(f, "zwo"),
            OutputFormat::Mrc => write!(f, "mrc"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zwo" => Ok(OutputFormat::Zwo),
            "mrc" | "erg" => Ok(OutputFormat::Mrc),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unsupported output format: {other}")),
        }
    }
}

/// Native features of a target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCapabilities {
    /// Repeated (on, off) groups
    pub native_repeats: bool,
    /// Low/high power bands
    pub native_ranges: bool,
}

/// Non-fatal findings attached to a converted workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ConversionWarning {
    /// Step total differs from the declared total beyond tolerance
    DurationMismatch {
        declared_seconds: u32,
        computed_seconds: u32,
    },
    /// Target format cannot express a feature; a fallback was rendered
    UnsupportedTargetFeature { feature: String, fallback: String },
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionWarning::DurationMismatch {
                declared_seconds,
                computed_seconds,
            } => write!(
                f,
                "Duration mismatch: declared {declared_seconds}s, computed {computed_seconds}s"
            ),
            ConversionWarning::UnsupportedTargetFeature { feature, fallback } => {
                write!(f, "Unsupported {feature}, rendered as {fallback}")
            }
        }
    }
}

/// Errors while rendering or writing a workout.
#[derive(Debug, Error)]
pub enum ExportError {
    /// XML writer failure
    #[error("XML error: {0}")]
    XmlError(String),

    /// Writing output failed
    #[error("Failed to write output: {0}")]
    WriteFailed(String),

    /// Serialization failure
    #[error("Serialization error: {0}")]
    SerializeError(String),
}

/// Errors reading a rendered workout back.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkoutParseError {
    /// Invalid XML structure
    #[error("Invalid XML: {0}")]
    InvalidXml(String),

    /// Missing required attribute
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Attribute value not parseable
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// No segments in the workout element
    #[error("Workout has no segments")]
    EmptyWorkout,
}
