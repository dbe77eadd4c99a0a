//! Intensity definitions and zone table entries.

use serde::{Deserialize, Serialize};

/// A power target expressed as a fraction of threshold power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PowerLevel {
    /// One target value
    Single { fraction: f32 },
    /// Inclusive low/high band
    Range { low: f32, high: f32 },
}

impl PowerLevel {
    /// Create a single-value target.
    pub fn single(fraction: f32) -> Self {
        PowerLevel::Single { fraction }
    }

    /// Create a range target, normalizing the bounds order.
    pub fn range(low: f32, high: f32) -> Self {
        if low <= high {
            PowerLevel::Range { low, high }
        } else {
            PowerLevel::Range {
                low: high,
                high: low,
            }
        }
    }

    /// Value at a position inside the band (0.0 = low, 1.0 = high).
    pub fn at(&self, position: f32) -> f32 {
        match *self {
            PowerLevel::Single { fraction } => fraction,
            PowerLevel::Range { low, high } => low + (high - low) * position.clamp(0.0, 1.0),
        }
    }

    /// Midpoint of the band.
    pub fn midpoint(&self) -> f32 {
        self.at(0.5)
    }

    /// Multiply every bound by `ratio`.
    pub fn scaled(&self, ratio: f32) -> Self {
        match *self {
            PowerLevel::Single { fraction } => PowerLevel::single(fraction * ratio),
            PowerLevel::Range { low, high } => PowerLevel::range(low * ratio, high * ratio),
        }
    }
}

/// One sub-segment of a compound pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSegment {
    /// Display label ("under", "over")
    pub label: String,
    /// Length of the sub-segment in seconds
    pub duration_seconds: u32,
    /// Target for this sub-segment
    pub target: PowerLevel,
}

/// A repeating micro-pattern used by compound codes such as over/unders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroPattern {
    /// Normalized code, e.g. `OU (2U,1O)`
    pub code: String,
    /// Sub-segments of one cycle, in order
    pub segments: Vec<PatternSegment>,
}

impl MicroPattern {
    /// Length of one full cycle in seconds.
    pub fn cycle_seconds(&self) -> u32 {
        self.segments
            .iter()
            .fold(0u32, |total, s| total.saturating_add(s.duration_seconds))
    }

    /// Lay the pattern over `total_seconds`.
    ///
    /// Whole cycles come first; the remainder is filled by walking the
    /// sub-segments in order, each capped at the time left.
    pub fn fill(&self, total_seconds: u32) -> Vec<PatternSegment> {
        let cycle = self.cycle_seconds();
        if cycle == 0 || total_seconds == 0 {
            return Vec::new();
        }

        let full_cycles = total_seconds / cycle;
        let mut filled = Vec::with_capacity(self.segments.len() * (full_cycles as usize + 1));
        for _ in 0..full_cycles {
            filled.extend(self.segments.iter().cloned());
        }

        let mut remaining = total_seconds - full_cycles * cycle;
        for segment in &self.segments {
            if remaining == 0 {
                break;
            }
            let take = segment.duration_seconds.min(remaining);
            filled.push(PatternSegment {
                duration_seconds: take,
                ..segment.clone()
            });
            remaining -= take;
        }

        filled
    }
}

/// Resolved meaning of an intensity code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityDefinition {
    /// One target value
    Single(f32),
    /// Low/high band
    Range { low: f32, high: f32 },
    /// Compound repeating pattern
    Pattern(MicroPattern),
}

impl IntensityDefinition {
    /// The flat target of a simple definition, `None` for patterns.
    pub fn level(&self) -> Option<PowerLevel> {
        match self {
            IntensityDefinition::Single(fraction) => Some(PowerLevel::single(*fraction)),
            IntensityDefinition::Range { low, high } => Some(PowerLevel::range(*low, *high)),
            IntensityDefinition::Pattern(_) => None,
        }
    }
}

/// A named zone in the intensity table, in percent of field-test power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    /// Code used in the plan, e.g. `SS`
    pub code: String,
    /// Human readable name
    #[serde(default)]
    pub name: String,
    /// Lower bound, percent
    pub min_percent: u16,
    /// Upper bound, percent
    pub max_percent: u16,
}

impl ZoneDefinition {
    pub fn new(code: &str, name: &str, min_percent: u16, max_percent: u16) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            min_percent,
            max_percent,
        }
    }

    /// The zone as a fraction band; collapses to a single value when the
    /// bounds are equal.
    pub fn to_definition(&self) -> IntensityDefinition {
        let low = f32::from(self.min_percent) / 100.0;
        let high = f32::from(self.max_percent) / 100.0;
        if self.min_percent == self.max_percent {
            IntensityDefinition::Single(low)
        } else {
            let level = PowerLevel::range(low, high);
            match level {
                PowerLevel::Range { low, high } => IntensityDefinition::Range { low, high },
                PowerLevel::Single { fraction } => IntensityDefinition::Single(fraction),
            }
        }
    }
}

/// Errors raised while resolving intensity codes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntensityError {
    /// Token is neither a known code nor a valid compound pattern
    #[error("Unknown intensity code: {0}")]
    UnknownCode(String),
}
