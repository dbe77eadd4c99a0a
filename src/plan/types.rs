//! Plan rows, interval blocks and their errors.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::table::RawRow;

/// Columns every row must carry.
pub const MANDATORY_COLUMNS: [&str; 6] = [
    "Week",
    "Day",
    "Total duration",
    "Warm up",
    "Cool down",
    "Base",
];

/// Intensity used for the base when the `Base` column holds a duration.
pub const DEFAULT_BASE_CODE: &str = "EM";

/// Longest duration accepted in any minutes column (one day).
pub const MAX_MINUTES: f64 = 24.0 * 60.0;

/// Largest reps x sets accepted for one block.
pub const MAX_INTERVALS_PER_BLOCK: u32 = 1000;

/// One labeled interval group within a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalBlock {
    /// Intensity token, e.g. `PI` or `OU (2U,1O)`
    pub intensity: String,
    /// Intervals per set
    pub reps: u32,
    /// Length of one rep in minutes
    pub duration_minutes: f64,
    /// Number of sets
    pub sets: u32,
    /// Rest between intervals (minutes)
    pub rbi_minutes: f64,
    /// Rest between sets (minutes)
    pub rbs_minutes: f64,
    /// Rest after the final set (minutes)
    pub ras_minutes: f64,
}

impl IntervalBlock {
    /// Total time of the block including all rests.
    pub fn total_minutes(&self) -> f64 {
        let reps = f64::from(self.reps);
        let sets = f64::from(self.sets);
        let per_set = reps * self.duration_minutes + (reps - 1.0) * self.rbi_minutes;
        sets * per_set + (sets - 1.0) * self.rbs_minutes + self.ras_minutes
    }

    /// Compact notation, e.g. `2x4x2' PFPI (RBI 2', RBS 4')`.
    pub fn summary(&self) -> String {
        let mut text = if self.sets > 1 {
            format!(
                "{}x{}x{}' {}",
                self.sets,
                self.reps,
                format_minutes(self.duration_minutes),
                self.intensity
            )
        } else {
            format!(
                "{}x{}' {}",
                self.reps,
                format_minutes(self.duration_minutes),
                self.intensity
            )
        };

        let mut rests = Vec::new();
        if self.reps > 1 && self.rbi_minutes > 0.0 {
            rests.push(format!("RBI {}'", format_minutes(self.rbi_minutes)));
        }
        if self.sets > 1 && self.rbs_minutes > 0.0 {
            rests.push(format!("RBS {}'", format_minutes(self.rbs_minutes)));
        }
        if !rests.is_empty() {
            text.push_str(&format!(" ({})", rests.join(", ")));
        }
        text
    }
}

/// How the base effort was declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseSpec {
    /// Explicit duration in minutes, ridden at the default base code
    Minutes(f64),
    /// Intensity code; duration is whatever time the row leaves over
    Code(String),
}

/// One workout of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    pub week: u32,
    #[serde(with = "weekday_serde")]
    pub day: Weekday,
    /// Declared total duration (minutes)
    pub total_minutes: f64,
    pub warmup_minutes: f64,
    pub cooldown_minutes: f64,
    /// Base duration (minutes), explicit or derived
    pub base_minutes: f64,
    /// Code the base is ridden at
    pub base_code: String,
    /// Interval blocks in execution order
    pub blocks: Vec<IntervalBlock>,
}

impl PlanRow {
    /// Parse a typed row from a raw table record.
    pub fn from_raw(raw: &RawRow) -> Result<Self, RowError> {
        let id = RowId::of(raw);
        Self::parse(raw).map_err(|error| RowError {
            week: id.week,
            day: id.day,
            error,
        })
    }

    fn parse(raw: &RawRow) -> Result<Self, PlanError> {
        for column in MANDATORY_COLUMNS {
            if raw.get(column).is_none() {
                return Err(PlanError::MissingMandatoryColumn(column.to_string()));
            }
        }

        let week = parse_count(raw, "Week", u32::MAX)?;
        let day = parse_day(raw)?;
        let total_minutes = parse_minutes(raw, "Total duration")?;
        if total_minutes <= 0.0 {
            return Err(PlanError::MalformedNumericField {
                field: "Total duration".to_string(),
                value: raw.get("Total duration").unwrap_or_default().to_string(),
            });
        }
        let warmup_minutes = parse_minutes(raw, "Warm up")?;
        let cooldown_minutes = parse_minutes(raw, "Cool down")?;
        let blocks = parse_blocks(raw)?;

        let base = match raw.get("Base") {
            Some(value) if looks_numeric(value) => BaseSpec::Minutes(parse_minutes(raw, "Base")?),
            Some(value) => BaseSpec::Code(value.to_string()),
            None => return Err(PlanError::MissingMandatoryColumn("Base".to_string())),
        };

        let (base_minutes, base_code) = match base {
            BaseSpec::Minutes(minutes) => (minutes, DEFAULT_BASE_CODE.to_string()),
            BaseSpec::Code(code) => {
                let used: f64 = warmup_minutes
                    + cooldown_minutes
                    + blocks.iter().map(IntervalBlock::total_minutes).sum::<f64>();
                ((total_minutes - used).max(0.0), code)
            }
        };

        Ok(Self {
            week,
            day,
            total_minutes,
            warmup_minutes,
            cooldown_minutes,
            base_minutes,
            base_code,
            blocks,
        })
    }

    /// Display name without prefix, e.g. `Week 8 Thursday`.
    pub fn title(&self) -> String {
        format!("Week {} {}", self.week, weekday_name(self.day))
    }

    /// Row identity used in diagnostics.
    pub fn id(&self) -> RowId {
        RowId {
            week: self.week.to_string(),
            day: weekday_name(self.day).to_string(),
        }
    }

    /// Sum of all declared parts (minutes).
    pub fn planned_minutes(&self) -> f64 {
        self.warmup_minutes
            + self.cooldown_minutes
            + self.base_minutes
            + self.blocks.iter().map(IntervalBlock::total_minutes).sum::<f64>()
    }

    /// One-line description of the interval blocks.
    pub fn summary(&self) -> String {
        if self.blocks.is_empty() {
            return format!("{}' {}", format_minutes(self.total_minutes), self.base_code);
        }
        self.blocks
            .iter()
            .map(IntervalBlock::summary)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Scan the numbered column groups until the first absent `Intensity i`.
fn parse_blocks(raw: &RawRow) -> Result<Vec<IntervalBlock>, PlanError> {
    let mut blocks = Vec::new();
    let limit = raw.len();

    for index in 1..=limit {
        let intensity = match raw.get(&format!("Intensity {index}")) {
            Some(value) => value.to_string(),
            None => break,
        };

        let reps_field = format!("Reps {index}");
        let duration_field = format!("Duration {index}");
        if raw.get(&reps_field).is_none() {
            return Err(PlanError::MissingField(reps_field));
        }
        if raw.get(&duration_field).is_none() {
            return Err(PlanError::MissingField(duration_field));
        }

        let reps = parse_count(raw, &reps_field, MAX_INTERVALS_PER_BLOCK)?;
        let duration_minutes = parse_minutes(raw, &duration_field)?;
        if duration_minutes <= 0.0 {
            return Err(PlanError::MalformedNumericField {
                field: duration_field.clone(),
                value: raw.get(&duration_field).unwrap_or_default().to_string(),
            });
        }

        let sets_field = format!("Sets {index}");
        let sets = if raw.get(&sets_field).is_some() {
            parse_count(raw, &sets_field, MAX_INTERVALS_PER_BLOCK)?
        } else {
            1
        };

        match reps.checked_mul(sets) {
            Some(count) if count <= MAX_INTERVALS_PER_BLOCK => {}
            _ => {
                return Err(malformed(
                    &reps_field,
                    raw.get(&reps_field).unwrap_or_default(),
                ))
            }
        }

        blocks.push(IntervalBlock {
            intensity,
            reps,
            duration_minutes,
            sets,
            rbi_minutes: parse_optional_minutes(raw, &format!("RBI {index}"))?,
            rbs_minutes: parse_optional_minutes(raw, &format!("RBS {index}"))?,
            ras_minutes: parse_optional_minutes(raw, &format!("RAS {index}"))?,
        });
    }

    Ok(blocks)
}

fn looks_numeric(value: &str) -> bool {
    value.parse::<f64>().is_ok()
}

fn malformed(field: &str, value: &str) -> PlanError {
    PlanError::MalformedNumericField {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Minutes from a required field, between 0 and `MAX_MINUTES`.
fn parse_minutes(raw: &RawRow, field: &str) -> Result<f64, PlanError> {
    let value = raw
        .get(field)
        .ok_or_else(|| PlanError::MissingField(field.to_string()))?;
    let minutes: f64 = value.parse().map_err(|_| malformed(field, value))?;
    if !minutes.is_finite() || !(0.0..=MAX_MINUTES).contains(&minutes) {
        return Err(malformed(field, value));
    }
    Ok(minutes)
}

/// Non-negative minutes, zero when blank or absent.
fn parse_optional_minutes(raw: &RawRow, field: &str) -> Result<f64, PlanError> {
    if raw.get(field).is_none() {
        return Ok(0.0);
    }
    parse_minutes(raw, field)
}

/// Whole number in `1..=max`. Accepts `4` and `4.0`.
fn parse_count(raw: &RawRow, field: &str, max: u32) -> Result<u32, PlanError> {
    let value = raw
        .get(field)
        .ok_or_else(|| PlanError::MissingField(field.to_string()))?;
    let count = match value.parse::<u32>() {
        Ok(count) => count,
        Err(_) => {
            let float: f64 = value.parse().map_err(|_| malformed(field, value))?;
            if float.fract() != 0.0 || float < 0.0 || float > f64::from(u32::MAX) {
                return Err(malformed(field, value));
            }
            float as u32
        }
    };
    if count == 0 || count > max {
        return Err(malformed(field, value));
    }
    Ok(count)
}

fn parse_day(raw: &RawRow) -> Result<Weekday, PlanError> {
    let value = raw
        .get("Day")
        .ok_or_else(|| PlanError::MissingMandatoryColumn("Day".to_string()))?;
    value
        .parse::<Weekday>()
        .map_err(|_| PlanError::InvalidDay(value.to_string()))
}

/// Full English weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Minutes without a trailing `.0` for whole values.
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{minutes:.0}")
    } else {
        let text = format!("{minutes:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

mod weekday_serde {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(super::weekday_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Week/day identity of a row, as written in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowId {
    pub week: String,
    pub day: String,
}

impl RowId {
    /// Best-effort identity of a raw record.
    pub fn of(raw: &RawRow) -> Self {
        Self {
            week: raw.get("Week").unwrap_or("?").to_string(),
            day: raw.get("Day").unwrap_or("?").to_string(),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {} {}", self.week, self.day)
    }
}

/// Errors that reject a single row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// One of the six required columns is absent or blank
    #[error("Missing mandatory column: {0}")]
    MissingMandatoryColumn(String),

    /// A present column group lacks a required field
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Non-numeric or out-of-range duration/count
    #[error("Invalid value for {field}: {value}")]
    MalformedNumericField { field: String, value: String },

    /// Day is not a weekday name
    #[error("Invalid day: {0}")]
    InvalidDay(String),

    /// Intensity token not in the table and not a compound pattern
    #[error("Unknown intensity code: {0}")]
    UnknownIntensityCode(String),
}

/// A row-level failure tagged with the row's identity.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Week {week} {day}: {error}")]
pub struct RowError {
    pub week: String,
    pub day: String,
    #[source]
    pub error: PlanError,
}

impl RowError {
    pub fn new(id: RowId, error: PlanError) -> Self {
        Self {
            week: id.week,
            day: id.day,
            error,
        }
    }
}

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum TableError {
    /// No data rows
    #[error("Plan table has no rows")]
    Empty,

    /// None of the mandatory columns is in the header
    #[error("Plan table has none of the mandatory columns ({})", MANDATORY_COLUMNS.join(", "))]
    NoMandatoryColumns,

    /// Malformed CSV
    #[error("CSV error: {0}")]
    Csv(String),

    /// Reading the input failed
    #[error("IO error: {0}")]
    Io(String),
}
