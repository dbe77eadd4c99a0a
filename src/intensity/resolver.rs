//! Intensity code lookup table.
//!
//! Maps plan intensity codes to power targets. The standard table is built
//! once per process and only ever read afterwards.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::intensity::pattern::{canonical_code, parse_over_under, PatternSide};
use crate::intensity::types::{
    IntensityDefinition, IntensityError, MicroPattern, PatternSegment, PowerLevel, ZoneDefinition,
};

/// Code whose target the "under" half of an over/under uses.
const UNDER_CODE: &str = "SS";
/// Code whose target the "over" half of an over/under uses.
const OVER_CODE: &str = "CR";

/// Zones of the standard methodology, in percent of field-test power.
pub fn standard_zones() -> Vec<ZoneDefinition> {
    vec![
        ZoneDefinition::new("EM", "Endurance Miles", 45, 73),
        ZoneDefinition::new("T", "Tempo", 80, 85),
        ZoneDefinition::new("SS", "Steady State", 86, 90),
        ZoneDefinition::new("CR", "Climbing Repeat", 95, 100),
        ZoneDefinition::new("PI", "Power Interval", 101, 150),
        ZoneDefinition::new("SEPI", "Sustained Effort Power Interval", 101, 150),
        ZoneDefinition::new("FP", "Fast Pedal", 45, 73),
        ZoneDefinition::new("PFPI", "Peak and Fade Power Interval", 101, 150),
    ]
}

static STANDARD_TABLE: OnceLock<IntensityTable> = OnceLock::new();

/// Read-only mapping from intensity code to definition.
#[derive(Debug, Clone)]
pub struct IntensityTable {
    zones: HashMap<String, ZoneDefinition>,
    /// Field-test power / platform FTP
    power_ratio: f32,
}

impl IntensityTable {
    /// The process-wide standard table (ratio 1.0).
    pub fn standard() -> &'static IntensityTable {
        STANDARD_TABLE.get_or_init(|| IntensityTable::from_zones(standard_zones()))
    }

    /// Build a table from explicit zones.
    pub fn from_zones(zones: Vec<ZoneDefinition>) -> Self {
        let zones = zones
            .into_iter()
            .map(|z| (z.code.trim().to_uppercase(), z))
            .collect();
        Self {
            zones,
            power_ratio: 1.0,
        }
    }

    /// Standard zones with some entries replaced or added.
    pub fn with_overrides(overrides: &[ZoneDefinition]) -> Self {
        let mut zones = standard_zones();
        for zone in overrides {
            let code = zone.code.trim().to_uppercase();
            match zones.iter_mut().find(|z| z.code == code) {
                Some(existing) => {
                    existing.min_percent = zone.min_percent;
                    existing.max_percent = zone.max_percent;
                    if !zone.name.is_empty() {
                        existing.name = zone.name.clone();
                    }
                }
                None => zones.push(ZoneDefinition {
                    code,
                    ..zone.clone()
                }),
            }
        }
        Self::from_zones(zones)
    }

    /// Scale every target by `field_test_power / reference_ftp`.
    ///
    /// Zone percentages refer to the methodology's field test, while the
    /// training platform expresses targets against its own FTP setting.
    pub fn with_power_scale(mut self, field_test_power: u16, reference_ftp: u16) -> Self {
        if field_test_power > 0 && reference_ftp > 0 {
            self.power_ratio = f32::from(field_test_power) / f32::from(reference_ftp);
        }
        self
    }

    /// Current scaling ratio.
    pub fn power_ratio(&self) -> f32 {
        self.power_ratio
    }

    /// Known simple codes, sorted.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.zones.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Zone entry for a simple code.
    pub fn zone(&self, code: &str) -> Option<&ZoneDefinition> {
        self.zones.get(&code.trim().to_uppercase())
    }

    /// Resolve a token to its definition.
    pub fn resolve(&self, token: &str) -> Result<IntensityDefinition, IntensityError> {
        if let Some(level) = self.simple_level(token) {
            return Ok(match level {
                PowerLevel::Single { fraction } => IntensityDefinition::Single(fraction),
                PowerLevel::Range { low, high } => IntensityDefinition::Range { low, high },
            });
        }

        if let Some(pattern) = self.resolve_pattern(token) {
            return Ok(IntensityDefinition::Pattern(pattern));
        }

        Err(IntensityError::UnknownCode(token.trim().to_string()))
    }

    /// Resolve a token that must be a flat target (single or range).
    pub fn resolve_level(&self, token: &str) -> Result<PowerLevel, IntensityError> {
        self.simple_level(token)
            .ok_or_else(|| IntensityError::UnknownCode(token.trim().to_string()))
    }

    fn simple_level(&self, token: &str) -> Option<PowerLevel> {
        let zone = self.zone(token)?;
        let level = zone.to_definition().level()?;
        Some(level.scaled(self.power_ratio))
    }

    fn resolve_pattern(&self, token: &str) -> Option<MicroPattern> {
        let terms = parse_over_under(token)?;
        let under = self.simple_level(UNDER_CODE)?;
        let over = self.simple_level(OVER_CODE)?;

        let segments = terms
            .iter()
            .map(|term| {
                Some(PatternSegment {
                    label: term.side.label().to_string(),
                    duration_seconds: term.minutes.checked_mul(60)?,
                    target: match term.side {
                        PatternSide::Under => under,
                        PatternSide::Over => over,
                    },
                })
            })
            .collect::<Option<Vec<_>>>()?;

        Some(MicroPattern {
            code: canonical_code(&terms),
            segments,
        })
    }
}

impl Default for IntensityTable {
    fn default() -> Self {
        Self::from_zones(standard_zones())
    }
}
