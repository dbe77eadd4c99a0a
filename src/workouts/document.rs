//! Step sequence to workout document.
//!
//! Formats with native repetition get (on, off) runs folded into interval
//! segments; everything else is emitted one segment per step. Both forms
//! expand to the same timeline.

use crate::workouts::types::{
    ConversionWarning, FormatCapabilities, Segment, Step, StepKind, StepPower, WorkoutDocument,
};

/// Fewest identical (on, off) pairs worth folding.
const MIN_REPEAT: usize = 2;

/// Appended to descriptions when ranges were collapsed.
const RANGE_FALLBACK_NOTE: &str = "Power ranges are shown at their midpoint.";

/// Sport written into every document.
pub const SPORT_TYPE: &str = "bike";

/// Document-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub name: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Compose a document for a format with the given capabilities.
pub fn compose(
    steps: &[Step],
    metadata: DocumentMetadata,
    capabilities: FormatCapabilities,
) -> (WorkoutDocument, Vec<ConversionWarning>) {
    let mut segments = Vec::with_capacity(steps.len());
    let mut range_fallbacks = 0usize;
    let mut unrolled_groups = 0usize;

    let mut index = 0;
    while index < steps.len() {
        if let Some((repeat, segment)) = fold_pairs(&steps[index..]) {
            if capabilities.native_repeats {
                segments.push(segment);
                index += repeat * 2;
                continue;
            }
            unrolled_groups += 1;
            // Emit the whole run flat so it is only counted once
            for step in &steps[index..index + repeat * 2] {
                segments.push(plain_segment(step, capabilities, &mut range_fallbacks));
            }
            index += repeat * 2;
            continue;
        }

        segments.push(plain_segment(
            &steps[index],
            capabilities,
            &mut range_fallbacks,
        ));
        index += 1;
    }

    let mut warnings = Vec::new();
    let mut description = metadata.description;

    if unrolled_groups > 0 {
        warnings.push(ConversionWarning::UnsupportedTargetFeature {
            feature: "repeated interval group".to_string(),
            fallback: "unrolled segments".to_string(),
        });
    }

    if range_fallbacks > 0 {
        warnings.push(ConversionWarning::UnsupportedTargetFeature {
            feature: "power range".to_string(),
            fallback: "steady state at midpoint".to_string(),
        });
        description = Some(match description {
            Some(text) if !text.is_empty() => format!("{text}\n{RANGE_FALLBACK_NOTE}"),
            _ => RANGE_FALLBACK_NOTE.to_string(),
        });
    }

    let document = WorkoutDocument {
        name: metadata.name,
        author: metadata.author,
        description,
        sport_type: SPORT_TYPE.to_string(),
        tags: metadata.tags,
        segments,
    };

    (document, warnings)
}

/// Fold a leading run of identical steady (on, off) pairs from one block.
fn fold_pairs(steps: &[Step]) -> Option<(usize, Segment)> {
    let (on, off) = match steps {
        [on, off, ..] => (on, off),
        _ => return None,
    };
    let block = on.position?.block;
    let (on_power, off_power) = match (on.power, off.power) {
        (StepPower::Steady { power: a }, StepPower::Steady { power: b }) => (a, b),
        _ => return None,
    };

    let same_as = |candidate: &Step, template: &Step| {
        candidate.duration_seconds == template.duration_seconds
            && candidate.power == template.power
            && candidate.position.map(|p| p.block) == Some(block)
    };

    let repeat = steps
        .chunks_exact(2)
        .take_while(|pair| same_as(&pair[0], on) && same_as(&pair[1], off))
        .count();

    if repeat < MIN_REPEAT {
        return None;
    }

    Some((
        repeat,
        Segment::Intervals {
            repeat: repeat as u32,
            on_duration_seconds: on.duration_seconds,
            off_duration_seconds: off.duration_seconds,
            on_power,
            off_power,
        },
    ))
}

fn plain_segment(
    step: &Step,
    capabilities: FormatCapabilities,
    range_fallbacks: &mut usize,
) -> Segment {
    let duration_seconds = step.duration_seconds;
    match (step.kind, step.power) {
        (StepKind::WarmUp, power) => {
            let (power_start, power_end) = power.endpoints();
            Segment::Warmup {
                duration_seconds,
                power_start,
                power_end,
            }
        }
        (StepKind::CoolDown, power) => {
            let (power_start, power_end) = power.endpoints();
            Segment::Cooldown {
                duration_seconds,
                power_start,
                power_end,
            }
        }
        (_, StepPower::Steady { power }) => Segment::SteadyState {
            duration_seconds,
            power,
            label: step.label.clone(),
        },
        (_, StepPower::Range { low, high }) if capabilities.native_ranges => Segment::Range {
            duration_seconds,
            power_low: low,
            power_high: high,
            label: step.label.clone(),
        },
        (_, StepPower::Range { low, high }) => {
            *range_fallbacks += 1;
            Segment::SteadyState {
                duration_seconds,
                power: (low + high) / 2.0,
                label: step.label.clone(),
            }
        }
        (_, StepPower::Ramp { from, to }) if to >= from => Segment::Warmup {
            duration_seconds,
            power_start: from,
            power_end: to,
        },
        (_, StepPower::Ramp { from, to }) => Segment::Cooldown {
            duration_seconds,
            power_start: from,
            power_end: to,
        },
    }
}
