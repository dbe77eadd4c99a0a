//! Step sequence builder.
//!
//! Turns one plan row into the ordered timeline: warm-up, base, every
//! block's sets and reps with their rests, cool-down.

use serde::{Deserialize, Serialize};

use crate::intensity::{IntensityDefinition, IntensityError, IntensityTable, PowerLevel};
use crate::plan::{IntervalBlock, PlanError, PlanRow};
use crate::workouts::types::{
    total_seconds, BlockPosition, ConversionWarning, RestKind, Step, StepKind, StepPower,
};

/// Default low end of warm-up and cool-down ramps.
pub const DEFAULT_BASELINE_POWER: f32 = 0.25;
/// Default recovery power.
pub const DEFAULT_REST_POWER: f32 = 0.25;
/// Default allowed gap between declared and computed totals.
pub const DEFAULT_TOLERANCE_SECONDS: u32 = 30;

/// How range targets reach the steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum RangeMode {
    /// Collapse every range to one point (0.0 = low, 1.0 = high)
    Point { position: f32 },
    /// Keep the band and let the writer decide
    Native,
}

impl Default for RangeMode {
    fn default() -> Self {
        RangeMode::Point { position: 0.5 }
    }
}

/// Where the base effort goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasePlacement {
    /// One base step right after the warm-up
    #[default]
    Leading,
    /// Equal fillers before the first block and after every block
    Interleaved,
}

/// Knobs of the builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderSettings {
    pub range_mode: RangeMode,
    /// Low end of warm-up/cool-down ramps
    pub baseline_power: f32,
    pub rest_power: f32,
    pub base_placement: BasePlacement,
    pub tolerance_seconds: u32,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            range_mode: RangeMode::default(),
            baseline_power: DEFAULT_BASELINE_POWER,
            rest_power: DEFAULT_REST_POWER,
            base_placement: BasePlacement::default(),
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
        }
    }
}

/// Builder result for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltWorkout {
    pub steps: Vec<Step>,
    pub warnings: Vec<ConversionWarning>,
}

impl BuiltWorkout {
    pub fn total_seconds(&self) -> u32 {
        total_seconds(&self.steps)
    }
}

/// Whole seconds for a duration in minutes.
pub fn minutes_to_seconds(minutes: f64) -> u32 {
    (minutes * 60.0).round().max(0.0) as u32
}

/// Build the step sequence of a row.
pub fn build_steps(
    row: &PlanRow,
    table: &IntensityTable,
    settings: &BuilderSettings,
) -> Result<BuiltWorkout, PlanError> {
    let base_level = table.resolve_level(&row.base_code).map_err(unknown_code)?;
    let definitions = row
        .blocks
        .iter()
        .map(|block| table.resolve(&block.intensity).map_err(unknown_code))
        .collect::<Result<Vec<_>, _>>()?;

    let base_power = point(base_level, settings.range_mode);
    let base_seconds = minutes_to_seconds(row.base_minutes);
    let fillers = base_fillers(base_seconds, row.blocks.len(), settings.base_placement);

    let mut steps = Vec::new();

    let warmup_seconds = minutes_to_seconds(row.warmup_minutes);
    if warmup_seconds > 0 {
        steps.push(Step::new(
            StepKind::WarmUp,
            warmup_seconds,
            StepPower::ramp(settings.baseline_power, base_power),
        ));
    }

    let base_step = |seconds: u32| {
        Step::new(StepKind::Base, seconds, power_for(base_level, settings.range_mode))
            .labeled(row.base_code.clone())
    };

    if let Some(&first) = fillers.first() {
        if first > 0 {
            steps.push(base_step(first));
        }
    }

    for (index, (block, definition)) in row.blocks.iter().zip(&definitions).enumerate() {
        push_block(&mut steps, index, block, definition, settings);

        if let Some(&filler) = fillers.get(index + 1) {
            if filler > 0 {
                steps.push(base_step(filler));
            }
        }
    }

    let cooldown_seconds = minutes_to_seconds(row.cooldown_minutes);
    if cooldown_seconds > 0 {
        steps.push(Step::new(
            StepKind::CoolDown,
            cooldown_seconds,
            StepPower::ramp(base_power, settings.baseline_power),
        ));
    }

    let mut warnings = Vec::new();
    let declared_seconds = minutes_to_seconds(row.total_minutes);
    let computed_seconds = total_seconds(&steps);
    if declared_seconds.abs_diff(computed_seconds) > settings.tolerance_seconds {
        warnings.push(ConversionWarning::DurationMismatch {
            declared_seconds,
            computed_seconds,
        });
    }

    tracing::debug!(
        "Built {} steps for {} ({}s)",
        steps.len(),
        row.title(),
        computed_seconds
    );

    Ok(BuiltWorkout { steps, warnings })
}

fn unknown_code(error: IntensityError) -> PlanError {
    match error {
        IntensityError::UnknownCode(code) => PlanError::UnknownIntensityCode(code),
    }
}

/// Split the base time into the fillers the placement asks for.
fn base_fillers(base_seconds: u32, blocks: usize, placement: BasePlacement) -> Vec<u32> {
    match placement {
        BasePlacement::Leading => vec![base_seconds],
        BasePlacement::Interleaved => {
            let slots = blocks as u32 + 1;
            let each = base_seconds / slots;
            let mut fillers = vec![each; slots as usize];
            // Rounding leftovers go to the last filler
            if let Some(last) = fillers.last_mut() {
                *last += base_seconds - each * slots;
            }
            fillers
        }
    }
}

/// Emit the sets x reps structure of one block.
fn push_block(
    steps: &mut Vec<Step>,
    index: usize,
    block: &IntervalBlock,
    definition: &IntensityDefinition,
    settings: &BuilderSettings,
) {
    let rep_seconds = minutes_to_seconds(block.duration_minutes);
    let rbi_seconds = minutes_to_seconds(block.rbi_minutes);
    let rbs_seconds = minutes_to_seconds(block.rbs_minutes);
    let ras_seconds = minutes_to_seconds(block.ras_minutes);
    let rest = StepPower::steady(settings.rest_power);

    for set in 0..block.sets {
        for rep in 0..block.reps {
            let position = BlockPosition {
                block: index,
                set,
                rep,
            };
            push_work(steps, position, rep_seconds, block, definition, settings);

            if rep + 1 < block.reps && rbi_seconds > 0 {
                steps.push(
                    Step::new(
                        StepKind::Rest(RestKind::BetweenIntervals),
                        rbi_seconds,
                        rest,
                    )
                    .at(position),
                );
            }
        }

        if set + 1 < block.sets && rbs_seconds > 0 {
            let position = BlockPosition {
                block: index,
                set,
                rep: block.reps - 1,
            };
            steps.push(
                Step::new(StepKind::Rest(RestKind::BetweenSets), rbs_seconds, rest).at(position),
            );
        }
    }

    if ras_seconds > 0 {
        steps.push(Step::new(
            StepKind::Rest(RestKind::AfterSets),
            ras_seconds,
            rest,
        ));
    }
}

/// One rep: a single work step, or the expanded micro-pattern.
fn push_work(
    steps: &mut Vec<Step>,
    position: BlockPosition,
    rep_seconds: u32,
    block: &IntervalBlock,
    definition: &IntensityDefinition,
    settings: &BuilderSettings,
) {
    match definition {
        IntensityDefinition::Pattern(pattern) => {
            for segment in pattern.fill(rep_seconds) {
                steps.push(
                    Step::new(
                        StepKind::Work,
                        segment.duration_seconds,
                        power_for(segment.target, settings.range_mode),
                    )
                    .at(position)
                    .labeled(format!("{} {}", pattern.code, segment.label)),
                );
            }
        }
        IntensityDefinition::Single(fraction) => {
            steps.push(
                Step::new(StepKind::Work, rep_seconds, StepPower::steady(*fraction))
                    .at(position)
                    .labeled(block.intensity.clone()),
            );
        }
        IntensityDefinition::Range { low, high } => {
            steps.push(
                Step::new(
                    StepKind::Work,
                    rep_seconds,
                    power_for(PowerLevel::range(*low, *high), settings.range_mode),
                )
                .at(position)
                .labeled(block.intensity.clone()),
            );
        }
    }
}

fn point(level: PowerLevel, mode: RangeMode) -> f32 {
    match mode {
        RangeMode::Point { position } => level.at(position),
        RangeMode::Native => level.midpoint(),
    }
}

fn power_for(level: PowerLevel, mode: RangeMode) -> StepPower {
    match (level, mode) {
        (PowerLevel::Range { low, high }, RangeMode::Native) => StepPower::Range { low, high },
        _ => StepPower::steady(point(level, mode)),
    }
}
