//! Unit tests for the step builder.
//!
//! Covers the sets/reps/rest structure, compound pattern expansion and the
//! duration check.

use std::collections::HashSet;

use chrono::Weekday;
use rideplan::intensity::IntensityTable;
use rideplan::plan::{IntervalBlock, PlanRow, RawRow};
use rideplan::workouts::{
    build_steps, BuilderSettings, ConversionWarning, RestKind, Step, StepKind,
};

fn block(intensity: &str, reps: u32, minutes: f64, sets: u32) -> IntervalBlock {
    IntervalBlock {
        intensity: intensity.to_string(),
        reps,
        duration_minutes: minutes,
        sets,
        rbi_minutes: 0.0,
        rbs_minutes: 0.0,
        ras_minutes: 0.0,
    }
}

fn row_with(blocks: Vec<IntervalBlock>) -> PlanRow {
    let used: f64 = blocks.iter().map(IntervalBlock::total_minutes).sum();
    PlanRow {
        week: 3,
        day: Weekday::Wed,
        total_minutes: 90.0,
        warmup_minutes: 10.0,
        cooldown_minutes: 10.0,
        base_minutes: 70.0 - used,
        base_code: "EM".to_string(),
        blocks,
    }
}

fn build(row: &PlanRow) -> Vec<Step> {
    build_steps(row, IntensityTable::standard(), &BuilderSettings::default())
        .expect("Should build steps")
        .steps
}

fn count(steps: &[Step], kind: StepKind) -> usize {
    steps.iter().filter(|s| s.kind == kind).count()
}

/// Distinct (set, rep) positions of work steps for a block.
fn work_positions(steps: &[Step], block: usize) -> usize {
    steps
        .iter()
        .filter(|s| s.kind == StepKind::Work)
        .filter_map(|s| s.position)
        .filter(|p| p.block == block)
        .map(|p| (p.set, p.rep))
        .collect::<HashSet<_>>()
        .len()
}

#[test]
fn test_single_rep_single_set_has_no_rests() {
    let mut only = block("SS", 1, 20.0, 1);
    only.rbi_minutes = 2.0;
    only.rbs_minutes = 4.0;
    let steps = build(&row_with(vec![only]));

    assert_eq!(count(&steps, StepKind::Work), 1);
    assert!(steps.iter().all(|s| !s.is_rest()));
}

#[test]
fn test_sets_and_reps_structure() {
    let mut intervals = block("PI", 3, 1.0, 2);
    intervals.rbi_minutes = 1.0;
    intervals.rbs_minutes = 4.0;
    let steps = build(&row_with(vec![intervals]));

    assert_eq!(count(&steps, StepKind::Work), 6);
    assert_eq!(count(&steps, StepKind::Rest(RestKind::BetweenIntervals)), 4);
    assert_eq!(count(&steps, StepKind::Rest(RestKind::BetweenSets)), 1);
    assert_eq!(count(&steps, StepKind::Rest(RestKind::AfterSets)), 0);

    let kinds: Vec<String> = steps.iter().map(|s| s.kind.to_string()).collect();
    assert_eq!(
        kinds,
        vec![
            "Warm up", "Base", "Work", "RBI", "Work", "RBI", "Work", "RBS", "Work", "RBI",
            "Work", "RBI", "Work", "Cool down",
        ]
    );
}

#[test]
fn test_rest_after_sets_once() {
    let mut first = block("CR", 2, 8.0, 2);
    first.rbi_minutes = 4.0;
    first.rbs_minutes = 6.0;
    first.ras_minutes = 10.0;
    let steps = build(&row_with(vec![first, block("T", 1, 5.0, 1)]));

    assert_eq!(count(&steps, StepKind::Rest(RestKind::AfterSets)), 1);

    let ras_index = steps
        .iter()
        .position(|s| s.kind == StepKind::Rest(RestKind::AfterSets))
        .unwrap();
    assert_eq!(steps[ras_index].duration_seconds, 600);
    assert!(steps[ras_index].position.is_none());

    // Last work step of the first block comes right before it
    let previous = &steps[ras_index - 1];
    assert_eq!(previous.kind, StepKind::Work);
    let position = previous.position.unwrap();
    assert_eq!((position.block, position.set, position.rep), (0, 1, 1));

    // Then straight into the next block
    assert_eq!(steps[ras_index + 1].position.unwrap().block, 1);
}

#[test]
fn test_work_positions_equal_sets_times_reps() {
    let mut pattern = block("OU (2U,1O)", 3, 7.0, 2);
    pattern.rbi_minutes = 2.0;
    pattern.rbs_minutes = 5.0;
    let steps = build(&row_with(vec![pattern, block("FP", 4, 1.0, 1)]));

    assert_eq!(work_positions(&steps, 0), 6);
    assert_eq!(work_positions(&steps, 1), 4);
}

#[test]
fn test_over_under_partial_cycle() {
    let steps = build(&row_with(vec![block("OU (2U,1O)", 1, 7.0, 1)]));
    let work: Vec<&Step> = steps.iter().filter(|s| s.kind == StepKind::Work).collect();

    let durations: Vec<u32> = work.iter().map(|s| s.duration_seconds).collect();
    assert_eq!(durations, vec![120, 60, 120, 60, 60]);

    let labels: Vec<&str> = work.iter().map(|s| s.label.as_deref().unwrap()).collect();
    assert_eq!(
        labels,
        vec![
            "OU (2U,1O) under",
            "OU (2U,1O) over",
            "OU (2U,1O) under",
            "OU (2U,1O) over",
            "OU (2U,1O) under",
        ]
    );

    let (under, _) = work[0].power.endpoints();
    let (over, _) = work[1].power.endpoints();
    assert!(under < over);
}

#[test]
fn test_blocks_keep_column_order() {
    let steps = build(&row_with(vec![
        block("PI", 1, 3.0, 1),
        block("SS", 1, 10.0, 1),
        block("T", 1, 15.0, 1),
    ]));
    let labels: Vec<&str> = steps
        .iter()
        .filter(|s| s.kind == StepKind::Work)
        .map(|s| s.label.as_deref().unwrap())
        .collect();
    assert_eq!(labels, vec!["PI", "SS", "T"]);
}

#[test]
fn test_total_matches_declared() {
    let mut intervals = block("SEPI", 4, 2.0, 2);
    intervals.rbi_minutes = 2.0;
    intervals.rbs_minutes = 5.0;
    let row = row_with(vec![intervals]);
    let built = build_steps(&row, IntensityTable::standard(), &BuilderSettings::default()).unwrap();

    assert!(built.warnings.is_empty());
    assert_eq!(built.total_seconds(), 90 * 60);
}

#[test]
fn test_overbooked_row_warns() {
    let mut row = row_with(vec![block("PI", 10, 10.0, 1)]);
    row.base_minutes = 0.0;
    let built = build_steps(&row, IntensityTable::standard(), &BuilderSettings::default()).unwrap();

    assert_eq!(
        built.warnings,
        vec![ConversionWarning::DurationMismatch {
            declared_seconds: 5400,
            computed_seconds: 7200,
        }]
    );
}

#[test]
fn test_unknown_code_fails_row() {
    let row = row_with(vec![block("ZZZ", 1, 5.0, 1)]);
    let result = build_steps(&row, IntensityTable::standard(), &BuilderSettings::default());
    assert!(result.is_err());
}

#[test]
fn test_thursday_sequence() {
    let raw = RawRow::from_pairs(
        1,
        [
            ("Week", "8"),
            ("Day", "Thursday"),
            ("Total duration", "60"),
            ("Warm up", "5"),
            ("Cool down", "5"),
            ("Base", "EM"),
            ("Intensity 1", "PFPI"),
            ("Reps 1", "4"),
            ("Duration 1", "2"),
            ("Sets 1", "1"),
            ("RBI 1", "2"),
            ("RBS 1", "0"),
            ("RAS 1", "8"),
            ("Intensity 2", "OU (2U,1O)"),
            ("Reps 2", "4"),
            ("Duration 2", "3"),
            ("Sets 2", "1"),
            ("RBI 2", "3"),
            ("RBS 2", ""),
            ("RAS 2", ""),
        ],
    );
    let row = PlanRow::from_raw(&raw).unwrap();
    assert_eq!(row.base_minutes, 7.0);

    let built = build_steps(&row, IntensityTable::standard(), &BuilderSettings::default()).unwrap();
    let timeline: Vec<(String, u32)> = built
        .steps
        .iter()
        .map(|s| (s.kind.to_string(), s.duration_seconds / 60))
        .collect();

    let mut expected: Vec<(String, u32)> = vec![("Warm up".into(), 5), ("Base".into(), 7)];
    for rep in 0..4 {
        expected.push(("Work".into(), 2));
        if rep < 3 {
            expected.push(("RBI".into(), 2));
        }
    }
    expected.push(("RAS".into(), 8));
    for rep in 0..4 {
        expected.push(("Work".into(), 2));
        expected.push(("Work".into(), 1));
        if rep < 3 {
            expected.push(("RBI".into(), 3));
        }
    }
    expected.push(("Cool down".into(), 5));

    assert_eq!(timeline, expected);
    assert_eq!(built.total_seconds(), 3600);
    assert!(built.warnings.is_empty());
}
