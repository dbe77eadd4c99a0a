//! Unit tests for plan table and row parsing.

use chrono::Weekday;
use rideplan::plan::{PlanError, PlanRow, PlanTable, RawRow, TableError};

/// Sample plan with one, two and zero interval blocks.
const SAMPLE_PLAN: &str = r#"Week,Day,Total duration,Warm up,Cool down,Base,Intensity 1,Reps 1,Duration 1,Sets 1,RBI 1,RBS 1,RAS 1,Intensity 2,Reps 2,Duration 2,Sets 2,RBI 2,RBS 2
1,Tuesday,60,10,5,EM,SS,3,8,1,4,0,,,,,,,
1,Thursday,60,5,5,EM,PI,3,2,2,2,4,8,"OU (2U,1O)",1,6,1,0,0
1,Sunday,120,0,0,120,,,,,,,,,,,,,
"#;

fn sample_rows() -> Vec<RawRow> {
    PlanTable::parse(SAMPLE_PLAN)
        .expect("Should parse sample plan")
        .rows
}

#[test]
fn test_parse_single_block_row() {
    let rows = sample_rows();
    let row = PlanRow::from_raw(&rows[0]).expect("Should parse row");

    assert_eq!(row.week, 1);
    assert_eq!(row.day, Weekday::Tue);
    assert_eq!(row.blocks.len(), 1);

    let block = &row.blocks[0];
    assert_eq!(block.intensity, "SS");
    assert_eq!(block.reps, 3);
    assert_eq!(block.sets, 1);
    assert_eq!(block.rbi_minutes, 4.0);
    assert_eq!(block.ras_minutes, 0.0);

    // 3x8 + 2x4 = 32, leaving 60 - 15 - 32 = 13 of base
    assert_eq!(block.total_minutes(), 32.0);
    assert_eq!(row.base_minutes, 13.0);
    assert_eq!(row.base_code, "EM");
}

#[test]
fn test_parse_multiple_blocks_in_order() {
    let rows = sample_rows();
    let row = PlanRow::from_raw(&rows[1]).expect("Should parse row");

    assert_eq!(row.blocks.len(), 2);
    assert_eq!(row.blocks[0].intensity, "PI");
    assert_eq!(row.blocks[0].sets, 2);
    assert_eq!(row.blocks[1].intensity, "OU (2U,1O)");
    assert_eq!(row.summary(), "2x3x2' PI (RBI 2', RBS 4'), 1x6' OU (2U,1O)");
}

#[test]
fn test_numeric_base_is_duration() {
    let rows = sample_rows();
    let row = PlanRow::from_raw(&rows[2]).expect("Should parse row");

    assert!(row.blocks.is_empty());
    assert_eq!(row.base_minutes, 120.0);
    assert_eq!(row.base_code, "EM");
    assert_eq!(row.title(), "Week 1 Sunday");
    assert_eq!(row.planned_minutes(), 120.0);
}

#[test]
fn test_missing_mandatory_column() {
    let raw = RawRow::from_pairs(
        1,
        [
            ("Week", "2"),
            ("Day", "Monday"),
            ("Total duration", "60"),
            ("Warm up", "10"),
            ("Base", "EM"),
        ],
    );
    let error = PlanRow::from_raw(&raw).unwrap_err();

    assert_eq!(error.week, "2");
    assert_eq!(error.day, "Monday");
    assert_eq!(
        error.error,
        PlanError::MissingMandatoryColumn("Cool down".to_string())
    );
    assert_eq!(
        error.to_string(),
        "Week 2 Monday: Missing mandatory column: Cool down"
    );
}

#[test]
fn test_malformed_numbers() {
    let base = [
        ("Week", "2"),
        ("Day", "Monday"),
        ("Total duration", "60"),
        ("Warm up", "10"),
        ("Cool down", "10"),
        ("Base", "EM"),
        ("Intensity 1", "PI"),
        ("Reps 1", "4"),
        ("Duration 1", "3"),
    ];

    for (field, value) in [
        ("Warm up", "ten"),
        ("Cool down", "-5"),
        ("Reps 1", "0"),
        ("Reps 1", "2.5"),
        ("Duration 1", "abc"),
        ("Week", "0"),
    ] {
        let pairs = base.iter().map(|&(k, v)| (k, if k == field { value } else { v }));
        let raw = RawRow::from_pairs(1, pairs);
        let error = PlanRow::from_raw(&raw).unwrap_err();
        assert_eq!(
            error.error,
            PlanError::MalformedNumericField {
                field: field.to_string(),
                value: value.to_string(),
            },
            "{field}={value}"
        );
    }
}

#[test]
fn test_values_above_limits() {
    let base = [
        ("Week", "2"),
        ("Day", "Monday"),
        ("Total duration", "60"),
        ("Warm up", "10"),
        ("Cool down", "10"),
        ("Base", "EM"),
        ("Intensity 1", "PI"),
        ("Reps 1", "4"),
        ("Duration 1", "3"),
        ("Sets 1", "1"),
    ];

    for (field, value) in [
        ("Warm up", "50000000"),
        ("Total duration", "1441"),
        ("Duration 1", "1e9"),
        ("Reps 1", "4000000000"),
        ("Sets 1", "1001"),
    ] {
        let pairs = base.iter().map(|&(k, v)| (k, if k == field { value } else { v }));
        let raw = RawRow::from_pairs(1, pairs);
        let error = PlanRow::from_raw(&raw).unwrap_err();
        assert_eq!(
            error.error,
            PlanError::MalformedNumericField {
                field: field.to_string(),
                value: value.to_string(),
            },
            "{field}={value}"
        );
    }

    // Each count is fine on its own but the block is too long
    let pairs = base.iter().map(|&(k, v)| match k {
        "Reps 1" => (k, "100"),
        "Sets 1" => (k, "20"),
        _ => (k, v),
    });
    assert_eq!(
        PlanRow::from_raw(&RawRow::from_pairs(1, pairs)).unwrap_err().error,
        PlanError::MalformedNumericField {
            field: "Reps 1".to_string(),
            value: "100".to_string(),
        }
    );
}

#[test]
fn test_group_missing_reps() {
    let raw = RawRow::from_pairs(
        1,
        [
            ("Week", "2"),
            ("Day", "Monday"),
            ("Total duration", "60"),
            ("Warm up", "10"),
            ("Cool down", "10"),
            ("Base", "EM"),
            ("Intensity 1", "PI"),
            ("Duration 1", "3"),
        ],
    );
    assert_eq!(
        PlanRow::from_raw(&raw).unwrap_err().error,
        PlanError::MissingField("Reps 1".to_string())
    );
}

#[test]
fn test_group_scan_stops_at_gap() {
    let raw = RawRow::from_pairs(
        1,
        [
            ("Week", "2"),
            ("Day", "Monday"),
            ("Total duration", "60"),
            ("Warm up", "10"),
            ("Cool down", "10"),
            ("Base", "EM"),
            ("Intensity 1", "T"),
            ("Reps 1", "1"),
            ("Duration 1", "20"),
            ("Intensity 3", "CR"),
            ("Reps 3", "2"),
            ("Duration 3", "5"),
        ],
    );
    let row = PlanRow::from_raw(&raw).unwrap();
    assert_eq!(row.blocks.len(), 1);
    assert_eq!(row.blocks[0].sets, 1);
}

#[test]
fn test_invalid_day() {
    let raw = RawRow::from_pairs(
        1,
        [
            ("Week", "2"),
            ("Day", "Funday"),
            ("Total duration", "60"),
            ("Warm up", "10"),
            ("Cool down", "10"),
            ("Base", "EM"),
        ],
    );
    assert_eq!(
        PlanRow::from_raw(&raw).unwrap_err().error,
        PlanError::InvalidDay("Funday".to_string())
    );
}

#[test]
fn test_table_errors() {
    assert!(matches!(PlanTable::parse(""), Err(TableError::NoMandatoryColumns)));
    assert!(matches!(
        PlanTable::parse("Week,Day,Total duration,Warm up,Cool down,Base\n,,,,,\n"),
        Err(TableError::Empty)
    ));
}
