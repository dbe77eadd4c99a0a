//! Unit tests for reading ZWO workouts back.

use rideplan::workouts::{parse_zwo, parse_zwo_timeline, Segment, TimelineEntry, WorkoutParseError};

/// Sample ZWO workout as written by the converter.
const SAMPLE_ZWO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workout_file>
   <author>rideplan</author>
   <name>Week 4 Tuesday</name>
   <description>4x30'' PI &amp; RBI</description>
   <sportType>bike</sportType>
   <tags>
      <tag name="TCTP"/>
   </tags>
   <workout>
      <Warmup Duration="300" PowerLow="0.25" PowerHigh="0.59"/>
      <SteadyState Duration="600" Power="0.59"/>
      <IntervalsT Repeat="4" OnDuration="30" OffDuration="30" OnPower="1.255" OffPower="0.25"/>
      <SteadyState Duration="300" Power="0.88"/>
      <Cooldown Duration="300" PowerLow="0.59" PowerHigh="0.25"/>
   </workout>
</workout_file>"#;

#[test]
fn test_parse_zwo_metadata() {
    let document = parse_zwo(SAMPLE_ZWO).expect("Should parse ZWO workout");

    assert_eq!(document.name, "Week 4 Tuesday");
    assert_eq!(document.author.as_deref(), Some("rideplan"));
    assert_eq!(document.description.as_deref(), Some("4x30'' PI & RBI"));
    assert_eq!(document.sport_type, "bike");
    assert_eq!(document.tags, vec!["TCTP".to_string()]);
    assert_eq!(document.segments.len(), 5);
}

#[test]
fn test_parse_zwo_ramps() {
    let document = parse_zwo(SAMPLE_ZWO).expect("Should parse ZWO workout");

    assert_eq!(
        document.segments[0],
        Segment::Warmup {
            duration_seconds: 300,
            power_start: 0.25,
            power_end: 0.59,
        }
    );
    assert_eq!(
        document.segments[4],
        Segment::Cooldown {
            duration_seconds: 300,
            power_start: 0.59,
            power_end: 0.25,
        }
    );
}

#[test]
fn test_parse_zwo_intervals_expand() {
    let timeline = parse_zwo_timeline(SAMPLE_ZWO).expect("Should parse ZWO workout");

    // warmup + steady + 4 * (on + off) + steady + cooldown
    assert_eq!(timeline.len(), 12);
    assert_eq!(timeline[2], TimelineEntry::new(30, 1.255, 1.255));
    assert_eq!(timeline[3], TimelineEntry::new(30, 0.25, 0.25));

    let total: u32 = timeline.iter().map(|e| e.duration_seconds).sum();
    assert_eq!(total, 300 + 600 + 240 + 300 + 300);
}

#[test]
fn test_parse_zwo_errors() {
    let no_name = r#"<workout_file><workout><SteadyState Duration="60" Power="0.5"/></workout></workout_file>"#;
    assert_eq!(
        parse_zwo(no_name).unwrap_err(),
        WorkoutParseError::MissingField("name".to_string())
    );

    let empty = r#"<workout_file><name>Empty</name><workout></workout></workout_file>"#;
    assert_eq!(parse_zwo(empty).unwrap_err(), WorkoutParseError::EmptyWorkout);

    let bad_power = r#"<workout_file><name>Bad</name><workout><SteadyState Duration="60" Power="high"/></workout></workout_file>"#;
    assert_eq!(
        parse_zwo(bad_power).unwrap_err(),
        WorkoutParseError::InvalidValue {
            field: "Power".to_string(),
            value: "high".to_string(),
        }
    );
}
