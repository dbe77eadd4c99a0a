//! Zwift workout (.zwo) reader.
//!
//! Reads a rendered ZWO file back into a `WorkoutDocument` so its timeline
//! can be checked against the steps it was built from.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::workouts::document::SPORT_TYPE;
use crate::workouts::types::{Segment, TimelineEntry, WorkoutDocument, WorkoutParseError};

/// Parse ZWO XML content.
pub fn parse_zwo(content: &str) -> Result<WorkoutDocument, WorkoutParseError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut name: Option<String> = None;
    let mut author: Option<String> = None;
    let mut description: Option<String> = None;
    let mut sport_type: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut segments: Vec<Segment> = Vec::new();

    let mut in_workout = false;
    let mut current_element: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let element = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match element.as_str() {
                    "name" | "author" | "description" | "sportType" => {
                        current_element = Some(element);
                    }
                    "workout" => in_workout = true,
                    "tag" => tags.extend(tag_name(e)),
                    _ if in_workout => segments.extend(parse_segment(&element, e)?),
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let element = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if in_workout {
                    segments.extend(parse_segment(&element, e)?);
                } else if element == "tag" {
                    tags.extend(tag_name(e));
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(ref elem) = current_element {
                    let text = e
                        .unescape()
                        .map_err(|e| {
                            WorkoutParseError::InvalidXml(format!("Failed to unescape text: {e}"))
                        })?
                        .to_string();
                    match elem.as_str() {
                        "name" => name = Some(text),
                        "author" => author = Some(text),
                        "description" => description = Some(text),
                        "sportType" => sport_type = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"workout" {
                    in_workout = false;
                }
                current_element = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(WorkoutParseError::InvalidXml(format!(
                    "XML parsing error: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if segments.is_empty() {
        return Err(WorkoutParseError::EmptyWorkout);
    }

    Ok(WorkoutDocument {
        name: name.ok_or_else(|| WorkoutParseError::MissingField("name".to_string()))?,
        author,
        description,
        sport_type: sport_type.unwrap_or_else(|| SPORT_TYPE.to_string()),
        tags,
        segments,
    })
}

/// Parse ZWO content straight to its flat timeline.
pub fn parse_zwo_timeline(content: &str) -> Result<Vec<TimelineEntry>, WorkoutParseError> {
    Ok(parse_zwo(content)?.timeline())
}

fn tag_name(event: &BytesStart<'_>) -> Option<String> {
    event
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"name")
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Attribute lookup helper for one segment element.
struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn of(event: &BytesStart<'_>) -> Self {
        Self(
            event
                .attributes()
                .flatten()
                .map(|attr| {
                    (
                        String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                        String::from_utf8_lossy(&attr.value).to_string(),
                    )
                })
                .collect(),
        )
    }

    fn raw(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required<T: std::str::FromStr>(&self, key: &str) -> Result<T, WorkoutParseError> {
        let value = self
            .raw(key)
            .ok_or_else(|| WorkoutParseError::MissingField(key.to_string()))?;
        value.parse().map_err(|_| WorkoutParseError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Parse a single segment element; unknown elements are skipped.
fn parse_segment(
    element_name: &str,
    event: &BytesStart<'_>,
) -> Result<Option<Segment>, WorkoutParseError> {
    let attrs = Attributes::of(event);

    let segment = match element_name {
        "Warmup" | "Ramp" => Segment::Warmup {
            duration_seconds: attrs.required("Duration")?,
            power_start: attrs.required("PowerLow")?,
            power_end: attrs.required("PowerHigh")?,
        },
        "Cooldown" => Segment::Cooldown {
            duration_seconds: attrs.required("Duration")?,
            power_start: attrs.required("PowerLow")?,
            power_end: attrs.required("PowerHigh")?,
        },
        "SteadyState" => Segment::SteadyState {
            duration_seconds: attrs.required("Duration")?,
            power: attrs.required("Power")?,
            label: None,
        },
        "IntervalsT" => Segment::Intervals {
            repeat: attrs.required("Repeat")?,
            on_duration_seconds: attrs.required("OnDuration")?,
            off_duration_seconds: attrs.required("OffDuration")?,
            on_power: attrs.required("OnPower")?,
            off_power: attrs.required("OffPower")?,
        },
        _ => return Ok(None),
    };

    Ok(Some(segment))
}
