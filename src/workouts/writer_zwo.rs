//! Zwift workout (.zwo) writer.
//!
//! Writes a workout document as `workout_file` XML with quick-xml.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::workouts::types::{ExportError, Segment, WorkoutDocument};

/// Render a document as ZWO XML.
pub fn write_zwo(document: &WorkoutDocument) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 3);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    start(&mut writer, "workout_file")?;

    if let Some(author) = &document.author {
        write_element(&mut writer, "author", author)?;
    }
    write_element(&mut writer, "name", &document.name)?;
    write_element(
        &mut writer,
        "description",
        document.description.as_deref().unwrap_or_default(),
    )?;
    write_element(&mut writer, "sportType", &document.sport_type)?;

    if !document.tags.is_empty() {
        start(&mut writer, "tags")?;
        for tag in &document.tags {
            let mut element = BytesStart::new("tag");
            element.push_attribute(("name", tag.as_str()));
            writer
                .write_event(Event::Empty(element))
                .map_err(|e| ExportError::XmlError(e.to_string()))?;
        }
        end(&mut writer, "tags")?;
    }

    start(&mut writer, "workout")?;
    for segment in &document.segments {
        write_segment(&mut writer, segment)?;
    }
    end(&mut writer, "workout")?;

    end(&mut writer, "workout_file")?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).map_err(|e| ExportError::XmlError(e.to_string()))
}

/// Write one segment as an empty element with attributes.
fn write_segment<W: std::io::Write>(
    writer: &mut Writer<W>,
    segment: &Segment,
) -> Result<(), ExportError> {
    let element = match segment {
        Segment::Warmup {
            duration_seconds,
            power_start,
            power_end,
        } => ramp_element("Warmup", *duration_seconds, *power_start, *power_end),
        Segment::Cooldown {
            duration_seconds,
            power_start,
            power_end,
        } => ramp_element("Cooldown", *duration_seconds, *power_start, *power_end),
        Segment::SteadyState {
            duration_seconds,
            power,
            ..
        } => steady_element(*duration_seconds, *power),
        // ZWO has no band target; the composer normally collapses these
        Segment::Range {
            duration_seconds,
            power_low,
            power_high,
            ..
        } => steady_element(*duration_seconds, (power_low + power_high) / 2.0),
        Segment::Intervals {
            repeat,
            on_duration_seconds,
            off_duration_seconds,
            on_power,
            off_power,
        } => {
            let mut element = BytesStart::new("IntervalsT");
            element.push_attribute(("Repeat", repeat.to_string().as_str()));
            element.push_attribute(("OnDuration", on_duration_seconds.to_string().as_str()));
            element.push_attribute(("OffDuration", off_duration_seconds.to_string().as_str()));
            element.push_attribute(("OnPower", format_power(*on_power).as_str()));
            element.push_attribute(("OffPower", format_power(*off_power).as_str()));
            element
        }
    };

    writer
        .write_event(Event::Empty(element))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    Ok(())
}

fn ramp_element(
    name: &'static str,
    duration_seconds: u32,
    power_start: f32,
    power_end: f32,
) -> BytesStart<'static> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("Duration", duration_seconds.to_string().as_str()));
    element.push_attribute(("PowerLow", format_power(power_start).as_str()));
    element.push_attribute(("PowerHigh", format_power(power_end).as_str()));
    element
}

fn steady_element(duration_seconds: u32, power: f32) -> BytesStart<'static> {
    let mut element = BytesStart::new("SteadyState");
    element.push_attribute(("Duration", duration_seconds.to_string().as_str()));
    element.push_attribute(("Power", format_power(power).as_str()));
    element
}

/// FTP fraction with at most three decimals, e.g. `0.59`.
pub fn format_power(power: f32) -> String {
    let text = format!("{power:.3}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn start<W: std::io::Write>(writer: &mut Writer<W>, name: &str) -> Result<(), ExportError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;
    Ok(())
}

fn end<W: std::io::Write>(writer: &mut Writer<W>, name: &str) -> Result<(), ExportError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;
    Ok(())
}

/// Write a simple element with text content.
fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), ExportError> {
    start(writer, name)?;

    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| ExportError::XmlError(e.to_string()))?;

    end(writer, name)
}
