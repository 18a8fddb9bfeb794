//! ICS document parsing using the icalendar crate's parser.

use std::borrow::Cow;

use icalendar::{
    DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};
use tracing::{debug, warn};

use crate::error::{CalCsvError, CalCsvResult};
use crate::event::{CalendarEvent, EventTable, EventTime};

const BOM: char = '\u{feff}';

/// Parse a complete ICS document into an event table.
///
/// Empty input, or a calendar without VEVENT blocks, gives an empty table.
/// Unbalanced BEGIN/END blocks and malformed content lines are errors.
pub fn parse(raw: &str) -> CalCsvResult<EventTable> {
    let content = raw.strip_prefix(BOM).unwrap_or(raw);
    let unfolded = unfold(content);

    let lines: Vec<&str> = unfolded
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Ok(EventTable::new());
    }

    check_structure(&lines)?;

    let mut normalized = lines
        .iter()
        .map(|line| normalize_case(line))
        .collect::<Vec<_>>()
        .join("\r\n");
    normalized.push_str("\r\n");

    let calendar = read_calendar(&normalized).map_err(|e| CalCsvError::Parse(e.to_string()))?;

    let mut table = EventTable::new();
    let mut ordinal = 0;
    collect_events(&calendar.components, &mut table, &mut ordinal);

    debug!(blocks = ordinal, events = table.len(), "parsed calendar");
    Ok(table)
}

/// Decode a raw buffer and parse it.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn parse_bytes(bytes: &[u8]) -> CalCsvResult<EventTable> {
    let text = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = text {
        warn!("input is not valid UTF-8; invalid sequences were replaced");
    }
    parse(&text)
}

/// Verify every content line has a name/value delimiter and every block is closed.
fn check_structure(lines: &[&str]) -> CalCsvResult<()> {
    let mut open: Vec<&str> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let number = idx + 1;
        let Some((head, value)) = line.split_once(':') else {
            return Err(CalCsvError::Parse(format!(
                "content line {number} has no ':' delimiter"
            )));
        };
        let name = head.split(';').next().unwrap_or(head).trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("BEGIN") {
            open.push(value);
        } else if name.eq_ignore_ascii_case("END") {
            match open.pop() {
                Some(block) if block.eq_ignore_ascii_case(value) => {}
                Some(block) => {
                    return Err(CalCsvError::Parse(format!(
                        "content line {number}: END:{value} does not close BEGIN:{block}"
                    )));
                }
                None => {
                    return Err(CalCsvError::Parse(format!(
                        "content line {number}: END:{value} without a matching BEGIN"
                    )));
                }
            }
        } else if open.is_empty() {
            return Err(CalCsvError::Parse(format!(
                "content line {number}: property {name} outside of any component"
            )));
        }
    }

    match open.last() {
        Some(block) => Err(CalCsvError::Parse(format!("unterminated {block} block"))),
        None => Ok(()),
    }
}

/// Uppercase the property name, parameter names and BEGIN/END values.
///
/// Names are case-insensitive in ICS; component and property lookups below
/// use the uppercase form. Values and parameter values are left untouched.
fn normalize_case(line: &str) -> String {
    let Some((head, value)) = line.split_once(':') else {
        return line.to_string();
    };

    let mut segments = head.split(';');
    let name = segments.next().unwrap_or_default().trim().to_ascii_uppercase();

    let mut out = name.clone();
    for param in segments {
        out.push(';');
        match param.split_once('=') {
            Some((key, val)) => {
                out.push_str(&key.to_ascii_uppercase());
                out.push('=');
                out.push_str(val);
            }
            None => out.push_str(param),
        }
    }

    out.push(':');
    if name == "BEGIN" || name == "END" {
        out.push_str(&value.trim().to_ascii_uppercase());
    } else {
        out.push_str(value);
    }
    out
}

/// Walk the component tree and add every VEVENT to the table in document order.
fn collect_events(components: &[Component], table: &mut EventTable, ordinal: &mut usize) {
    for component in components {
        if component.name == "VEVENT" {
            *ordinal += 1;
            let (key, event) = parse_vevent(component, *ordinal);
            if table.insert(key.clone(), event).is_some() {
                debug!(%key, "duplicate event id, keeping the later block");
            }
        } else {
            collect_events(&component.components, table, ordinal);
        }
    }
}

fn parse_vevent(vevent: &Component, ordinal: usize) -> (String, CalendarEvent) {
    let uid = text_prop(vevent, "UID");
    let summary = text_prop(vevent, "SUMMARY");
    let location = text_prop(vevent, "LOCATION");

    let start = time_prop(vevent, "DTSTART");
    let end = time_prop(vevent, "DTEND").or_else(|| {
        let start = start.as_ref()?;
        let duration = parse_duration(vevent.find_prop("DURATION")?.val.as_ref())?;
        let end = start.shifted(duration);
        debug!(%start, %end, "end derived from DURATION");
        Some(end)
    });

    let participant = vevent
        .find_prop("ORGANIZER")
        .or_else(|| vevent.find_prop("ATTENDEE"))
        .and_then(participant_label);

    let key = match (&uid, vevent.find_prop("RECURRENCE-ID")) {
        (Some(uid), Some(recurrence_id)) => format!("{}/{}", uid, recurrence_id.val.as_ref()),
        (Some(uid), None) => uid.clone(),
        (None, _) => format!("event-{ordinal}"),
    };

    let event = CalendarEvent {
        uid,
        summary,
        start,
        end,
        location,
        participant,
    };

    (key, event)
}

/// Unescaped TEXT value; an empty value counts as absent.
fn text_prop(component: &Component, name: &str) -> Option<String> {
    let value = unescape_text(component.find_prop(name)?.val.as_ref());
    (!value.is_empty()).then_some(value)
}

fn time_prop(component: &Component, name: &str) -> Option<EventTime> {
    let prop = component.find_prop(name)?;
    match DatePerhapsTime::try_from(prop) {
        Ok(dpt) => Some(to_event_time(dpt)),
        Err(_) => {
            debug!(property = name, value = prop.val.as_ref(), "unparseable date value");
            None
        }
    }
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        },
    }
}

/// ORGANIZER/ATTENDEE label: the CN parameter, else the address without `mailto:`.
fn participant_label(prop: &Property) -> Option<String> {
    let name = prop
        .params
        .iter()
        .find(|p| p.key == "CN")
        .and_then(|p| p.val.as_ref().map(|v| v.to_string().trim_matches('"').to_string()))
        .filter(|name| !name.is_empty());

    if name.is_some() {
        return name;
    }

    let value = prop.val.as_ref().trim();
    let address = match value.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("mailto:") => &value[7..],
        _ => value,
    };

    (!address.is_empty()).then(|| address.to_string())
}

/// Parse a DURATION value (`PT1H30M`, `-P1D`, `P2W`).
fn parse_duration(value: &str) -> Option<chrono::Duration> {
    let value = value.trim();
    let negative = value.starts_with('-');
    let unsigned = value.trim_start_matches(['-', '+']);

    let duration = iso8601::duration(unsigned).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let duration = chrono::Duration::from_std(std_duration).ok()?;

    Some(if negative { -duration } else { duration })
}

/// Undo RFC 5545 TEXT escaping (`\,`, `\;`, `\n`, `\\`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
