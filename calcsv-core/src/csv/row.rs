//! Per-event row derivation.

use crate::event::CalendarEvent;

use super::RenderOptions;

/// One output row; cells line up with [`HEADER`](super::HEADER).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    pub summary: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub total_hours: String,
    pub participant: String,
    pub location: String,
}

impl CsvRow {
    /// Derive the display cells for an event. Missing fields become empty cells.
    pub fn from_event(event: &CalendarEvent, options: &RenderOptions) -> Self {
        let start = event
            .start
            .as_ref()
            .and_then(|t| t.resolve(options.timezone));
        let end = event.end.as_ref().and_then(|t| t.resolve(options.timezone));
        let locale = options.locale;

        let total_hours = match (&start, &end) {
            (Some(start), Some(end)) => {
                let elapsed = end.signed_duration_since(start);
                format_hours_minutes(elapsed.num_milliseconds() as f64 / 3_600_000.0)
            }
            _ => String::new(),
        };

        CsvRow {
            summary: event.summary.clone().unwrap_or_default(),
            start_date: start.as_ref().map(|t| locale.format_date(t)).unwrap_or_default(),
            end_date: end.as_ref().map(|t| locale.format_date(t)).unwrap_or_default(),
            start_time: start.as_ref().map(|t| locale.format_time(t)).unwrap_or_default(),
            end_time: end.as_ref().map(|t| locale.format_time(t)).unwrap_or_default(),
            total_hours,
            participant: event.participant.clone().unwrap_or_default(),
            location: event.location.clone().unwrap_or_default(),
        }
    }

    pub fn cells(&self) -> [&str; 8] {
        [
            &self.summary,
            &self.start_date,
            &self.end_date,
            &self.start_time,
            &self.end_time,
            &self.total_hours,
            &self.participant,
            &self.location,
        ]
    }

    /// Comma-joined cells. Values are written as-is, without quoting.
    pub fn to_line(&self) -> String {
        self.cells().join(",")
    }
}

/// Render fractional hours as `H:MM`.
///
/// Hours are floored and the remainder is rounded to whole minutes. A
/// remainder that rounds up to 60 is not carried into the hour (`1:60`), and
/// negative spans go through the same arithmetic (`-0.25` gives `-1:45`).
pub fn format_hours_minutes(total_hours: f64) -> String {
    let hours = total_hours.floor();
    let minutes = ((total_hours - hours) * 60.0).round();
    format!("{}:{:02}", hours as i64, minutes as i64)
}
