//! CSV rendering of an event table.
//!
//! Output is a header row followed by one row per event, comma-joined and
//! newline-separated, UTF-8 encoded with a leading byte-order marker so
//! spreadsheet applications pick the right encoding. Cell values are written
//! verbatim: a value containing a comma or newline shifts the columns of its
//! row.

mod row;

pub use row::{CsvRow, format_hours_minutes};

use chrono_tz::Tz;
use tracing::debug;

use crate::error::{CalCsvError, CalCsvResult};
use crate::event::EventTable;
use crate::locale::Locale;

/// Column names, in output order.
pub const HEADER: [&str; 8] = [
    "Summary",
    "Start Date",
    "End Date",
    "Start Time",
    "End Time",
    "Total Hours",
    "Participant",
    "Location",
];

/// Byte-order marker prepended to every document.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// How dates and times are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub locale: Locale,
    pub timezone: Tz,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            locale: Locale::EnUs,
            timezone: Tz::UTC,
        }
    }
}

/// Derive one row per event, in table order.
pub fn rows(table: &EventTable, options: &RenderOptions) -> Vec<CsvRow> {
    table
        .values()
        .map(|event| CsvRow::from_event(event, options))
        .collect()
}

/// The CSV document as text, BOM included.
pub fn render_text(table: &EventTable, options: &RenderOptions) -> String {
    let lines: Vec<String> = rows(table, options).iter().map(CsvRow::to_line).collect();

    let mut text = String::from('\u{feff}');
    text.push_str(&HEADER.join(","));
    text.push('\n');
    text.push_str(&lines.join("\n"));
    text
}

/// Render the table as UTF-8 CSV bytes.
pub fn render(table: &EventTable, options: &RenderOptions) -> CalCsvResult<Vec<u8>> {
    let text = render_text(table, options);
    let bytes = encode_utf8(&text)?;

    debug!(rows = table.len(), bytes = bytes.len(), "rendered csv");
    Ok(bytes)
}

/// Encode and check the bytes decode back to the same text.
///
/// A `&str` is always valid UTF-8, so this check never fails today. It stays
/// so `Encoding` remains the single failure point if the output encoding
/// ever becomes configurable.
fn encode_utf8(text: &str) -> CalCsvResult<Vec<u8>> {
    let bytes = text.as_bytes().to_vec();

    match std::str::from_utf8(&bytes) {
        Ok(decoded) if decoded == text => Ok(bytes),
        Ok(_) => Err(CalCsvError::Encoding(
            "encoded output does not match the rendered text".to_string(),
        )),
        Err(e) => Err(CalCsvError::Encoding(e.to_string())),
    }
}
