//! ICS to CSV conversion.
//!
//! This crate holds everything the calcsv binaries share:
//! - `ics` parses a calendar document into an [`EventTable`]
//! - `csv` derives display rows and encodes the CSV document
//! - `source` acquires the raw calendar (upload or URL)
//! - `config` loads runtime settings

pub mod config;
pub mod csv;
pub mod error;
pub mod event;
pub mod ics;
pub mod locale;
pub mod source;

pub use csv::{HEADER, RenderOptions, render};
pub use error::{CalCsvError, CalCsvResult};
pub use event::{CalendarEvent, EventTable, EventTime};
pub use ics::{parse, parse_bytes};
pub use locale::Locale;

/// Parse a raw calendar buffer and render it as CSV bytes.
///
/// Nothing is returned on failure; there is no partial output.
pub fn convert(raw: &[u8], options: &RenderOptions) -> CalCsvResult<Vec<u8>> {
    let table = parse_bytes(raw)?;
    render(&table, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::UTF8_BOM;

    const HEADER_LINE: &str =
        "Summary,Start Date,End Date,Start Time,End Time,Total Hours,Participant,Location";

    fn convert_text(ics: &str) -> String {
        let bytes = convert(ics.as_bytes(), &RenderOptions::default()).expect("Should convert");
        assert_eq!(&bytes[..3], &UTF8_BOM);
        String::from_utf8(bytes[3..].to_vec()).unwrap()
    }

    #[test]
    fn test_convert_document() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:review\r\n\
SUMMARY:Design review\r\n\
DTSTART:20250320T090000Z\r\n\
DTEND:20250320T104500Z\r\n\
LOCATION:Room 4\r\n\
ORGANIZER;CN=Alice:mailto:alice@example.com\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:workshop\r\n\
SUMMARY:Workshop\r\n\
DTSTART:20250321T130000Z\r\n\
DTEND:20250321T150000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:sync\r\n\
SUMMARY:Team Sync\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let text = convert_text(ics);
        let lines: Vec<&str> = text.split('\n').collect();

        assert_eq!(
            lines,
            [
                HEADER_LINE,
                "Design review,3/20/2025,3/20/2025,09:00 AM,10:45 AM,1:45,Alice,Room 4",
                "Workshop,3/21/2025,3/21/2025,01:00 PM,03:00 PM,2:00,,",
                "Team Sync,,,,,,,",
            ]
        );
    }

    #[test]
    fn test_convert_rounding_quirk_end_to_end() {
        let ics = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
UID:long\r\n\
SUMMARY:Almost two hours\r\n\
DTSTART:20250320T090000Z\r\n\
DTEND:20250320T105945Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let text = convert_text(ics);

        assert!(text.ends_with(",1:60,,"), "got {text}");
    }

    #[test]
    fn test_convert_calendar_without_events() {
        let text = convert_text("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n");
        assert_eq!(text, format!("{HEADER_LINE}\n"));
    }

    #[test]
    fn test_convert_malformed_input_fails_without_output() {
        let ics = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:x\r\nSUMMARY:Never closed\r\n";
        let result = convert(ics.as_bytes(), &RenderOptions::default());

        assert!(matches!(result, Err(CalCsvError::Parse(_))));
    }
}
