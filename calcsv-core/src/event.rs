//! Parsed calendar event types.
//!
//! These are the records the ICS parser produces and the CSV renderer
//! consumes. Every field that may be missing in the source is an explicit
//! `Option`, so absent data can only ever degrade to an empty cell.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use indexmap::IndexMap;

/// Parsed events keyed by event id, in the order they were first seen in the document.
pub type EventTable = IndexMap<String, CalendarEvent>;

/// A single VEVENT block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub location: Option<String>,
    /// Organizer, or the first attendee when there is no organizer
    pub participant: Option<String>,
}

impl CalendarEvent {
    /// An event with just a summary; handy for building tables by hand.
    pub fn with_summary(summary: impl Into<String>) -> Self {
        CalendarEvent {
            summary: Some(summary.into()),
            ..Default::default()
        }
    }
}

/// A DTSTART/DTEND value, keeping the timezone form it was written in.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// All-day value (`VALUE=DATE`)
    Date(NaiveDate),
    /// `...Z` suffixed value
    DateTimeUtc(DateTime<Utc>),
    /// No zone information; read in whatever zone the output is displayed in
    DateTimeFloating(NaiveDateTime),
    /// Local time with a `TZID` parameter
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

impl EventTime {
    /// Resolve to an instant shown in `display`.
    ///
    /// All-day dates start at local midnight. A `TZID` that is not a known
    /// IANA name is treated like a floating time. Returns `None` only when the
    /// local time does not exist in the zone and cannot be shifted into it.
    pub fn resolve(&self, display: Tz) -> Option<DateTime<Tz>> {
        match self {
            EventTime::Date(date) => localize(&display, date.and_hms_opt(0, 0, 0)?),
            EventTime::DateTimeUtc(dt) => Some(dt.with_timezone(&display)),
            EventTime::DateTimeFloating(naive) => localize(&display, *naive),
            EventTime::DateTimeZoned { datetime, tzid } => match parse_tzid(tzid) {
                Some(source) => {
                    localize(&source, *datetime).map(|dt| dt.with_timezone(&display))
                }
                None => localize(&display, *datetime),
            },
        }
    }

    /// Shift by a fixed duration, keeping the original form.
    pub fn shifted(&self, by: Duration) -> EventTime {
        match self {
            EventTime::Date(date) => match date.and_hms_opt(0, 0, 0) {
                Some(midnight) if by.num_seconds() % 86_400 != 0 => {
                    EventTime::DateTimeFloating(midnight + by)
                }
                _ => EventTime::Date(*date + Duration::days(by.num_days())),
            },
            EventTime::DateTimeUtc(dt) => EventTime::DateTimeUtc(*dt + by),
            EventTime::DateTimeFloating(dt) => EventTime::DateTimeFloating(*dt + by),
            EventTime::DateTimeZoned { datetime, tzid } => EventTime::DateTimeZoned {
                datetime: *datetime + by,
                tzid: tzid.clone(),
            },
        }
    }
}

/// ICS-like form used in log output.
impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            EventTime::DateTimeUtc(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            EventTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            EventTime::DateTimeZoned { datetime, tzid } => {
                write!(f, "{} ({})", datetime.format("%Y-%m-%dT%H:%M:%S"), tzid)
            }
        }
    }
}

/// Some producers write TZIDs with a leading slash (`/Europe/Berlin`).
fn parse_tzid(tzid: &str) -> Option<Tz> {
    tzid.trim_start_matches('/').parse::<Tz>().ok()
}

/// Place a wall-clock time in `tz`, moving forward an hour when it falls in a DST gap.
fn localize(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_utc_resolves_into_display_zone() {
        let time = EventTime::DateTimeUtc(naive(2025, 3, 20, 15, 0).and_utc());
        let resolved = time.resolve(chrono_tz::Europe::Berlin).unwrap();

        assert_eq!(resolved.naive_local(), naive(2025, 3, 20, 16, 0));
    }

    #[test]
    fn test_floating_keeps_wall_clock() {
        let time = EventTime::DateTimeFloating(naive(2025, 3, 20, 9, 30));
        let resolved = time.resolve(chrono_tz::America::New_York).unwrap();

        assert_eq!(resolved.naive_local(), naive(2025, 3, 20, 9, 30));
    }

    #[test]
    fn test_zoned_converts_to_display_zone() {
        let time = EventTime::DateTimeZoned {
            datetime: naive(2025, 1, 10, 9, 0),
            tzid: "America/New_York".to_string(),
        };
        let resolved = time.resolve(Tz::UTC).unwrap();

        assert_eq!(resolved.naive_local(), naive(2025, 1, 10, 14, 0));
    }

    #[test]
    fn test_unknown_tzid_is_treated_as_floating() {
        let time = EventTime::DateTimeZoned {
            datetime: naive(2025, 1, 10, 9, 0),
            tzid: "W. Europe Standard Time".to_string(),
        };
        let resolved = time.resolve(Tz::UTC).unwrap();

        assert_eq!(resolved.naive_local(), naive(2025, 1, 10, 9, 0));
    }

    #[test]
    fn test_all_day_starts_at_local_midnight() {
        let time = EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 4).unwrap());
        let resolved = time.resolve(chrono_tz::Europe::Paris).unwrap();

        assert_eq!(resolved.naive_local(), naive(2025, 7, 4, 0, 0));
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        // 02:30 does not exist in Berlin on 2025-03-30
        let time = EventTime::DateTimeFloating(naive(2025, 3, 30, 2, 30));
        let resolved = time.resolve(chrono_tz::Europe::Berlin).unwrap();

        assert_eq!(resolved.naive_local(), naive(2025, 3, 30, 3, 30));
    }

    #[test]
    fn test_shifted_all_day_by_whole_days_stays_a_date() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        let shifted = EventTime::Date(date).shifted(Duration::days(2));

        assert_eq!(
            shifted,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 6).unwrap())
        );
    }

    #[test]
    fn test_display_forms() {
        let date = EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 4).unwrap());
        let utc = EventTime::DateTimeUtc(naive(2025, 3, 20, 15, 0).and_utc());
        let floating = EventTime::DateTimeFloating(naive(2025, 3, 20, 9, 30));
        let zoned = EventTime::DateTimeZoned {
            datetime: naive(2025, 1, 10, 9, 0),
            tzid: "Europe/Berlin".to_string(),
        };

        assert_eq!(date.to_string(), "2025-07-04");
        assert_eq!(utc.to_string(), "2025-03-20T15:00:00Z");
        assert_eq!(floating.to_string(), "2025-03-20T09:30:00");
        assert_eq!(zoned.to_string(), "2025-01-10T09:00:00 (Europe/Berlin)");
    }
}
