//! ICS document parsing.
//!
//! Turns a whole iCalendar document into an [`EventTable`](crate::event::EventTable).
//! Property parsing is delegated to the `icalendar` crate; this module adds the
//! block-structure checks, event-id assignment and field extraction.

mod parse;

pub use parse::{parse, parse_bytes};
