//! Date and time display conventions for the CSV columns.

use chrono::DateTime;
use chrono_tz::Tz;

/// A display locale: how calendar dates and clock times are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// `3/20/2025`, `03:00 PM`
    #[default]
    EnUs,
    /// `20/03/2025`, `15:00`
    EnGb,
    /// `20.03.2025`, `15:00`
    De,
    /// `20/03/2025`, `15:00`
    Fr,
    /// `2025-03-20`, `15:00`
    Iso,
}

impl Locale {
    /// Map a BCP 47 or POSIX locale name (`de-DE`, `en_GB.UTF-8`) to a preset.
    /// Anything unrecognised falls back to US English.
    pub fn from_tag(tag: &str) -> Locale {
        let tag = tag
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim()
            .replace('_', "-")
            .to_ascii_lowercase();

        let (language, region) = match tag.split_once('-') {
            Some((language, region)) => (language, region),
            None => (tag.as_str(), ""),
        };

        match (language, region) {
            ("iso", _) => Locale::Iso,
            ("de", _) => Locale::De,
            ("fr", _) => Locale::Fr,
            ("en", "gb" | "ie" | "au" | "nz" | "in") => Locale::EnGb,
            _ => Locale::EnUs,
        }
    }

    /// Locale of the current process, from `LC_ALL`, `LC_TIME` or `LANG`.
    pub fn from_env() -> Locale {
        ["LC_ALL", "LC_TIME", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .map(|value| Locale::from_tag(&value))
            .unwrap_or_default()
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::EnGb => "en-GB",
            Locale::De => "de-DE",
            Locale::Fr => "fr-FR",
            Locale::Iso => "iso",
        }
    }

    /// strftime pattern for calendar dates
    pub fn date_pattern(&self) -> &'static str {
        match self {
            Locale::EnUs => "%-m/%-d/%Y",
            Locale::EnGb | Locale::Fr => "%d/%m/%Y",
            Locale::De => "%d.%m.%Y",
            Locale::Iso => "%Y-%m-%d",
        }
    }

    /// strftime pattern for clock times; minutes are always two digits
    pub fn time_pattern(&self) -> &'static str {
        match self {
            Locale::EnUs => "%I:%M %p",
            Locale::EnGb | Locale::De | Locale::Fr | Locale::Iso => "%H:%M",
        }
    }

    pub fn format_date(&self, at: &DateTime<Tz>) -> String {
        at.format(self.date_pattern()).to_string()
    }

    pub fn format_time(&self, at: &DateTime<Tz>) -> String {
        at.format(self.time_pattern()).to_string()
    }
}

/// The system timezone, or UTC when it cannot be determined.
pub fn system_timezone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(Tz::UTC)
}
