//! Date helper functions
//!
//! Entry dates stay opaque strings everywhere in the pipeline; these helpers
//! only affect how a date is displayed.

use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};

/// Parse a front-matter date in the usual formats
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_local())
}

/// Display form of a date using a Moment.js-compatible format string
///
/// Unparseable dates are shown as written.
///
/// # Examples
/// ```ignore
/// date_text("2024-01-05", "MMMM D, YYYY") // -> "January 5, 2024"
/// ```
pub fn date_text(raw: &str, format: &str) -> String {
    let Some(dt) = parse_date(raw) else {
        return raw.to_string();
    };

    let mut text = String::new();
    match write!(text, "{}", dt.format(&moment_to_chrono_format(format))) {
        Ok(()) => text,
        Err(_) => {
            tracing::warn!("Unusable date format {:?}, showing {:?} as written", format, raw);
            raw.to_string()
        }
    }
}

/// Machine-readable form for `<time datetime>`, empty when unparseable
pub fn date_xml(raw: &str) -> String {
    parse_date(raw)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Convert Moment.js format to chrono format
///
/// Text outside the known tokens is kept literally, `%` included.
fn moment_to_chrono_format(format: &str) -> String {
    // Longest token first at every position
    const TOKENS: [(&str, &str); 14] = [
        ("YYYY", "%Y"),
        ("MMMM", "%B"),
        ("DDDD", "%j"),
        ("dddd", "%A"),
        ("MMM", "%b"),
        ("ddd", "%a"),
        ("YY", "%y"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("D", "%-d"),
    ];

    let mut result = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'outer: while let Some(c) = rest.chars().next() {
        for (from, to) in TOKENS {
            if let Some(tail) = rest.strip_prefix(from) {
                result.push_str(to);
                rest = tail;
                continue 'outer;
            }
        }
        if c == '%' {
            result.push_str("%%");
        } else {
            result.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    result
}
