//! In-app clock representation (`MM:SS.mmm`).
//!
//! Minutes are not wrapped into hours: one hour and five minutes is
//! `65:00.000`. The SRT interchange form lives in the parser/writer.

use super::error::ParseError;

/// Format milliseconds as `MM:SS.mmm`.
pub fn format_clock(ms: u64) -> String {
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let mins = total_secs / 60;
    format!("{:02}:{:02}.{:03}", mins, secs, millis)
}

/// Parse `MM:SS.mmm` (also `MM:SS`, `MM:SS.m`, `MM:SS,mmm`) into milliseconds.
///
/// Seconds must be below 60; minutes are unbounded.
pub fn parse_clock(s: &str) -> Result<u64, ParseError> {
    let invalid = || ParseError::InvalidClock(s.to_string());
    let trimmed = s.trim();

    let (mins, rest) = trimmed.split_once(':').ok_or_else(invalid)?;
    let (secs, frac) = match rest.split_once(['.', ',']) {
        Some((secs, frac)) => (secs, Some(frac)),
        None => (rest, None),
    };

    if !is_digits(mins) || !is_digits(secs) || secs.len() > 2 {
        return Err(invalid());
    }

    let mins: u64 = mins.parse().map_err(|_| invalid())?;
    let secs: u64 = secs.parse().map_err(|_| invalid())?;
    if secs >= 60 {
        return Err(invalid());
    }

    let millis = match frac {
        Some(frac) => parse_fraction_ms(frac).ok_or_else(invalid)?,
        None => 0,
    };

    mins.checked_mul(60_000)
        .and_then(|m| m.checked_add(secs * 1000 + millis))
        .ok_or_else(invalid)
}

/// Convert a fractional-second digit string to milliseconds.
///
/// `"5"` is 500ms, `"24"` is 240ms, digits beyond the third are truncated.
pub(crate) fn parse_fraction_ms(frac: &str) -> Option<u64> {
    if !is_digits(frac) {
        return None;
    }
    let digits: String = frac.chars().take(3).collect();
    let value: u64 = digits.parse().ok()?;
    Some(match digits.len() {
        1 => value * 100,
        2 => value * 10,
        _ => value,
    })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Serde adapter storing millisecond fields as `MM:SS.mmm` strings.
pub mod serde_clock {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ms: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_clock(*ms))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_clock(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00.000");
        assert_eq!(format_clock(10_240), "00:10.240");
        assert_eq!(format_clock(61_005), "01:01.005");
        // Hours fold into minutes
        assert_eq!(format_clock(3_900_000), "65:00.000");
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("00:10.240").unwrap(), 10_240);
        assert_eq!(parse_clock("00:12.8").unwrap(), 12_800);
        assert_eq!(parse_clock("01:00").unwrap(), 60_000);
        assert_eq!(parse_clock("65:00.000").unwrap(), 3_900_000);
        assert_eq!(parse_clock(" 00:01,500 ").unwrap(), 1_500);
    }

    #[test]
    fn test_parse_clock_rejects_garbage() {
        for bad in ["", "10", "00:60.000", "aa:10.000", "00:1x.000", "00:10.", "-1:00.000"] {
            assert!(parse_clock(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn fraction_digits_are_normalized() {
        assert_eq!(parse_fraction_ms("5"), Some(500));
        assert_eq!(parse_fraction_ms("24"), Some(240));
        assert_eq!(parse_fraction_ms("240"), Some(240));
        assert_eq!(parse_fraction_ms("2405"), Some(240));
        assert_eq!(parse_fraction_ms(""), None);
    }
}
