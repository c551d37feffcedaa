//! Timecode parsing and formatting for clip in-time offsets.
//!
//! Offsets are written `H:MM:SS.fff` on the command line. Shorter forms
//! (`MM:SS.fff`, `SS.fff`, `SS`) are accepted too. Blu-ray clip timing runs
//! on a 45 kHz clock, so offsets are also convertible to ticks.

use std::time::Duration;

use crate::error::{BdclipError, BdclipResult};

/// Ticks per second of the Blu-ray presentation clock.
pub const BD_CLOCK_HZ: u64 = 45_000;

/// Parse an `H:MM:SS.fff` timecode into a duration.
pub fn parse_timecode(input: &str) -> BdclipResult<Duration> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BdclipError::timecode(input, "empty timecode"));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(BdclipError::timecode(input, "too many ':' separators"));
    }

    let (seconds_part, fraction) = match parts[parts.len() - 1].split_once('.') {
        Some((secs, frac)) => (secs, Some(frac)),
        None => (parts[parts.len() - 1], None),
    };

    let seconds = parse_component(input, seconds_part, "seconds")?;
    let minutes = match parts.len() {
        1 => 0,
        _ => parse_component(input, parts[parts.len() - 2], "minutes")?,
    };
    let hours = match parts.len() {
        3 => parse_component(input, parts[0], "hours")?,
        _ => 0,
    };

    if parts.len() > 1 && seconds >= 60 {
        return Err(BdclipError::timecode(input, "seconds must be below 60"));
    }
    if parts.len() > 2 && minutes >= 60 {
        return Err(BdclipError::timecode(input, "minutes must be below 60"));
    }

    let nanos = match fraction {
        Some(frac) => parse_fraction_nanos(input, frac)?,
        None => 0,
    };

    let total_secs = hours
        .checked_mul(3600)
        .zip(minutes.checked_mul(60))
        .and_then(|(h, m)| h.checked_add(m))
        .and_then(|t| t.checked_add(seconds))
        .ok_or_else(|| BdclipError::timecode(input, "timecode out of range"))?;

    Ok(Duration::new(total_secs, nanos))
}

/// Format a duration as `H:MM:SS.fff`.
pub fn format_timecode(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Convert a duration to 45 kHz clock ticks (truncating).
pub fn to_45khz_ticks(duration: Duration) -> u64 {
    let ticks = duration.as_nanos() * BD_CLOCK_HZ as u128 / 1_000_000_000;
    ticks.min(u64::MAX as u128) as u64
}

fn parse_component(input: &str, part: &str, label: &str) -> BdclipResult<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BdclipError::timecode(
            input,
            format!("{label} must be a non-negative integer"),
        ));
    }
    part.parse::<u64>()
        .map_err(|_| BdclipError::timecode(input, format!("{label} out of range")))
}

fn parse_fraction_nanos(input: &str, frac: &str) -> BdclipResult<u32> {
    if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BdclipError::timecode(
            input,
            "fraction must be 1 to 9 digits",
        ));
    }
    let padded = format!("{frac:0<9}");
    padded
        .parse::<u32>()
        .map_err(|_| BdclipError::timecode(input, "fraction out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_full_timecode() {
        let d = parse_timecode("1:02:03.450").unwrap();
        assert_eq!(d, Duration::from_millis(3_723_450));
    }

    #[test]
    fn test_parse_short_forms() {
        assert_eq!(parse_timecode("0:00:00.000").unwrap(), Duration::ZERO);
        assert_eq!(parse_timecode("02:30").unwrap(), Duration::from_secs(150));
        assert_eq!(
            parse_timecode("12.5").unwrap(),
            Duration::from_millis(12_500)
        );
        assert_eq!(parse_timecode("600").unwrap(), Duration::from_secs(600));
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "1:2:3:4", "0:61:00", "0:00:75", "a:00:00", "0:00:01.", "-1:00:00"] {
            assert!(parse_timecode(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_format_timecode() {
        assert_eq!(format_timecode(Duration::from_millis(3_723_450)), "1:02:03.450");
        assert_eq!(format_timecode(Duration::ZERO), "0:00:00.000");
    }

    #[test]
    fn test_45khz_ticks() {
        assert_eq!(to_45khz_ticks(Duration::from_secs(1)), 45_000);
        assert_eq!(to_45khz_ticks(Duration::from_millis(600_000)), 27_000_000);
    }

    proptest! {
        #[test]
        fn prop_millisecond_timecodes_survive_formatting(ms in 0u64..360_000_000) {
            let d = Duration::from_millis(ms);
            prop_assert_eq!(parse_timecode(&format_timecode(d)).unwrap(), d);
        }

        #[test]
        fn prop_arbitrary_input_never_panics(input in ".{0,24}") {
            let _ = parse_timecode(&input);
        }
    }
}
