//! Conversion between textual timecodes and seconds.
//! Two shapes are understood: `MM:SS.mmm` and `HH:MM:SS.mmm`.

use thiserror::Error;
use tracing::trace;

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1000;

/// Reasons a timecode could not be turned into seconds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimecodeError {
    /// The text did not split into two or three `:`-separated fields.
    #[error("timecode '{timecode}' has {count} field(s), expected 2 or 3")]
    FieldCount { timecode: String, count: usize },
    /// One of the fields is not an unsigned decimal number.
    #[error("timecode '{timecode}' has a non-numeric field '{field}'")]
    InvalidField { timecode: String, field: String },
}

/// Parse a field made only of ASCII digits.
fn whole_number(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds.
/// Hours, minutes and whole seconds are integers; the seconds field may carry
/// a decimal fraction. Up to three fraction digits are summed as whole
/// milliseconds, so `00:12.520` gives exactly `12.52`.
pub fn parse_timecode(text: &str) -> Result<f64, TimecodeError> {
    let text = text.trim();
    let fields: Vec<&str> = text.split(':').map(str::trim).collect();
    let invalid = |field: &str| TimecodeError::InvalidField {
        timecode: text.to_string(),
        field: field.to_string(),
    };
    let (hours, minutes, seconds) = match fields.as_slice() {
        [h, m, s] => (whole_number(h).ok_or_else(|| invalid(*h))?, *m, *s),
        [m, s] => (0, *m, *s),
        _ => {
            return Err(TimecodeError::FieldCount {
                timecode: text.to_string(),
                count: fields.len(),
            })
        }
    };
    let minutes = whole_number(minutes).ok_or_else(|| invalid(minutes))?;
    let (secs, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    let secs = whole_number(secs).ok_or_else(|| invalid(seconds))?;
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(seconds));
    }
    let total_secs = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(secs))
        .ok_or_else(|| invalid(text))?;
    if fraction.len() <= 3 {
        let millis = fraction
            .bytes()
            .chain(std::iter::repeat(b'0'))
            .take(3)
            .fold(0, |acc, b| acc * 10 + u64::from(b - b'0'));
        let total_ms = total_secs
            .checked_mul(MS_PER_SECOND)
            .and_then(|ms| ms.checked_add(millis))
            .ok_or_else(|| invalid(text))?;
        Ok(total_ms as f64 / 1000.0)
    } else {
        let fraction = format!("0.{fraction}")
            .parse::<f64>()
            .map_err(|_| invalid(seconds))?;
        Ok(total_secs as f64 + fraction)
    }
}

/// Parse a timecode the way the lesson editor always has: a timecode of the
/// wrong shape is `0.0` and a non-numeric field turns the result into `NaN`.
pub fn parse_timecode_lossy(text: &str) -> f64 {
    match parse_timecode(text) {
        Ok(seconds) => seconds,
        Err(TimecodeError::FieldCount { .. }) => 0.0,
        Err(err @ TimecodeError::InvalidField { .. }) => {
            trace!("parse_timecode_lossy: {err}");
            f64::NAN
        }
    }
}

/// Format seconds as `MM:SS.mmm`, or `HH:MM:SS.mmm` once an hour is reached.
/// The value is rounded to whole milliseconds first; negative and non-finite
/// inputs format as zero.
pub fn format_timecode(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let hours = total_ms / MS_PER_HOUR;
    let minutes = (total_ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let secs = (total_ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = total_ms % MS_PER_SECOND;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
    } else {
        format!("{minutes:02}:{secs:02}.{millis:03}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Both shapes resolve to the same kind of seconds value.
    #[test]
    fn parses_both_shapes() {
        assert_eq!(parse_timecode("01:01:01.250").unwrap(), 3661.25);
        assert_eq!(parse_timecode("01:01.250").unwrap(), 61.25);
        assert_eq!(parse_timecode("00:12.520").unwrap(), 12.52);
    }

    /// Anything other than two or three fields is reported, not guessed.
    #[test]
    fn rejects_wrong_field_count() {
        let err = parse_timecode("12.520").unwrap_err();
        assert_eq!(
            err,
            TimecodeError::FieldCount {
                timecode: "12.520".into(),
                count: 1
            }
        );
        assert!(matches!(
            parse_timecode("1:2:3:4.000"),
            Err(TimecodeError::FieldCount { count: 4, .. })
        ));
    }

    /// Non-numeric fields are errors in the strict parser.
    #[test]
    fn rejects_non_numeric_field() {
        assert!(matches!(
            parse_timecode("aa:01.000"),
            Err(TimecodeError::InvalidField { ref field, .. }) if field == "aa"
        ));
        assert!(parse_timecode("00:inf").is_err());
        assert!(parse_timecode("00:-1.000").is_err());
        assert!(parse_timecode("00:01.2x0").is_err());
    }

    /// Hours and minutes must be plain integers.
    #[test]
    fn rejects_fractional_or_exponent_fields() {
        assert!(matches!(
            parse_timecode("01.5:00.000"),
            Err(TimecodeError::InvalidField { ref field, .. }) if field == "01.5"
        ));
        assert!(matches!(
            parse_timecode("1e1:00.000"),
            Err(TimecodeError::InvalidField { ref field, .. }) if field == "1e1"
        ));
        assert!(parse_timecode("01:1e1:00.000").is_err());
    }

    /// Millisecond timecodes parse to the same value as the decimal literal.
    #[test]
    fn millisecond_values_are_exact() {
        assert_eq!(parse_timecode("01:05.802").unwrap(), 65.802);
        assert_eq!(parse_timecode("01:09.790").unwrap(), 69.79);
        assert_eq!(parse_timecode("02:11.604").unwrap(), 131.604);
        assert_eq!(parse_timecode("00:01.5").unwrap(), 1.5);
        assert_eq!(parse_timecode("00:07").unwrap(), 7.0);
        assert_eq!(parse_timecode("00:00.0001").unwrap(), 0.0001);
    }

    /// Formatting then parsing gives back every millisecond value unchanged.
    #[test]
    fn format_then_parse_is_exact() {
        for ms in (0..8_000_000u64).step_by(997) {
            let seconds = ms as f64 / 1000.0;
            assert_eq!(parse_timecode(&format_timecode(seconds)).unwrap(), seconds, "{ms}");
        }
    }

    /// The lossy parser falls back to zero or NaN instead of failing.
    #[test]
    fn lossy_parser_falls_back() {
        assert_eq!(parse_timecode_lossy(""), 0.0);
        assert_eq!(parse_timecode_lossy("42"), 0.0);
        assert!(parse_timecode_lossy("00:xx.000").is_nan());
        assert_eq!(parse_timecode_lossy("02:00.500"), 120.5);
    }

    /// The hour field only appears once the value reaches an hour.
    #[test]
    fn formats_around_hour_boundary() {
        assert_eq!(format_timecode(3661.25), "01:01:01.250");
        assert_eq!(format_timecode(61.25), "01:01.250");
        assert_eq!(format_timecode(3599.999), "59:59.999");
        assert_eq!(format_timecode(3600.0), "01:00:00.000");
        assert_eq!(format_timecode(0.0), "00:00.000");
    }

    /// Rounding carries into the next field instead of printing `60.000`.
    #[test]
    fn rounding_carries_over() {
        assert_eq!(format_timecode(59.9996), "01:00.000");
        assert_eq!(format_timecode(12.52), "00:12.520");
    }

    /// Values the formatter does not cover are clamped to zero.
    #[test]
    fn formats_out_of_range_as_zero() {
        assert_eq!(format_timecode(-3.0), "00:00.000");
        assert_eq!(format_timecode(f64::NAN), "00:00.000");
    }

    /// More than 99 hours keeps every hour digit.
    #[test]
    fn formats_long_durations() {
        assert_eq!(format_timecode(360_000.001), "100:00:00.001");
    }
}
