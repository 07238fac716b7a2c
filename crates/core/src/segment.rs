//! A single timed caption and the line grammar it is written in:
//! `[<start> --> <end>]  <text>`.

use crate::timecode::{format_timecode, parse_timecode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

/// Matches one caption line, capturing start, end and the remaining text.
static SEGMENT_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[((?:\d{2,}:)?\d{2}:\d{2}\.\d{3})\s*-->\s*((?:\d{2,}:)?\d{2}:\d{2}\.\d{3})\]\s*(.*)$")
        .expect("segment line regex is valid")
});

/// One caption: visible from `start_time` to `end_time`, in seconds.
/// Field names follow the backend's JSON (`startTime`, `endTime`, `text`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

/// Problems the codec lets through and leaves to its callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentIssue {
    #[error("{0} time is not a finite number")]
    NonFiniteTime(&'static str),
    #[error("{0} time is negative")]
    NegativeTime(&'static str),
    #[error("ends at {end} before it starts at {start}")]
    EndBeforeStart { start: f64, end: f64 },
    #[error("text is empty")]
    EmptyText,
    #[error("text spans several lines and will not survive encoding")]
    MultiLineText,
}

impl SubtitleSegment {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
        }
    }

    /// Render the segment as one caption line.
    pub fn to_line(&self) -> String {
        format!(
            "[{} --> {}]  {}",
            format_timecode(self.start_time),
            format_timecode(self.end_time),
            self.text
        )
    }

    /// Check the segment for values the codec passes through unchecked.
    pub fn issues(&self) -> Vec<SegmentIssue> {
        let mut issues = Vec::new();
        for (name, value) in [("start", self.start_time), ("end", self.end_time)] {
            if !value.is_finite() {
                issues.push(SegmentIssue::NonFiniteTime(name));
            } else if value < 0.0 {
                issues.push(SegmentIssue::NegativeTime(name));
            }
        }
        if self.end_time < self.start_time {
            issues.push(SegmentIssue::EndBeforeStart {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if self.text.trim().is_empty() {
            issues.push(SegmentIssue::EmptyText);
        } else if self.text.contains(['\n', '\r']) {
            issues.push(SegmentIssue::MultiLineText);
        }
        issues
    }
}

/// Parse one caption line. Blank lines, lines outside the grammar and lines
/// without text give `None`. Start and end may use different timecode shapes.
pub fn parse_segment_line(line: &str) -> Option<SubtitleSegment> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let caps = SEGMENT_LINE_REGEX.captures(line)?;
    let text = caps.get(3).map_or("", |m| m.as_str()).trim();
    if text.is_empty() {
        return None;
    }
    let start_time = parse_timecode(caps.get(1)?.as_str()).ok()?;
    let end_time = parse_timecode(caps.get(2)?.as_str()).ok()?;
    Some(SubtitleSegment {
        start_time,
        end_time,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A well-formed line yields its times and trimmed text.
    #[test]
    fn parses_line() {
        let seg = parse_segment_line("[00:12.520 --> 00:13.520]  I never get up before 8.45.")
            .unwrap();
        assert_eq!(seg, SubtitleSegment::new(12.52, 13.52, "I never get up before 8.45."));
    }

    /// Whitespace around the arrow and before the text is optional.
    #[test]
    fn whitespace_is_permissive() {
        let tight = parse_segment_line("[00:01.000-->00:02.000]hi").unwrap();
        let loose = parse_segment_line("  [00:01.000   -->  00:02.000]     hi   ").unwrap();
        assert_eq!(tight, loose);
        assert_eq!(tight.text, "hi");
    }

    /// Start and end are parsed independently, so the shapes can differ.
    #[test]
    fn mixed_shapes() {
        let seg = parse_segment_line("[59:59.500 --> 01:00:00.500] over the hour").unwrap();
        assert_eq!(seg.start_time, 3599.5);
        assert_eq!(seg.end_time, 3600.5);
    }

    /// Brackets inside the text are kept verbatim.
    #[test]
    fn keeps_brackets_in_text() {
        let seg = parse_segment_line("[00:01.000 --> 00:02.000]  [music] --> fades").unwrap();
        assert_eq!(seg.text, "[music] --> fades");
    }

    /// Lines outside the grammar are rejected without an error.
    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "",
            "   ",
            "not a subtitle line",
            "00:01.000 --> 00:02.000  no brackets",
            "[00:01.000 -> 00:02.000]  wrong arrow",
            "[00:01 --> 00:02.000]  no millis",
            "[0:01.000 --> 00:02.000]  short minutes",
            "[00:01.000 --> 00:02.000]   ",
        ] {
            assert_eq!(parse_segment_line(line), None, "{line:?}");
        }
    }

    /// Lines render with a two-space gap before the text.
    #[test]
    fn renders_line() {
        let seg = SubtitleSegment::new(3661.25, 3662.0, "hello");
        assert_eq!(seg.to_line(), "[01:01:01.250 --> 01:01:02.000]  hello");
    }

    /// The JSON shape uses the backend's camelCase keys.
    #[test]
    fn serialises_camel_case() {
        let seg = SubtitleSegment::new(1.5, 2.0, "hi");
        let json = serde_json::to_string(&seg).unwrap();
        assert_eq!(json, r#"{"startTime":1.5,"endTime":2.0,"text":"hi"}"#);
    }

    /// Validation flags what the codec lets through.
    #[test]
    fn reports_issues() {
        assert!(SubtitleSegment::new(1.0, 2.0, "ok").issues().is_empty());
        assert_eq!(
            SubtitleSegment::new(3.0, 2.0, "x").issues(),
            vec![SegmentIssue::EndBeforeStart { start: 3.0, end: 2.0 }]
        );
        assert_eq!(
            SubtitleSegment::new(-1.0, 2.0, "a\nb").issues(),
            vec![SegmentIssue::NegativeTime("start"), SegmentIssue::MultiLineText]
        );
        let nan = SubtitleSegment::new(f64::NAN, 2.0, "");
        assert_eq!(
            nan.issues(),
            vec![SegmentIssue::NonFiniteTime("start"), SegmentIssue::EmptyText]
        );
    }
}
