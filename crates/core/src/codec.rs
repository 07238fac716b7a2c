//! Decoding a block of caption lines into segments and encoding them back.
//! Decoding never fails: lines that do not match are left out.

use crate::segment::{parse_segment_line, SubtitleSegment};
use tracing::{debug, trace};

/// A non-blank line that `decode_with_report` could not read.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number in the input, blank lines included.
    pub line_number: usize,
    pub content: String,
}

/// Segments decoded from a block plus the lines that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub segments: Vec<SubtitleSegment>,
    pub skipped: Vec<SkippedLine>,
}

impl Decoded {
    /// True when every non-blank line became a segment.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Decode caption text into segments, in line order.
pub fn decode(text: &str) -> Vec<SubtitleSegment> {
    decode_with_report(text).segments
}

/// Decode caption text and keep track of every non-blank line that was skipped.
pub fn decode_with_report(text: &str) -> Decoded {
    trace!("decode bytes={}", text.len());
    let mut decoded = Decoded::default();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_segment_line(line) {
            Some(segment) => decoded.segments.push(segment),
            None => {
                debug!("skipping line {}: {:?}", i + 1, line);
                decoded.skipped.push(SkippedLine {
                    line_number: i + 1,
                    content: line.to_string(),
                });
            }
        }
    }
    decoded
}

/// Encode segments as caption text, one line per segment joined by `\n`.
pub fn encode(segments: &[SubtitleSegment]) -> String {
    trace!("encode segments={}", segments.len());
    segments
        .iter()
        .map(SubtitleSegment::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}
