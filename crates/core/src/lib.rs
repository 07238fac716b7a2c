//! Core library for lesson subtitles and practice items.
//! It converts caption text (`[00:12.520 --> 00:13.520]  text`) to and from
//! structured segments and models practice test questions.

pub mod codec;
pub mod practice;
pub mod segment;
pub mod timecode;
pub mod track;

pub use codec::{decode, decode_with_report, encode, Decoded, SkippedLine};
pub use segment::{parse_segment_line, SegmentIssue, SubtitleSegment};
pub use timecode::{format_timecode, parse_timecode, parse_timecode_lossy, TimecodeError};
