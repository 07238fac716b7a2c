//! Reading and writing whole subtitle tracks.
//! The structured form is the JSON array of segments the lesson backend stores;
//! the text form is the caption block edited by hand.

use crate::codec::{self, Decoded};
use crate::segment::SubtitleSegment;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Parse a JSON array of segments.
pub fn from_json(text: &str) -> Result<Vec<SubtitleSegment>> {
    serde_json::from_str(text).context("invalid subtitle track JSON")
}

/// Serialise segments as a pretty-printed JSON array.
pub fn to_json(segments: &[SubtitleSegment]) -> Result<String> {
    serde_json::to_string_pretty(segments).context("failed to serialise subtitle track")
}

/// Load a JSON track from disk.
pub fn load(path: &Path) -> Result<Vec<SubtitleSegment>> {
    trace!("load path={}", path.display());
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    from_json(&text).with_context(|| format!("failed to load track {}", path.display()))
}

/// Save a track to disk as JSON.
pub fn save(segments: &[SubtitleSegment], path: &Path) -> Result<()> {
    trace!("save path={}", path.display());
    let mut text = to_json(segments)?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("saved {} segments to {}", segments.len(), path.display());
    Ok(())
}

/// Read a caption text file and decode it, keeping the skipped-line report.
pub fn read_text(path: &Path) -> Result<Decoded> {
    trace!("read_text path={}", path.display());
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(codec::decode_with_report(&text))
}

/// Encode a track and write it as a caption text file.
pub fn write_text(segments: &[SubtitleSegment], path: &Path) -> Result<()> {
    trace!("write_text path={}", path.display());
    let mut text = codec::encode(segments);
    text.push('\n');
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("wrote {} segments to {}", segments.len(), path.display());
    Ok(())
}
