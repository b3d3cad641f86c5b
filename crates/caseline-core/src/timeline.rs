//! Outline decoding and timeline formatting.

use thiserror::Error;

/// Header emitted at the top of every generated timeline.
pub const TIMELINE_HEADER: &str = "# Timeline of Events";

#[derive(Error, Debug)]
pub enum OutlineError {
    #[error("outline is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
}

/// Decode raw outline bytes as UTF-8.
///
/// A decoding failure is a structural input error and is surfaced to the
/// caller, unlike the best-effort PDF path.
pub fn decode_outline(data: &[u8]) -> Result<&str, OutlineError> {
    Ok(std::str::from_utf8(data)?)
}

/// Render an outline as a markdown timeline: a fixed header followed by one
/// bullet per non-blank line, in input order, whitespace trimmed.
///
/// Pure and total: blank lines are dropped, never turned into empty bullets.
pub fn format_timeline(outline: &str) -> String {
    let mut out = String::from(TIMELINE_HEADER);
    out.push_str("\n\n");
    for line in outline.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push_str("- ");
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    out
}
