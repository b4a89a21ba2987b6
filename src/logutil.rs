//! Escaping for player-supplied strings (ids, character names) so each log
//! record stays on one line.

use std::fmt::Write;

/// Longest preview kept before truncating with an ellipsis.
const MAX_PREVIEW: usize = 120;

/// Escape backslashes, newlines, carriage returns, tabs and other control
/// characters (as `\xNN`), truncating past [`MAX_PREVIEW`] characters.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
