//! Helpers that keep feed text single-line and short in log output.
//! Feed titles and proxy bodies routinely carry newlines, tabs and kilobytes
//! of markup; log lines should carry neither.

use std::fmt::Write;

/// Escape control characters and cap the result at `max_chars` characters,
/// appending `…` when truncated.
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(s.len().min(max_chars) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= max_chars {
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

/// Escape for single-line logging with a generous default cap.
pub fn escape_log(s: &str) -> String {
    preview(s, 300)
}
