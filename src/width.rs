//! Terminal display width helpers.
//!
//! Canvas glyphs, legends and table cells are measured after stripping ANSI
//! escapes so padding stays aligned in the terminal.

use unicode_width::UnicodeWidthChar;

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

/// Cut `text` so it occupies at most `width` columns.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Left-align `text` in a field of `width` columns, truncating overflow.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = truncate_to_width(text, width);
    let mut used = display_width(&out);
    while used < width {
        out.push(' ');
        used += 1;
    }
    out
}
