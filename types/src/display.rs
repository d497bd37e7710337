//! Terminal-safe rendering of server-supplied text.
//!
//! Project names and descriptions come from the backend and are rendered
//! straight into terminal cells. Escape sequences in them could move the
//! cursor, rewrite the screen, or set the clipboard (OSC 52), so they are
//! stripped before display.

use std::borrow::Cow;
use std::iter::Peekable;

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Sanitize text for a single rendered line.
///
/// Escape sequences and control characters are removed; line breaks and tabs
/// become a single space so a description never spills across cells.
#[must_use]
pub fn display_line(input: &str) -> Cow<'_, str> {
    if !input.chars().any(needs_rewrite) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => skip_sequence(&mut chars),
            '\n' | '\r' | '\t' => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            // C1 CSI introduces parameters just like ESC [
            '\u{009b}' => skip_csi(&mut chars),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn needs_rewrite(c: char) -> bool {
    c.is_control()
}

fn skip_sequence<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    match chars.peek() {
        Some('[') => {
            chars.next();
            skip_csi(chars);
        }
        Some(']' | 'P' | '^' | '_') => {
            chars.next();
            skip_string(chars);
        }
        Some('(' | ')' | '*' | '+' | '#' | ' ') => {
            chars.next();
            chars.next();
        }
        Some(_) => {
            chars.next();
        }
        None => {}
    }
}

/// Parameter and intermediate bytes, then one final byte.
fn skip_csi<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(&c) = chars.peek() {
        if ('\x20'..='\x3f').contains(&c) {
            chars.next();
        } else {
            if ('\x40'..='\x7e').contains(&c) {
                chars.next();
            }
            return;
        }
    }
}

/// OSC/DCS/PM/APC bodies end at BEL or ST (`ESC \`).
fn skip_string<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(c) = chars.next() {
        if c == BEL {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_borrowed() {
        assert!(matches!(display_line("Alpha project"), Cow::Borrowed(_)));
    }

    #[test]
    fn strips_csi_sequences() {
        assert_eq!(display_line("Al\x1b[2Jpha"), "Alpha");
        assert_eq!(display_line("\x1b[1;31mred\x1b[0m"), "red");
    }

    #[test]
    fn strips_osc_clipboard_writes() {
        assert_eq!(display_line("a\x1b]52;c;ZXZpbA==\x07b"), "ab");
        assert_eq!(display_line("a\x1b]8;;http://x\x1b\\link"), "alink");
    }

    #[test]
    fn collapses_line_breaks_to_single_space() {
        assert_eq!(display_line("line one\r\nline two"), "line one line two");
        assert_eq!(display_line("tab\there"), "tab here");
    }

    #[test]
    fn drops_other_controls() {
        assert_eq!(display_line("a\x00b\x7fc\u{0085}d"), "abcd");
        assert_eq!(display_line("x\u{009b}31my"), "xy");
    }
}
