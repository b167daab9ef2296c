//! Quoting and escaping rules for text output

use std::borrow::Cow;

const LOWER_HEX: &[u8; 16] = b"0123456789abcdef";

/// Whether `c` prints as itself: letters, marks, numbers, punctuation,
/// symbols and the ASCII space. Controls, other whitespace, format
/// characters, private-use code points and noncharacters do not.
///
/// Without a general-category table, code points that are unassigned in
/// the Unicode version the host knows about (other than noncharacters) are
/// treated as printable and pass through unescaped.
pub fn is_print(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !is_format_or_private(c) && !is_noncharacter(c)
}

/// The 66 permanently reserved noncharacters: U+FDD0..U+FDEF and the last
/// two code points of every plane.
fn is_noncharacter(c: char) -> bool {
    let cp = u32::from(c);
    (0xFDD0..=0xFDEF).contains(&cp) || cp & 0xFFFE == 0xFFFE
}

fn is_format_or_private(c: char) -> bool {
    matches!(
        c,
        '\u{AD}'
            | '\u{600}'..='\u{605}'
            | '\u{61C}'
            | '\u{6DD}'
            | '\u{70F}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
    )
}

fn needs_escaping(s: &str) -> bool {
    s.chars().any(|c| c == '"' || !is_print(c))
}

/// Whether a value must be wrapped in double quotes: it contains
/// whitespace, a non-printable character, the replacement character, or
/// one of `"` and `=`.
pub fn needs_quoting(s: &str) -> bool {
    s.chars().any(|c| {
        matches!(c, '"' | '=' | '\u{FFFD}') || c.is_whitespace() || !is_print(c)
    })
}

/// Backslash-escapes non-printable characters, and `"` when
/// `escape_quotes` is set. Returns the input untouched when nothing needs
/// escaping.
pub fn escape(s: &str, escape_quotes: bool) -> Cow<'_, str> {
    if !needs_escaping(s) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if c == '"' {
            if escape_quotes {
                out.push_str("\\\"");
            } else {
                out.push(c);
            }
            continue;
        }
        if is_print(c) {
            out.push(c);
            continue;
        }
        match c {
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0b' => out.push_str("\\v"),
            _ => push_code_point(&mut out, c),
        }
    }
    Cow::Owned(out)
}

fn push_code_point(out: &mut String, c: char) {
    let code = u32::from(c);
    let (prefix, digits) = if code < 0x20 {
        ("\\x", 2)
    } else if code < 0x10000 {
        ("\\u", 4)
    } else {
        ("\\U", 8)
    };
    out.push_str(prefix);
    for shift in (0..digits).rev() {
        let nibble = (code >> (shift * 4)) & 0xF;
        out.push(char::from(LOWER_HEX[nibble as usize]));
    }
}
