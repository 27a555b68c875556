//! Text cleanup shared by caption and paragraph assembly.

use unicode_normalization::UnicodeNormalization;

const LIGATURES: &[(&str, &str)] = &[
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
];

/// Normalize extracted text: NFC, ligatures expanded, private-use and
/// replacement characters removed, whitespace collapsed.
pub fn normalize(text: &str) -> String {
    let mut result: String = text.nfc().collect();

    for (ligature, replacement) in LIGATURES {
        if result.contains(ligature) {
            result = result.replace(ligature, replacement);
        }
    }

    result
        .chars()
        .filter(|c| {
            let code = *c as u32;
            *c != '\u{FFFD}'
                && !(0xE000..=0xF8FF).contains(&code)
                && !(0xF0000..=0xFFFFD).contains(&code)
                && !(0x100000..=0x10FFFD).contains(&code)
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append a line or paragraph fragment, repairing end-of-line hyphenation.
///
/// "infor-" followed by "mation" joins as "information"; a hyphen before an
/// upper-case or numeric start is kept ("GPT-" + "4").
pub fn append_fragment(buf: &mut String, fragment: &str) {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return;
    }
    let trimmed_len = buf.trim_end().len();
    buf.truncate(trimmed_len);
    if buf.is_empty() {
        buf.push_str(fragment);
        return;
    }

    let starts_lower = fragment.chars().next().is_some_and(|c| c.is_lowercase());
    let hyphenated = buf.ends_with('-')
        && buf
            .chars()
            .rev()
            .nth(1)
            .is_some_and(|c| c.is_alphabetic());

    if hyphenated && starts_lower {
        buf.pop();
    } else if !buf.ends_with('-') {
        buf.push(' ');
    }
    buf.push_str(fragment);
}

/// Join fragments with [`append_fragment`].
pub fn join_fragments<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut buf = String::new();
    for fragment in fragments {
        append_fragment(&mut buf, fragment);
    }
    buf
}

/// Whether text ends a sentence (`.`, `?`, `!` or `:`).
pub fn ends_sentence(text: &str) -> bool {
    matches!(text.trim_end().chars().last(), Some('.' | '?' | '!' | ':'))
}
