//! Casing helpers.

/// Characters that end a word and capitalize the next letter.
const WORD_SEPARATORS: &str = "-#@!$&=.+:;_~ (){}[]/";

/// Convert `str` to camel case.
///
/// Rules:
/// - surrounding spaces are trimmed
/// - letters following a separator are upper-cased
/// - a leading upper-case letter is lowered unless `init_case` is set
/// - letters and digits are kept, every other character is dropped
pub fn to_camel_case(s: &str, init_case: bool) -> String {
    let s = s.trim_matches(' ');
    let mut out = String::with_capacity(s.len());
    let mut cap_next = init_case;

    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() && i == 0 && !cap_next {
            out.extend(ch.to_lowercase());
            continue;
        }

        if ch.is_uppercase() || ch.is_ascii_digit() {
            out.push(ch);
        } else if ch.is_lowercase() {
            if cap_next {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
        }

        cap_next = WORD_SEPARATORS.contains(ch);
    }

    out
}

/// "AnyKind of_string" -> "anyKindOfString".
pub fn to_lower_camel(s: &str) -> String {
    to_camel_case(s, false)
}

/// Drop whitespace, upper-casing the character that follows it.
pub fn remove_whitespace_and_caps(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut cap_next = false;

    for ch in s.chars() {
        if ch.is_whitespace() {
            cap_next = true;
        } else if cap_next {
            cap_next = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// Unicode case-insensitive equality.
pub fn eq_fold(a: &str, b: &str) -> bool {
    a == b || a.chars().flat_map(char::to_lowercase).eq(b.chars().flat_map(char::to_lowercase))
}
