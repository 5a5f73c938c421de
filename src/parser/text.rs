use regex::Regex;

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Byte offset of the first case-insensitive match of `re`, rewound to the
/// start of the line it sits on.
pub fn line_start_of(text: &str, re: &Regex) -> Option<usize> {
    let m = re.find(text)?;
    Some(text[..m.start()].rfind('\n').map_or(0, |i| i + 1))
}

/// Byte offset of the line following the first match of `re`.
pub fn line_after(text: &str, re: &Regex) -> Option<usize> {
    let m = re.find(text)?;
    Some(
        text[m.end()..]
            .find('\n')
            .map_or(text.len(), |i| m.end() + i + 1),
    )
}

/// True when the string has cased characters and all of them are uppercase.
pub fn is_all_upper(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Title case: every word's first cased letter is uppercase and the rest are
/// lowercase.
pub fn is_title_case(s: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}
