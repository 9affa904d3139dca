#[derive(Clone)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    /// PostgreSQL `E'...'` literal, where backslash escapes the next byte.
    EscapeQuoted,
    DoubleQuoted,
    Bracketed,
    Backticked,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// Returns the end offset and the digit run starting at `start`, if any.
pub(super) fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        std::str::from_utf8(&bytes[start..idx])
            .ok()
            .map(|digits| (idx, digits))
    }
}
