/// The `'` at `idx` opens a PostgreSQL escape string (`E'...'`).
pub(super) fn is_escape_string_start(bytes: &[u8], idx: usize) -> bool {
    let Some(prefix) = idx.checked_sub(1) else {
        return false;
    };
    if !matches!(bytes[prefix], b'E' | b'e') {
        return false;
    }
    // `name'...'` is not a prefix, only a standalone `E`
    prefix
        .checked_sub(1)
        .is_none_or(|before| !(bytes[before].is_ascii_alphanumeric() || bytes[before] == b'_'))
}

pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// `@P1`-style SQL Server parameter name; returns the offset of the digits.
pub(super) fn is_mssql_param_start(bytes: &[u8], idx: usize) -> Option<usize> {
    let is_param = bytes.get(idx) == Some(&b'@')
        && matches!(bytes.get(idx + 1), Some(b'P' | b'p'))
        && bytes.get(idx + 2).is_some_and(u8::is_ascii_digit);
    is_param.then_some(idx + 2)
}

pub(super) fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }

    // `$1` is a parameter, not a tag
    if bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }

    if idx < bytes.len() && bytes[idx] == b'$' {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

pub(super) fn matches_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let end = idx + 1 + tag.len();
    end < bytes.len()
        && bytes[idx + 1..end].starts_with(tag.as_bytes())
        && bytes.get(end) == Some(&b'$')
}
