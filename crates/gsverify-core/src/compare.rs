const TRAILING_WHITESPACE: &[u8] = b" \t\n\r\x0b\x0c";

/// CRLF to LF, then trailing whitespace removed.
///
/// A `\n` swallows every `\r` directly before it, so `\r\r\n` becomes `\n`
/// and a second pass never changes the result.
pub fn normalize(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &byte in bytes {
        if byte == b'\n' {
            while out.last() == Some(&b'\r') {
                out.pop();
            }
        }
        out.push(byte);
    }
    while out
        .last()
        .is_some_and(|byte| TRAILING_WHITESPACE.contains(byte))
    {
        out.pop();
    }
    out
}

pub fn matches(actual: &[u8], expected: &[u8]) -> bool {
    normalize(actual) == normalize(expected)
}
