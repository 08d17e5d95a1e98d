//! Parsing utilities.
pub(crate) mod header_deliminator;
pub(crate) mod start_line;

/// Get the index (exclusive) of the end of the header deliminator (an empty line).
pub fn scan_header_deliminator(data: &[u8]) -> Option<usize> {
    match header_deliminator::field_lines(data) {
        Ok((_input, output)) => Some(output.len()),
        Err(_) => None,
    }
}

/// Split a header block into its lines without line terminators.
///
/// A trailing empty line (the header deliminator) is not included. The
/// last line is kept even if it is missing a line terminator.
pub fn split_header_lines(data: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut remain = data;

    while !remain.is_empty() {
        let (line, rest) = match remain.iter().position(|&b| b == b'\n') {
            Some(index) => (&remain[..index], &remain[index + 1..]),
            None => (remain, &remain[remain.len()..]),
        };
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if line.is_empty() {
            break;
        }

        lines.push(line);
        remain = rest;
    }

    lines
}
