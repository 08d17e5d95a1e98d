//! Lenient HTTP/1.x message analysis
//!
//! Splits a raw message into its header lines and the offset of its body.
//! Analysis never fails: malformed messages produce whatever header lines
//! could be found.
use std::str;

/// Whether a message is a request or a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Request,
    #[default]
    Response,
}

impl Direction {
    pub fn from_is_request(is_request: bool) -> Self {
        if is_request {
            Self::Request
        } else {
            Self::Response
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub request_target: String,
    pub http_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub http_version: String,
    pub status_code: u16,
    pub reason_phrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request(RequestLine),
    Status(StatusLine),
}

impl StartLine {
    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request(..))
    }

    pub fn as_request(&self) -> Option<&RequestLine> {
        if let Self::Request(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status(..))
    }

    pub fn as_status(&self) -> Option<&StatusLine> {
        if let Self::Status(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

/// Result of analyzing a raw HTTP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    /// Every line of the header block, start line first, without line
    /// terminators.
    pub headers: Vec<String>,
    /// Index of the first byte of the body.
    ///
    /// Equal to the message length when there is no empty line ending the
    /// header block.
    pub body_offset: usize,
    /// Parsed start line if it is well formed for the message direction.
    pub start_line: Option<StartLine>,
}

impl MessageInfo {
    /// Returns the body slice of the analyzed message.
    pub fn body<'a>(&self, content: &'a [u8]) -> &'a [u8] {
        &content[self.body_offset.min(content.len())..]
    }
}

pub fn analyze_request(content: &[u8]) -> MessageInfo {
    analyze(content, Direction::Request)
}

pub fn analyze_response(content: &[u8]) -> MessageInfo {
    analyze(content, Direction::Response)
}

pub fn analyze(content: &[u8], direction: Direction) -> MessageInfo {
    let body_offset =
        crate::parse::scan_header_deliminator(content).unwrap_or(content.len());
    let lines = crate::parse::split_header_lines(&content[..body_offset]);

    let start_line = lines
        .first()
        .and_then(|line| parse_start_line(line, direction));
    let headers = lines
        .into_iter()
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect::<Vec<_>>();

    tracing::trace!(
        ?direction,
        header_count = headers.len(),
        body_offset,
        "analyzed message"
    );

    MessageInfo {
        headers,
        body_offset,
        start_line,
    }
}

fn parse_start_line(line: &[u8], direction: Direction) -> Option<StartLine> {
    match direction {
        Direction::Request => {
            let (_remain, line) = crate::parse::start_line::request_line(line).ok()?;

            Some(StartLine::Request(RequestLine {
                method: str::from_utf8(line.method).ok()?.to_string(),
                request_target: str::from_utf8(line.request_target).ok()?.to_string(),
                http_version: str::from_utf8(line.http_version).ok()?.to_string(),
            }))
        }
        Direction::Response => {
            let (_remain, line) = crate::parse::start_line::status_line(line).ok()?;

            Some(StartLine::Status(StatusLine {
                http_version: str::from_utf8(line.http_version).ok()?.to_string(),
                status_code: str::from_utf8(line.status_code).ok()?.parse().ok()?,
                reason_phrase: String::from_utf8_lossy(line.reason_phrase).into_owned(),
            }))
        }
    }
}
