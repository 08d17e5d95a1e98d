//! Decoding of complete HTTP messages.
use crate::{
    error::DecodeError,
    http::{self, MessageInfo},
    matcher,
    pipeline::DecodePipeline,
};

pub use crate::http::Direction;

/// Returns whether the message declares a FastInfoset body.
pub fn is_applicable(content: &[u8], direction: Direction) -> bool {
    let info = http::analyze(content, direction);

    matcher::is_fastinfoset(&info.headers)
}

impl DecodePipeline {
    /// Decodes the body of a raw HTTP message.
    ///
    /// The body is inflated when the message declares a gzip content coding.
    /// The Content-Type is not checked.
    pub fn decode_message(
        &self,
        content: &[u8],
        direction: Direction,
    ) -> Result<Vec<u8>, DecodeError> {
        let info = http::analyze(content, direction);

        self.decode_analyzed(content, &info)
    }

    /// Decodes the body of a message that was already analyzed.
    pub fn decode_analyzed(
        &self,
        content: &[u8],
        info: &MessageInfo,
    ) -> Result<Vec<u8>, DecodeError> {
        let body = info.body(content);
        let gzip_framed = matcher::is_gzip_encoded(&info.headers);

        tracing::debug!(
            body_offset = info.body_offset,
            body_length = body.len(),
            gzip_framed,
            "decode message"
        );

        self.decode(body, gzip_framed)
    }
}

/// Decodes the body of a raw HTTP message with the default configuration.
pub fn decode_message(content: &[u8], direction: Direction) -> Result<Vec<u8>, DecodeError> {
    DecodePipeline::default().decode_message(content, direction)
}
