//! Body decoding: gzip inflate, then FastInfoset to XML text.
use crate::{
    compress::{self, DEFAULT_CHUNK_LENGTH},
    error::DecodeError,
    fastinfoset::Decoder,
    xml::{OutputPolicy, XmlSerializer},
};

/// Configuration for a [`DecodePipeline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Layout of the XML text
    pub output: OutputPolicy,
    /// Number of bytes read from the gzip decompressor at a time
    pub inflate_chunk_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output: *OutputPolicy::canonical(),
            inflate_chunk_length: DEFAULT_CHUNK_LENGTH,
        }
    }
}

/// Converts message bodies to XML text.
///
/// The pipeline holds no per-call state and can be reused for any number of
/// bodies.
#[derive(Debug, Clone, Default)]
pub struct DecodePipeline {
    config: PipelineConfig,
}

impl DecodePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decodes a body, inflating it first when `gzip_framed` is set.
    pub fn decode(&self, body: &[u8], gzip_framed: bool) -> Result<Vec<u8>, DecodeError> {
        tracing::debug!(body_length = body.len(), gzip_framed, "decode body");

        if gzip_framed {
            let document = compress::inflate_gzip(body, self.config.inflate_chunk_length)
                .map_err(DecodeError::inflate)?;
            self.transform(&document)
        } else {
            self.transform(body)
        }
    }

    /// Converts an uncompressed FastInfoset document to XML text.
    pub fn transform(&self, document: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut serializer = XmlSerializer::new(Vec::new(), &self.config.output)?;
        let mut decoder = Decoder::new(document)?;
        let mut event_count = 0usize;

        while let Some(event) = decoder.next_event()? {
            serializer.write_event(&event)?;
            event_count += 1;
        }

        let output = serializer.finish()?;

        tracing::debug!(
            document_length = document.len(),
            event_count,
            output_length = output.len(),
            "transformed document"
        );

        Ok(output)
    }
}

/// Decodes a body with the default configuration.
pub fn decode(body: &[u8], gzip_framed: bool) -> Result<Vec<u8>, DecodeError> {
    DecodePipeline::default().decode(body, gzip_framed)
}
