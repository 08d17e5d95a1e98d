//! Decompression of message bodies.
use std::io::{BufRead, Read};

use flate2::bufread::MultiGzDecoder;

/// Length of the chunks read from the decompressor.
pub const DEFAULT_CHUNK_LENGTH: usize = 1024;

/// Decoder for decompressing gzip streams.
///
/// Concatenated gzip members are decoded as one stream.
#[derive(Debug)]
pub struct GzipInflater<R: BufRead> {
    decoder: MultiGzDecoder<R>,
    chunk_length: usize,
}

impl<R: BufRead> GzipInflater<R> {
    /// Create an inflater reading compressed data from the given reader.
    pub fn new(source: R) -> Self {
        Self::with_chunk_length(source, DEFAULT_CHUNK_LENGTH)
    }

    /// Create an inflater like [`Self::new()`] reading `chunk_length` bytes at a time.
    pub fn with_chunk_length(source: R, chunk_length: usize) -> Self {
        Self {
            decoder: MultiGzDecoder::new(source),
            chunk_length: chunk_length.max(1),
        }
    }

    /// Return a reference of the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.decoder.get_ref()
    }

    /// Return the underlying reader.
    pub fn into_inner(self) -> R {
        self.decoder.into_inner()
    }

    /// Read chunks until the end of the stream and return the decompressed data.
    pub fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut buf = vec![0; self.chunk_length];

        loop {
            let read_length = self.decoder.read(&mut buf)?;

            if read_length == 0 {
                break;
            }

            output.extend_from_slice(&buf[..read_length]);
        }

        tracing::trace!(output_length = output.len(), "inflated");

        Ok(output)
    }
}

/// Decompress a complete gzip body.
pub fn inflate_gzip(body: &[u8], chunk_length: usize) -> std::io::Result<Vec<u8>> {
    GzipInflater::with_chunk_length(body, chunk_length).read_all()
}
