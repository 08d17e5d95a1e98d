//! Error representations
use std::{backtrace::Backtrace, fmt::Display, str::Utf8Error, string::FromUtf8Error};

/// Error returned by the decode pipeline.
///
/// Every failure (inflating, decoding the binary XML, or writing the textual
/// XML) is reported as this one error. The stage is kept for diagnostics and
/// the underlying failure is available through [`std::error::Error::source()`].
#[derive(Debug, thiserror::Error)]
pub struct DecodeError {
    stage: DecodeStage,
    backtrace: Option<Box<Backtrace>>,
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl DecodeError {
    pub fn new<T: Into<Box<dyn std::error::Error + Send + Sync>>>(
        stage: DecodeStage,
        source: T,
    ) -> Self {
        Self {
            stage,
            backtrace: Some(Box::new(Backtrace::capture())),
            source: source.into(),
        }
    }

    pub fn inflate(error: std::io::Error) -> Self {
        Self::new(DecodeStage::Inflate, error)
    }

    pub fn transform(error: FiError) -> Self {
        Self::new(DecodeStage::Transform, error)
    }

    pub fn serialize<T: Into<Box<dyn std::error::Error + Send + Sync>>>(error: T) -> Self {
        Self::new(DecodeStage::Serialize, error)
    }

    pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
        self.backtrace = Some(Box::new(backtrace));
        self
    }

    pub fn stage(&self) -> DecodeStage {
        self.stage
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_deref()
    }

    /// Returns the FastInfoset error if the binary XML could not be decoded.
    pub fn as_fastinfoset(&self) -> Option<&FiError> {
        self.source.downcast_ref()
    }

    pub fn as_io(&self) -> Option<&std::io::Error> {
        self.source.downcast_ref()
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "decode error: {}: {}", self.stage, self.source)
    }
}

impl From<FiError> for DecodeError {
    fn from(value: FiError) -> Self {
        Self::transform(value)
    }
}

/// Step of the decode pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DecodeStage {
    Inflate,
    Transform,
    Serialize,
}

impl Display for DecodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inflate => write!(f, "gzip inflate"),
            Self::Transform => write!(f, "fastinfoset transform"),
            Self::Serialize => write!(f, "xml serialization"),
        }
    }
}

/// Error for decoding FastInfoset documents.
#[derive(Debug, thiserror::Error)]
pub struct FiError {
    kind: FiErrorKind,
    context: Box<FiContext>,
    backtrace: Option<Box<Backtrace>>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FiError {
    pub fn new(kind: FiErrorKind) -> Self {
        Self {
            kind,
            context: Default::default(),
            backtrace: Some(Box::new(Backtrace::capture())),
            source: None,
        }
    }

    pub fn other(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::new(FiErrorKind::Other).with_source(error)
    }

    pub fn with_position(mut self, value: u64) -> Self {
        self.context.position = Some(value);
        self
    }

    pub fn with_snippet<S: Into<String>>(mut self, value: S) -> Self {
        self.context.snippet = Some(value.into());
        self
    }

    pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
        self.backtrace = Some(Box::new(backtrace));
        self
    }

    pub fn with_source<T: Into<Box<dyn std::error::Error + Send + Sync>>>(
        mut self,
        source: T,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> FiErrorKind {
        self.kind
    }

    pub fn position(&self) -> Option<u64> {
        self.context.position
    }

    pub fn snippet(&self) -> Option<&String> {
        self.context.snippet.as_ref()
    }
}

impl Display for FiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fastinfoset error: {}{}", self.kind, self.context)
    }
}

impl From<FiErrorKind> for FiError {
    fn from(value: FiErrorKind) -> Self {
        Self::new(value)
    }
}

impl From<FromUtf8Error> for FiError {
    fn from(value: FromUtf8Error) -> Self {
        let valid_up_to = value.utf8_error().valid_up_to();
        FiError::new(FiErrorKind::InvalidString)
            .with_snippet(format!("invalid UTF-8 after {} bytes", valid_up_to))
            .with_source(value)
    }
}

impl From<Utf8Error> for FiError {
    fn from(value: Utf8Error) -> Self {
        FiError::new(FiErrorKind::InvalidString)
            .with_snippet(format!("invalid UTF-8 after {} bytes", value.valid_up_to()))
            .with_source(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FiErrorKind {
    IncompleteInput,
    NotFastInfoset,
    UnsupportedVersion,
    UnexpectedOctet,
    IndexOutOfRange,
    InvalidString,
    UnsupportedExternalVocabulary,
    UnsupportedEncodingAlgorithm,
    Other,
}

impl Display for FiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::IncompleteInput => "incomplete input",
            Self::NotFastInfoset => "not a FastInfoset document (wrong format or corrupted input)",
            Self::UnsupportedVersion => "unsupported version",
            Self::UnexpectedOctet => "unexpected octet",
            Self::IndexOutOfRange => "vocabulary index out of range",
            Self::InvalidString => "invalid character string",
            Self::UnsupportedExternalVocabulary => "unsupported external vocabulary",
            Self::UnsupportedEncodingAlgorithm => "unsupported encoding algorithm",
            Self::Other => "other",
        };

        f.write_str(value)
    }
}

#[derive(Debug, Default)]
struct FiContext {
    position: Option<u64>,
    snippet: Option<String>,
}

impl Display for FiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(position) = self.position {
            write!(f, " position {}", position)?;
        }

        if let Some(snippet) = &self.snippet {
            write!(f, " near '{}'", snippet)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fi_error_display() {
        let error = FiError::new(FiErrorKind::UnexpectedOctet)
            .with_position(12)
            .with_snippet("\\xfa");

        assert_eq!(
            error.to_string(),
            "fastinfoset error: unexpected octet position 12 near '\\xfa'"
        );
        assert_eq!(error.kind(), FiErrorKind::UnexpectedOctet);
        assert_eq!(error.position(), Some(12));
    }

    #[test]
    fn test_decode_error_source() {
        let error = DecodeError::from(FiError::new(FiErrorKind::IncompleteInput));

        assert_eq!(error.stage(), DecodeStage::Transform);
        assert_eq!(
            error.as_fastinfoset().map(|e| e.kind()),
            Some(FiErrorKind::IncompleteInput)
        );
        assert!(error.as_io().is_none());
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().starts_with("decode error: fastinfoset transform"));
    }

    #[test]
    fn test_decode_error_inflate() {
        let error = DecodeError::inflate(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "eof",
        ));

        assert_eq!(error.stage(), DecodeStage::Inflate);
        assert_eq!(
            error.as_io().map(|e| e.kind()),
            Some(std::io::ErrorKind::UnexpectedEof)
        );
    }
}
