//! FastInfoset (ITU-T X.891) binary XML decoding
//!
//! [`Decoder`] reads a document and yields infoset [`Event`]s in document
//! order. Encoding is not supported.
pub mod decode;
pub mod event;
pub mod octets;
pub mod string;
pub mod vocabulary;

pub use decode::Decoder;
pub use event::*;
pub use vocabulary::Vocabulary;
