//! Detects FastInfoset HTTP message bodies and decodes them into indented XML
//!
//! ```
//! let body = b"\xe0\x00\x00\x01\x00\x3c\x00a\x3c\x00b\x801\xff\xf0";
//! let headers = ["Content-Type: application/fastinfoset; charset=utf-8"];
//!
//! assert!(fastinfoset_view::matcher::is_fastinfoset(headers));
//!
//! let xml = fastinfoset_view::pipeline::decode(body, false)?;
//! assert_eq!(xml, b"<a>\n  <b>1</b>\n</a>");
//! # Ok::<(), fastinfoset_view::error::DecodeError>(())
//! ```
pub mod compress;
pub mod error;
pub mod fastinfoset;
pub mod http;
pub mod matcher;
pub mod message;
mod parse;
pub mod pipeline;
pub mod tab;
pub mod xml;

#[cfg(feature = "bin")]
#[doc(hidden)]
pub mod app;
