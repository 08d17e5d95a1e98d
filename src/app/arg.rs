use std::path::PathBuf;

use clap::Parser;

/// Decode a FastInfoset HTTP message body to indented XML.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Raw HTTP message, or `-` for standard input.
    #[clap(long, default_value = "-")]
    pub input: PathBuf,

    /// Destination of the XML, or `-` for standard output.
    #[clap(long, default_value = "-")]
    pub output: PathBuf,

    /// Input is a request instead of a response.
    #[clap(long)]
    pub request: bool,

    /// Input is a bare body instead of a complete HTTP message.
    #[clap(long)]
    pub body: bool,

    /// Bare body is gzip compressed.
    #[clap(long, requires = "body")]
    pub gzip: bool,

    /// Decode even if the Content-Type is not FastInfoset.
    #[clap(long, conflicts_with = "body")]
    pub force: bool,

    /// Indentation width, 0 for no indentation.
    #[clap(long, default_value_t = 2)]
    pub indent: usize,

    /// Write an XML declaration before the root element.
    #[clap(long)]
    pub declaration: bool,

    #[clap(long, default_value = "warn")]
    pub log_level: super::logging::Level,

    #[clap(long)]
    pub log_file: Option<PathBuf>,

    #[clap(long)]
    pub log_json: bool,
}
