use std::{io::Write, process::ExitCode};

use anyhow::Context;
use clap::Parser;

use crate::{
    http::{self, Direction},
    matcher,
    pipeline::{DecodePipeline, PipelineConfig},
    xml::OutputPolicy,
};

use self::arg::Args;
use self::io::{ProgramInput, ProgramOutput};

mod arg;
mod io;
mod logging;

const EXIT_NOT_FASTINFOSET: u8 = 2;

pub fn run() -> ExitCode {
    match run_impl() {
        Ok(exit_code) => exit_code,
        Err(error) => {
            tracing::error!(?error);
            eprintln!("{:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn run_impl() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    self::logging::set_up_logging(args.log_level, args.log_file.as_deref(), args.log_json)?;

    let content = ProgramInput::open(&args.input)
        .and_then(|mut input| input.read_all())
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let outcome = process(&args, &content)?;

    match &outcome {
        Outcome::Decoded(xml) => {
            let mut output = ProgramOutput::open(&args.output)
                .with_context(|| format!("failed to open {}", args.output.display()))?;
            output.write_all(xml)?;
            output.write_all(b"\n")?;
            output.flush()?;
        }
        Outcome::NotFastInfoset => {
            eprintln!("Message does not have a FastInfoset Content-Type.");
        }
    }

    Ok(ExitCode::from(outcome.exit_code()))
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Decoded(Vec<u8>),
    NotFastInfoset,
}

impl Outcome {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Decoded(_) => 0,
            Self::NotFastInfoset => EXIT_NOT_FASTINFOSET,
        }
    }
}

fn pipeline_config(args: &Args) -> PipelineConfig {
    PipelineConfig {
        output: OutputPolicy {
            indent: args.indent > 0,
            indent_amount: args.indent,
            omit_declaration: !args.declaration,
        },
        ..Default::default()
    }
}

/// Decodes the input as a bare body or as a complete HTTP message.
fn process(args: &Args, content: &[u8]) -> anyhow::Result<Outcome> {
    let pipeline = DecodePipeline::new(pipeline_config(args));

    if args.body {
        let xml = pipeline
            .decode(content, args.gzip)
            .context("failed to decode body")?;

        return Ok(Outcome::Decoded(xml));
    }

    let direction = Direction::from_is_request(args.request);
    let info = http::analyze(content, direction);

    if !args.force && !matcher::is_fastinfoset(&info.headers) {
        tracing::debug!(?direction, "not a FastInfoset message");
        return Ok(Outcome::NotFastInfoset);
    }

    let xml = pipeline
        .decode_analyzed(content, &info)
        .context("failed to decode message")?;

    Ok(Outcome::Decoded(xml))
}
