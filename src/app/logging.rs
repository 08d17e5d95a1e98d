use std::{fs::File, path::Path, sync::Mutex};

use tracing_subscriber::{Layer, filter::LevelFilter, layer::SubscriberExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Level {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Off,
}

impl Level {
    fn as_level_filter(&self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
            Self::Off => LevelFilter::OFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StderrFormat {
    Text,
    Json,
}

/// Returns the format of events written to standard error, if any.
fn stderr_format(file: Option<&Path>, json: bool) -> Option<StderrFormat> {
    match (file, json) {
        (_, true) => Some(StderrFormat::Json),
        (None, false) => Some(StderrFormat::Text),
        (Some(_), false) => None,
    }
}

/// Installs the global subscriber.
///
/// Events go to `file` when given. Otherwise they go to standard error, as
/// JSON lines when `json` is set. Standard output only carries the XML.
pub fn set_up_logging(level: Level, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let file_sub = if let Some(path) = file {
        let writer = File::options().create(true).append(true).open(path)?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(writer)),
        )
    } else {
        None
    };

    let stderr = stderr_format(file, json);

    let stderr_sub = if stderr == Some(StderrFormat::Text) {
        Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    } else {
        None
    };

    let json_sub = if stderr == Some(StderrFormat::Json) {
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
    } else {
        None
    };

    let sub = tracing_subscriber::Registry::default();
    let sub = sub.with(file_sub.with_filter(level.as_level_filter()));
    let sub = sub.with(stderr_sub.with_filter(level.as_level_filter()));
    let sub = sub.with(json_sub.with_filter(level.as_level_filter()));
    tracing::subscriber::set_global_default(sub)?;

    tracing::debug!("logging configured");

    Ok(())
}
