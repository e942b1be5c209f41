use std::{error::Error, fs::File, path::Path, str::FromStr, sync::Arc};
use tracing_subscriber::{
    filter::{self, LevelFilter},
    fmt::writer::BoxMakeWriter,
    prelude::*,
};

#[derive(Debug)]
pub enum LoggerError {
    Io(std::io::Error),
    Init(tracing_subscriber::util::TryInitError),
}

impl std::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Cannot open log file: {}", e),
            Self::Init(e) => write!(f, "Cannot install logger: {}", e),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<std::io::Error> for LoggerError {
    fn from(e: std::io::Error) -> LoggerError {
        LoggerError::Io(e)
    }
}

impl From<tracing_subscriber::util::TryInitError> for LoggerError {
    fn from(e: tracing_subscriber::util::TryInitError) -> LoggerError {
        LoggerError::Init(e)
    }
}

/// Targets too chatty to be useful, whatever the level.
fn is_noisy(target: &str) -> bool {
    ["hyper", "reqwest", "rustls", "tokio", "mio", "want", "h2"]
        .iter()
        .any(|prefix| target.starts_with(prefix))
}

pub fn setup_logger(log_level: LevelFilter, log_file: Option<&Path>) -> Result<(), LoggerError> {
    let file_log = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BoxMakeWriter::new(Arc::new(file));
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_file(false),
            )
        }
        None => None,
    };

    let stdout_log = tracing_subscriber::fmt::layer().pretty().with_file(false);

    tracing_subscriber::registry()
        .with(
            stdout_log
                .and_then(file_log)
                .with_filter(log_level)
                .with_filter(filter::filter_fn(|metadata| !is_noisy(metadata.target()))),
        )
        .try_init()?;

    Ok(())
}

/// Parse LOG_LEVEL environment variable.
pub fn parse_log_level() -> Result<Option<LevelFilter>, Box<dyn Error>> {
    if let Ok(l) = std::env::var("LOG_LEVEL") {
        Ok(Some(LevelFilter::from_str(&l)?))
    } else {
        Ok(None)
    }
}
