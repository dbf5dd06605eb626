//! Log construction
//!
//! Builds a [`Dispatch`] from configuration without touching any global
//! state. Installing it is left to the caller.

use tracing::{level_filters::LevelFilter, Dispatch};
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    EnvFilter, Layer, Registry,
};

use crate::config::{LogFormat, LogOutput, LoggingConfig};

/// Build a log dispatcher for `config`.
///
/// `RUST_LOG`, when set, takes precedence over the configured level. An
/// unrecognised level falls back to `info`.
pub fn build(config: &LoggingConfig) -> Dispatch {
    let writer = match config.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
    };
    build_with_writer(config, writer)
}

fn build_with_writer(config: &LoggingConfig, writer: BoxMakeWriter) -> Dispatch {
    let level = config.level_filter().unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Console => fmt::layer().with_writer(writer).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };

    Dispatch::new(Registry::default().with(layer.with_filter(filter)))
}
