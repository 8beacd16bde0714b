use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directive for the given flags
pub fn filter_directive(debug: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if debug {
        // Request/response detail without hyper's connection chatter
        "debug,hyper=warn,reqwest::connect=warn"
    } else {
        "info"
    }
}

/// Initialise tracing. The returned guard must be kept alive while logging
/// to a file so buffered lines are flushed on exit.
pub fn init_logging(debug: bool, quiet: bool, log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let directive = filter_directive(debug, quiet);
    let filter = if quiet {
        EnvFilter::new(directive)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stderr().is_terminal());

    let registry = Registry::default().with(filter);

    if let Some(log_path) = log_file {
        let log_dir = match log_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&log_dir)?;
        let log_filename = log_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;

        let file_appender = tracing_appender::rolling::never(&log_dir, log_filename);
        let (writer, guard) = tracing_appender::non_blocking(file_appender);

        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(writer);

            registry.with(json_layer).try_init()?;
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false) // Disable ANSI codes when writing to file
                .with_writer(writer);

            registry.with(fmt_layer).try_init()?;
        }

        return Ok(Some(guard));
    }

    if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(json_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(fmt_layer).try_init()?;
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(false, false), "info");
        assert!(filter_directive(true, false).starts_with("debug"));
        assert_eq!(filter_directive(true, true), "error");
    }
}
