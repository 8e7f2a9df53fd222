use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::fmt;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub level: String,
    pub verbose: bool,
    /// Append to this file instead of writing to stderr.
    pub file: Option<String>,
}

pub fn init(options: &LogOptions) -> Result<()> {
    let level = if options.verbose {
        Level::DEBUG
    } else {
        parse_level(&options.level)?
    };
    let builder = fmt()
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_max_level(level);

    match options.file.as_deref() {
        Some(path) => {
            let file = open_log_file(Path::new(path))?;
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
    Ok(())
}

fn parse_level(raw: &str) -> Result<Level> {
    match raw.trim().to_lowercase().as_str() {
        "" | "info" => Ok(Level::INFO),
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(anyhow!("unknown log level '{}'", other)),
    }
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file: {}", path.display()))
}
