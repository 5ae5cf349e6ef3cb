//! A handler that writes a line per component start/end to a writer.

use super::{CallbackInput, CallbackOutput, Context, Handler, HandlerBuilder, RunInfo};
use crate::error::LogCallbackError;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::error;

pub const LOG_DIR: &str = "log";
pub const LOG_FILE: &str = "agent.log";

pub struct LogCallbackConfig {
    /// Also print the start payload, not just the header line.
    pub detail: bool,
    /// Pretty-print the payload instead of compact JSON.
    pub debug: bool,
    /// Defaults to stdout.
    pub writer: Option<Box<dyn Write + Send>>,
}

impl Default for LogCallbackConfig {
    fn default() -> Self {
        Self {
            detail: true,
            debug: false,
            writer: None,
        }
    }
}

struct LogSink {
    detail: bool,
    debug: bool,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LogSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        writeln!(writer, "{}", line)?;
        writer.flush()
    }

    fn render(&self, input: &CallbackInput) -> serde_json::Result<String> {
        if self.debug {
            serde_json::to_string_pretty(input)
        } else {
            serde_json::to_string(input)
        }
    }

    fn start(&self, ctx: Context, info: &RunInfo, input: &CallbackInput) -> Option<Context> {
        if let Err(e) = self.write_line(&header("start", info)) {
            error!("[log callback on_start] write [view] err={}", e);
            return None;
        }
        if self.detail {
            let body = match self.render(input) {
                Ok(body) => body,
                Err(e) => {
                    error!("[log callback on_start] marshal [input] err={}", e);
                    String::new()
                }
            };
            if let Err(e) = self.write_line(&body) {
                error!("[log callback on_start] write [input] err={}", e);
                return None;
            }
        }
        Some(ctx)
    }

    fn end(&self, ctx: Context, info: &RunInfo, _output: &CallbackOutput) -> Option<Context> {
        if let Err(e) = self.write_line(&header("end", info)) {
            error!("[log callback on_end] write [view] err={}", e);
            return None;
        }
        Some(ctx)
    }
}

fn header(event: &str, info: &RunInfo) -> String {
    format!(
        "[view]: {} [{}:{}:{}]",
        event, info.component, info.component_type, info.name
    )
}

/// Builds the logging handler. `None` logs details to stdout.
pub fn log_callback(config: Option<LogCallbackConfig>) -> Arc<dyn Handler> {
    let config = config.unwrap_or_default();
    let writer = config
        .writer
        .unwrap_or_else(|| Box::new(io::stdout()) as Box<dyn Write + Send>);
    let sink = Arc::new(LogSink {
        detail: config.detail,
        debug: config.debug,
        writer: Mutex::new(writer),
    });

    let start_sink = sink.clone();
    HandlerBuilder::new()
        .on_start_fn(move |ctx, info, input| start_sink.start(ctx, info, input))
        .on_end_fn(move |ctx, info, output| sink.end(ctx, info, output))
        .build()
}

/// Logging handler appending to `log/agent.log` under the working directory.
/// `DEBUG=true` switches to pretty-printed payloads.
pub fn new_log_callback() -> Result<Arc<dyn Handler>, LogCallbackError> {
    new_log_callback_in(LOG_DIR)
}

pub fn new_log_callback_in(dir: impl AsRef<Path>) -> Result<Arc<dyn Handler>, LogCallbackError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| {
        error!("create log directory failed, err={}", source);
        LogCallbackError::CreateDir {
            path: dir.display().to_string(),
            source,
        }
    })?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| {
            error!("open log file err={}", source);
            LogCallbackError::OpenFile {
                path: path.display().to_string(),
                source,
            }
        })?;

    let debug = std::env::var("DEBUG").map(|v| v == "true").unwrap_or(false);
    Ok(log_callback(Some(LogCallbackConfig {
        detail: true,
        debug,
        writer: Some(Box::new(file)),
    })))
}
