//! File-backed debug log; the terminal UI owns stdout so diagnostics cannot go there.

use crate::config::AppConfig;
use std::{
    env, fs,
    io::Write,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 2 * 1024 * 1024;
const LOG_FILE_ENV: &str = "CALLTERM_LOG";

static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_STATE: OnceLock<Mutex<Option<LogWriter>>> = OnceLock::new();

/// Debug log location (`$CALLTERM_LOG`, else a file in the temp dir).
pub fn log_file_path() -> PathBuf {
    env::var(LOG_FILE_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("callterm.log"))
}

struct LogWriter {
    path: PathBuf,
    file: fs::File,
    bytes_written: u64,
}

impl LogWriter {
    fn open(path: PathBuf) -> Option<Self> {
        let mut bytes_written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if bytes_written > LOG_MAX_BYTES {
            let _ = fs::remove_file(&path);
            bytes_written = 0;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        Some(Self {
            path,
            file,
            bytes_written,
        })
    }

    fn write_line(&mut self, line: &str) {
        if self.bytes_written.saturating_add(line.len() as u64) > LOG_MAX_BYTES {
            // Start over rather than grow without bound.
            if let Ok(file) = fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)
            {
                self.file = file;
                self.bytes_written = 0;
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.bytes_written = self.bytes_written.saturating_add(line.len() as u64);
        }
    }
}

fn log_state() -> &'static Mutex<Option<LogWriter>> {
    LOG_STATE.get_or_init(|| Mutex::new(None))
}

fn apply_logging(enabled: bool, content_enabled: bool) {
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    LOG_CONTENT_ENABLED.store(enabled && content_enabled, Ordering::Relaxed);
    let mut state = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *state = if enabled {
        LogWriter::open(log_file_path())
    } else {
        None
    };
}

/// Turn the debug log on or off from CLI flags.
pub fn init_logging(config: &AppConfig) {
    apply_logging(config.logging_enabled(), config.log_content);
}

pub(crate) fn debug_log_active() -> bool {
    LOG_ENABLED.load(Ordering::Relaxed)
}

/// Append a timestamped line to the debug log when logging is enabled.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let line = format!("[{timestamp}] {msg}\n");
    let mut state = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(writer) = state.as_mut() {
        writer.write_line(&line);
    }
}

/// Log lines that carry caller details (names, phone numbers, emails).
pub fn log_debug_content(msg: &str) {
    if !LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    log_debug(msg);
}

#[cfg(test)]
pub(crate) fn set_logging_for_tests(enabled: bool, content_enabled: bool) {
    apply_logging(enabled, content_enabled);
}
