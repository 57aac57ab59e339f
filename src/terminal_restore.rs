//! Terminal-state guards so a crash mid-call never leaves the shell in raw mode.

use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
};

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static ALT_SCREEN_ENABLED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// RAII guard to restore terminal state on drop (and on panic via a shared hook).
pub struct TerminalRestoreGuard;

impl TerminalRestoreGuard {
    /// Create a guard and install the shared panic hook (once).
    #[must_use]
    pub fn new() -> Self {
        install_terminal_panic_hook();
        TerminalRestoreGuard
    }

    /// Enable raw mode and remember to undo it.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot enter raw mode.
    pub fn enable_raw_mode(&self) -> io::Result<()> {
        enable_raw_mode()?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Switch to the alternate screen and remember to leave it.
    ///
    /// # Errors
    ///
    /// Returns an error if alternate-screen activation fails.
    pub fn enter_alt_screen(&self, stdout: &mut impl Write) -> io::Result<()> {
        execute!(stdout, EnterAlternateScreen)?;
        ALT_SCREEN_ENABLED.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn restore(&self) {
        restore_terminal();
    }
}

impl Default for TerminalRestoreGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leave raw mode and the alternate screen if we entered them, then show the cursor.
pub fn restore_terminal() {
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
    let mut stdout = io::stdout();
    if ALT_SCREEN_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
    let _ = execute!(stdout, Show);
    let _ = stdout.flush();
}

/// Message printed to the restored terminal when the UI crashes. A call may still be
/// live on the service side, so the user is told to check before retrying.
fn crash_notice(location: &str, logging: bool) -> String {
    let log_hint = if logging {
        format!("debug log: {}", crate::log_file_path().display())
    } else {
        "rerun with --logs to capture a debug log".to_string()
    };
    format!(
        "callterm crashed at {location}. Any call already placed may still be connected; \
         check the assistant dashboard before starting another. ({log_hint})"
    )
}

/// Install a panic hook that restores terminal state before delegating.
pub fn install_terminal_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            tracing::error!(%location, "panic");
            crate::log_debug(&format!("panic at {location}"));
            crate::log_debug_content(&format!("panic: {info}"));
            eprintln!("{}", crash_notice(&location, crate::logging::debug_log_active()));
            previous(info);
        }));
    });
}
