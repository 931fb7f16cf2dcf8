//! Terminal lifecycle management for loanbot.
//!
//! The TUI draws to stdout through a buffered crossterm backend. Logs never
//! share the terminal: they go to the rolling log file (see `logging.rs`).

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use signal_hook::consts::SIGTERM;
use signal_hook::flag::register;
use std::io::{stdout, BufWriter, Stdout};
use std::panic;
use std::sync::{atomic::AtomicBool, Arc};

/// CrosstermBackend over a buffered stdout writer.
///
/// `BufWriter` batches escape sequences into fewer write(2) calls per frame.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stdout>>>;

/// Enables raw mode and enters the alternate screen. Pair with [`restore_tui`]
/// on every exit path.
///
/// # Errors
///
/// Returns `Err` if `enable_raw_mode`, `execute!`, or `Terminal::new` fails.
pub fn init_tui() -> std::io::Result<Tui> {
    let mut out = BufWriter::new(stdout());
    enable_raw_mode()?;
    execute!(out, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(out))
}

/// Leaves the alternate screen and disables raw mode. Idempotent.
///
/// ratatui does not restore the terminal on `Drop`, so this must run on normal
/// exit and from the panic hook.
pub fn restore_tui() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Installs a panic hook that restores the terminal before the previous hook
/// prints the panic message. Call before [`init_tui`].
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // best-effort: already panicking
        let _ = restore_tui();
        original_hook(panic_info);
    }));
}

/// Registers a SIGTERM handler that flips the returned flag to `true`.
///
/// The main loop polls the flag on a 50 ms heartbeat.
///
/// # Panics
///
/// Panics if the OS refuses to register the handler; this happens before the
/// terminal is touched, so the message stays readable.
pub fn register_sigterm() -> Arc<AtomicBool> {
    let term = Arc::new(AtomicBool::new(false));
    register(SIGTERM, Arc::clone(&term)).expect("Failed to register SIGTERM handler");
    term
}
