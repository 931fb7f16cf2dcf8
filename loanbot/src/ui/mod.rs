//! UI rendering module for loanbot.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each
//! screen has its own module.

mod chat;
mod dashboard;
mod layout;
mod login;
pub mod help;
pub mod keybindings;

use ratatui::Frame;

use crate::app::{AppState, Mode, Screen};
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar};

/// Renders one complete frame: the active screen, the status bar, and the help
/// overlay when it is open.
///
/// Takes `state` mutably so the chat view can cache its viewport height for the
/// next PgUp/PgDn and clamp the transcript scroll offset.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [main, status_bar] = compute_layout(frame);

    match state.screen {
        Screen::Chat => chat::render_chat(frame, main, state, theme),
        Screen::Login => login::render_login(frame, main, state, theme),
        Screen::Dashboard => dashboard::render_dashboard(frame, main, state, theme),
    }

    render_status_bar(frame, status_bar, state, theme);

    // Rendered last so it sits on top; it clears its own background.
    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
