//! Keybinding dispatcher for loanbot.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to continue or quit. The dispatcher
//! branches first on `state.mode`, then on `state.screen`, so the help overlay and
//! each screen have isolated handler functions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{AppState, LoginField, Mode, Screen};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Continue the event loop normally.
    Continue,
    /// Exit cleanly.
    Quit,
}

/// Dispatches a key event to the handler matching the current mode and screen.
///
/// Ctrl-C quits from anywhere, including while the help overlay is open.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => match state.screen {
            Screen::Chat => handle_chat(key, state),
            Screen::Login => handle_login(key, state),
            Screen::Dashboard => handle_dashboard(key, state),
        },
    }
}

fn open_help(state: &mut AppState) -> KeyAction {
    state.help_scroll = 0;
    state.mode = Mode::HelpOverlay;
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Chat screen
// ---------------------------------------------------------------------------

/// Handles a key event on the chat screen.
///
/// Printable characters always go to the input line, so the only plain
/// character with another meaning is `?` on an empty line. Everything else
/// uses Ctrl, function, or navigation keys.
fn handle_chat(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('r') if ctrl => state.retry_submission(),
        KeyCode::Char('q') if ctrl => return KeyAction::Quit,
        KeyCode::F(1) => return open_help(state),
        KeyCode::Char('?') if state.input.is_empty() => return open_help(state),
        KeyCode::F(2) => state.open_admin(),

        KeyCode::Enter => state.submit_input(),
        KeyCode::Esc => {
            if state.is_submitting() {
                state.cancel_submission();
            } else {
                state.input.clear();
            }
        }
        KeyCode::Backspace => state.input.pop(),
        KeyCode::Char(c) if !ctrl => state.input.push(c),

        KeyCode::PageUp => {
            let rows = state.half_page();
            state.scroll_transcript_up(rows);
        }
        KeyCode::PageDown => {
            let rows = state.half_page();
            state.scroll_transcript_down(rows);
        }
        KeyCode::End => state.transcript_scroll = 0,

        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Login screen
// ---------------------------------------------------------------------------

/// Handles a key event on the admin login form.
///
/// Enter on the username field moves to the password field; Enter on the
/// password field submits. Esc returns to the chat.
fn handle_login(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            state.login.field = state.login.field.toggle();
        }
        KeyCode::Enter => match state.login.field {
            LoginField::Username => state.login.field = LoginField::Password,
            LoginField::Password => state.attempt_login(),
        },
        KeyCode::Esc => state.back_to_chat(),
        KeyCode::F(1) => return open_help(state),
        KeyCode::Backspace => state.login.active_mut().pop(),
        KeyCode::Char(c) if !ctrl => state.login.active_mut().push(c),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Dashboard screen
// ---------------------------------------------------------------------------

fn handle_dashboard(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('r') => state.reload_stats(),
        KeyCode::Char('x') => state.logout(),
        KeyCode::Esc => state.back_to_chat(),
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('?') | KeyCode::F(1) => return open_help(state),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

/// Handles a key event while the help overlay is visible.
///
/// `?`, `F1`, `Esc`, or `q` dismisses the overlay. j/k and the arrow keys scroll it.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc | KeyCode::F(1) => {
            state.mode = Mode::Normal;
        }
        _ => {}
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use loanbot_core::auth::AdminGate;
    use loanbot_core::HttpDecisionService;
    use tokio::sync::mpsc;

    use crate::app::Services;

    async fn state() -> AppState {
        let (tx, _rx) = mpsc::unbounded_channel();
        let decisions =
            HttpDecisionService::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        AppState::new(Services {
            tx,
            decisions: Arc::new(decisions),
            store: loanbot_core::db::open_db(":memory:").await.unwrap(),
            gate: AdminGate::new(None, Duration::from_secs(60)),
            prompt_delay: Duration::ZERO,
        })
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_every_screen_and_overlay() {
        let mut app = state().await;
        assert_eq!(handle_key(ctrl('c'), &mut app), KeyAction::Quit);
        app.mode = Mode::HelpOverlay;
        assert_eq!(handle_key(ctrl('c'), &mut app), KeyAction::Quit);
        app.mode = Mode::Normal;
        app.screen = Screen::Login;
        assert_eq!(handle_key(ctrl('c'), &mut app), KeyAction::Quit);
    }

    #[tokio::test]
    async fn plain_q_is_typed_into_the_chat_input() {
        let mut app = state().await;
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut app), KeyAction::Continue);
        assert_eq!(app.input.as_str(), "q");
    }

    #[tokio::test]
    async fn question_mark_opens_help_only_on_empty_input() {
        let mut app = state().await;
        handle_key(press(KeyCode::Char('5')), &mut app);
        handle_key(press(KeyCode::Char('?')), &mut app);
        assert_eq!(app.input.as_str(), "5?");
        assert_eq!(app.mode, Mode::Normal);

        app.input.clear();
        handle_key(press(KeyCode::Char('?')), &mut app);
        assert_eq!(app.mode, Mode::HelpOverlay);
        handle_key(press(KeyCode::Esc), &mut app);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[tokio::test]
    async fn enter_sends_the_answer() {
        let mut app = state().await;
        for c in "50000".chars() {
            handle_key(press(KeyCode::Char(c)), &mut app);
        }
        handle_key(press(KeyCode::Enter), &mut app);
        assert!(app.input.is_empty());
        assert_eq!(app.session.answers().income, "50000");
    }

    #[tokio::test]
    async fn login_form_moves_between_fields() {
        let mut app = state().await;
        app.screen = Screen::Login;
        handle_key(press(KeyCode::Char('o')), &mut app);
        handle_key(press(KeyCode::Enter), &mut app);
        assert_eq!(app.login.field, LoginField::Password);
        handle_key(press(KeyCode::Char('p')), &mut app);
        handle_key(press(KeyCode::Tab), &mut app);
        handle_key(press(KeyCode::Backspace), &mut app);
        assert_eq!(app.login.username.as_str(), "");
        assert_eq!(app.login.password.as_str(), "p");

        handle_key(press(KeyCode::Esc), &mut app);
        assert_eq!(app.screen, Screen::Chat);
    }
}
