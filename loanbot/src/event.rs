//! Event bus for loanbot.
//!
//! Terminal input, timer ticks, pacing timers, and background request results
//! are normalised into a single `AppEvent` and sent over a tokio unbounded MPSC
//! channel. The main loop is the only consumer, so every state mutation happens
//! on one task in the order events arrive.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms ≈ 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick interval** (250 ms) advances the loading animation.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use loanbot_core::types::{AdminToken, DashboardStats, LoanResult};
use loanbot_core::{ClientError, StoreError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::worker::LoginError;

/// All events the application can receive from any source.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A key press (`KeyEventKind::Press` only).
    Key(KeyEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Logic tick (250 ms).
    Tick,
    /// Render tick (≈30 FPS).
    Render,
    /// The pacing delay for the next intake question has elapsed.
    PromptDue,
    /// Outcome of a loan submission. `request` identifies the submission so a
    /// reply to a cancelled request can be told apart from the current one.
    Decision {
        request: u64,
        result: Result<LoanResult, ClientError>,
    },
    /// Outcome of a dashboard stats fetch.
    Stats {
        request: u64,
        result: Result<DashboardStats, ClientError>,
    },
    /// Admin token read from the local store when the dashboard is opened.
    StoredToken(Result<Option<AdminToken>, StoreError>),
    /// Outcome of a login attempt (credential check + token save).
    LoginFinished(Result<AdminToken, LoginError>),
    /// Outcome of clearing the stored admin token.
    LoggedOut(Result<(), StoreError>),
    /// Quit signal.
    Quit,
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned into every background task; the receiver (`rx`)
/// is owned by the main event loop.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that turns crossterm input and the two intervals into events.
///
/// Runs until the receiver is dropped. `reader.next().fuse()` keeps
/// `tokio::select!` from polling a finished stream, and only `Press` key events
/// are forwarded so terminals that report releases do not double every key.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let sent = tokio::select! {
                _ = tick_tick => tx.send(AppEvent::Tick),
                _ = render_tick => tx.send(AppEvent::Render),
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Some(Ok(Event::Resize(w, h))) => tx.send(AppEvent::Resize(w, h)),
                    Some(Ok(_)) => Ok(()),
                    Some(Err(_)) | None => tx.send(AppEvent::Quit),
                },
            };
            if sent.is_err() {
                break;
            }
        }
    });
}
