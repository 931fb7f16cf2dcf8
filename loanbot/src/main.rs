//! loanbot: terminal loan eligibility advisor.
//!
//! Entry point for the `loanbot` binary. Wires together the config file, the
//! log file, the local store, the decision-service client, the terminal
//! lifecycle (`tui`), the event bus (`event`), and the UI (`ui`).
//!
//! # Startup sequence
//!
//! 1. Parse arguments; `hash-password` runs and exits before anything else.
//! 2. Load config (soft failure) and start logging. The parse warning, if any,
//!    is logged once the subscriber exists.
//! 3. Open the store and build the HTTP client. Failures here abort with a
//!    readable message because the terminal has not been touched yet.
//! 4. `install_panic_hook()`, `register_sigterm()`, `init_tui()`.
//! 5. Spawn the event task and run the loop.
//!
//! `restore_tui()` runs after the loop exits on every path (quit key, SIGTERM,
//! channel close, draw error). The panic hook covers panics.

mod app;
mod cli;
mod config;
mod event;
mod input;
mod logging;
mod theme;
mod tui;
mod ui;
mod worker;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use loanbot_core::{DecisionService, HttpDecisionService};

use crate::app::{AppState, Services};
use crate::cli::{Args, Command, StartScreen};
use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, KeyAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(Command::HashPassword) = args.command {
        return hash_password();
    }

    let config_file = args.config.clone().unwrap_or_else(config::config_path);
    let (mut config, config_warning) = config::load(&config_file);
    if let Some(server) = args.server {
        config.server_url = server;
    }

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;
    let _log_guard = logging::init_tracing(&config.log_dir(), args.log_to_stderr)?;
    if let Some(warning) = config_warning {
        warn!("{warning}");
    }
    info!(server = %config.server_url, config = %config_file.display(), "loanbot starting");

    let db_path = config.db_path();
    let store = loanbot_core::db::open_db(&db_path.to_string_lossy())
        .await
        .with_context(|| format!("failed to open local store {}", db_path.display()))?;
    let decisions: Arc<dyn DecisionService> = Arc::new(
        HttpDecisionService::new(&config.server_url, config.request_timeout())
            .with_context(|| format!("invalid server url {}", config.server_url))?,
    );
    let gate = config.admin_gate();
    if !gate.is_enabled() {
        info!("admin login disabled: [admin] username/password_hash not configured");
    }
    let theme = theme::Theme::from_name(&config.theme);

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm();
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let mut state = AppState::new(Services {
        tx: handler.tx.clone(),
        decisions,
        store,
        gate,
        prompt_delay: config.prompt_delay(),
    });
    if args.screen == StartScreen::Admin {
        state.open_admin();
    }

    // Exits only via `break`, so `restore_tui()` below is always reached.
    let mut loop_result = Ok(());
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when idle.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    info!("SIGTERM received");
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        // Exactly one draw() call per Render event.
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            loop_result = Err(e);
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    // ratatui picks up the new size on the next draw.
                    Some(AppEvent::Resize(_, _)) => {}
                    Some(AppEvent::Tick) => state.on_tick(),
                    Some(AppEvent::PromptDue) => state.deliver_prompt(),
                    Some(AppEvent::Decision { request, result }) => state.apply_decision(request, result),
                    Some(AppEvent::Stats { request, result }) => state.apply_stats(request, result),
                    Some(AppEvent::StoredToken(result)) => state.apply_stored_token(result),
                    Some(AppEvent::LoginFinished(result)) => state.apply_login(result),
                    Some(AppEvent::LoggedOut(result)) => state.apply_logout(result),
                    Some(AppEvent::Quit) | None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    state.shutdown();
    tui::restore_tui()?;
    info!("loanbot exiting");
    loop_result.context("failed to draw frame")
}

/// `loanbot hash-password`: reads a password twice without echo and prints its
/// bcrypt hash for the `[admin] password_hash` config key.
fn hash_password() -> anyhow::Result<()> {
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        bail!("passwords do not match");
    }
    if password.is_empty() {
        bail!("password must not be empty");
    }
    let hash = loanbot_core::auth::hash_password(&password)?;
    println!("{hash}");
    Ok(())
}
