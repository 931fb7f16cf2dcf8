//! Background tasks for network and store I/O.
//!
//! Each function spawns one tokio task that does a single piece of I/O and
//! reports back through the event channel. Nothing here touches `AppState`;
//! the main loop applies the resulting `AppEvent`s. Request tasks return their
//! `JoinHandle` so the caller can abort them.

use std::sync::Arc;
use std::time::Duration;

use loanbot_core::auth::AdminGate;
use loanbot_core::db;
use loanbot_core::types::{AdminToken, LoanApplication};
use loanbot_core::{AuthError, DecisionService, StoreError};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_rusqlite::Connection;
use tracing::{debug, error};

use crate::event::AppEvent;

#[derive(Error, Debug)]
pub enum LoginError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("could not save admin session: {0}")]
    Store(#[from] StoreError),
    #[error("login check did not finish")]
    Interrupted,
}

/// Submits `application` and sends `AppEvent::Decision` tagged with `request`.
pub fn spawn_submission(
    service: Arc<dyn DecisionService>,
    application: LoanApplication,
    request: u64,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(request, "loan submission started");
        let result = service.apply_loan(&application).await;
        let _ = tx.send(AppEvent::Decision { request, result });
    })
}

/// Fetches dashboard stats with `token` as the bearer credential.
pub fn spawn_stats_fetch(
    service: Arc<dyn DecisionService>,
    token: String,
    request: u64,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(request, "dashboard stats fetch started");
        let result = service.dashboard_stats(Some(&token)).await;
        let _ = tx.send(AppEvent::Stats { request, result });
    })
}

/// Sends `AppEvent::PromptDue` after `delay`.
pub fn spawn_prompt_timer(delay: Duration, tx: UnboundedSender<AppEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(AppEvent::PromptDue);
    })
}

pub fn spawn_token_load(store: Connection, tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let result = db::load_admin_token(&store).await;
        let _ = tx.send(AppEvent::StoredToken(result));
    });
}

/// Checks credentials off the UI task (bcrypt is deliberately slow), then
/// persists the issued token.
pub fn spawn_login(
    gate: AdminGate,
    username: String,
    password: String,
    store: Connection,
    tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        let now = db::now_secs();
        let checked =
            tokio::task::spawn_blocking(move || gate.login(&username, &password, now)).await;
        let result = match checked {
            Ok(Ok(token)) => save_token(&store, token).await,
            Ok(Err(e)) => Err(LoginError::Auth(e)),
            Err(join) => {
                error!(error = %join, "login check panicked");
                Err(LoginError::Interrupted)
            }
        };
        let _ = tx.send(AppEvent::LoginFinished(result));
    });
}

async fn save_token(store: &Connection, token: AdminToken) -> Result<AdminToken, LoginError> {
    db::save_admin_token(store, &token).await?;
    Ok(token)
}

pub fn spawn_token_clear(store: Connection, tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let result = db::clear_admin_token(&store).await;
        let _ = tx.send(AppEvent::LoggedOut(result));
    });
}
