//! Central application state for loanbot.
//!
//! `AppState` owns the intake session, the input buffers, the admin/dashboard
//! view state, and handles to the background services. The keybinding
//! dispatcher calls its methods in response to keys; the main loop calls its
//! `apply_*` methods in response to background events. Rendering only reads it
//! (apart from caching viewport heights).

use std::sync::Arc;
use std::time::Duration;

use loanbot_core::auth::AdminGate;
use loanbot_core::db::now_secs;
use loanbot_core::types::{AdminToken, DashboardStats, LoanApplication, LoanResult};
use loanbot_core::{ClientError, DecisionService, IntakeSession, SendOutcome, StoreError};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_rusqlite::Connection;
use tracing::{debug, error, info, warn};

use crate::event::AppEvent;
use crate::input::InputLine;
use crate::worker::{self, LoginError};

/// Which full-screen view is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Chat,
    Login,
    Dashboard,
}

/// Overlay mode layered on top of the active screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    HelpOverlay,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

impl LoginField {
    pub fn toggle(self) -> Self {
        match self {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        }
    }
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: InputLine,
    pub password: InputLine,
    pub field: LoginField,
    pub error: Option<String>,
    /// True while a login check is running; further submits are ignored.
    pub busy: bool,
}

impl LoginForm {
    pub fn active_mut(&mut self) -> &mut InputLine {
        match self.field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub enum DashboardView {
    /// Reading the stored admin token.
    #[default]
    Checking,
    Loading,
    Loaded(DashboardStats),
    Failed(String),
}

/// Handles the app uses to reach the outside world.
#[derive(Clone)]
pub struct Services {
    pub tx: UnboundedSender<AppEvent>,
    pub decisions: Arc<dyn DecisionService>,
    pub store: Connection,
    pub gate: AdminGate,
    pub prompt_delay: Duration,
}

/// A spawned request whose reply has not been applied yet.
struct InFlight {
    id: u64,
    handle: JoinHandle<()>,
}

pub struct AppState {
    pub screen: Screen,
    pub mode: Mode,
    pub help_scroll: u16,

    pub session: IntakeSession,
    /// Chat input buffer. Kept intact when an answer is rejected.
    pub input: InputLine,
    /// Rows scrolled back from the bottom of the transcript; 0 follows new messages.
    pub transcript_scroll: u16,
    /// Inner height of the transcript panel, cached after each render.
    pub transcript_viewport_height: u16,

    pub login: LoginForm,
    pub dashboard: DashboardView,
    pub admin_token: Option<AdminToken>,

    /// Advances on every tick; drives the loading animation.
    pub tick: u64,

    services: Services,
    submission: Option<InFlight>,
    stats_fetch: Option<InFlight>,
    prompt_timer: Option<JoinHandle<()>>,
    next_request: u64,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self {
            screen: Screen::default(),
            mode: Mode::default(),
            help_scroll: 0,
            session: IntakeSession::new(),
            input: InputLine::new(),
            transcript_scroll: 0,
            transcript_viewport_height: 0,
            login: LoginForm::default(),
            dashboard: DashboardView::default(),
            admin_token: None,
            tick: 0,
            services,
            submission: None,
            stats_fetch: None,
            prompt_timer: None,
            next_request: 0,
        }
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_some()
    }

    fn next_request_id(&mut self) -> u64 {
        self.next_request += 1;
        self.next_request
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    /// Sends the chat input buffer to the intake session (Enter on the chat screen).
    pub fn submit_input(&mut self) {
        match self.session.send(self.input.as_str()) {
            SendOutcome::Ignored | SendOutcome::Rejected => {}
            SendOutcome::Advanced { next } => {
                debug!(next = next.key(), "scheduling next question");
                self.input.clear();
                self.schedule_prompt();
            }
            SendOutcome::Submit(application) => {
                self.input.clear();
                self.start_submission(application);
            }
        }
        self.transcript_scroll = 0;
    }

    fn schedule_prompt(&mut self) {
        if self.services.prompt_delay.is_zero() {
            self.session.deliver_prompt();
        } else {
            let timer =
                worker::spawn_prompt_timer(self.services.prompt_delay, self.services.tx.clone());
            if let Some(previous) = self.prompt_timer.replace(timer) {
                previous.abort();
            }
        }
    }

    /// Shows the pending question once its pacing delay has elapsed.
    pub fn deliver_prompt(&mut self) {
        self.prompt_timer = None;
        self.session.deliver_prompt();
    }

    fn start_submission(&mut self, application: LoanApplication) {
        let id = self.next_request_id();
        let handle = worker::spawn_submission(
            Arc::clone(&self.services.decisions),
            application,
            id,
            self.services.tx.clone(),
        );
        self.submission = Some(InFlight { id, handle });
    }

    /// Applies a decision reply. Replies to cancelled submissions are dropped.
    pub fn apply_decision(&mut self, request: u64, result: Result<LoanResult, ClientError>) {
        if !self.submission.as_ref().is_some_and(|f| f.id == request) {
            debug!(request, "dropping stale decision");
            return;
        }
        self.submission = None;
        self.session.complete(result);
        self.transcript_scroll = 0;
    }

    /// Aborts the in-flight submission (Esc while processing).
    pub fn cancel_submission(&mut self) {
        if let Some(inflight) = self.submission.take() {
            inflight.handle.abort();
            info!(request = inflight.id, "loan submission cancelled");
            self.session.cancel();
            self.transcript_scroll = 0;
        }
    }

    /// Resubmits the last failed application (Ctrl-R).
    pub fn retry_submission(&mut self) {
        if self.submission.is_some() {
            return;
        }
        if let Some(application) = self.session.retry() {
            self.start_submission(application);
            self.transcript_scroll = 0;
        }
    }

    pub fn scroll_transcript_up(&mut self, rows: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(rows);
    }

    pub fn scroll_transcript_down(&mut self, rows: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(rows);
    }

    pub fn half_page(&self) -> u16 {
        (self.transcript_viewport_height / 2).max(1)
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    /// Opens the dashboard, or the login screen when no valid token is stored.
    pub fn open_admin(&mut self) {
        self.screen = Screen::Dashboard;
        self.dashboard = DashboardView::Checking;
        worker::spawn_token_load(self.services.store.clone(), self.services.tx.clone());
    }

    pub fn apply_stored_token(&mut self, result: Result<Option<AdminToken>, StoreError>) {
        if self.screen != Screen::Dashboard || self.dashboard != DashboardView::Checking {
            return;
        }
        match result {
            Ok(Some(token)) if self.services.gate.is_valid(&token, now_secs()) => {
                self.admin_token = Some(token);
                self.reload_stats();
            }
            Ok(Some(_)) => {
                info!("stored admin token expired");
                self.show_login(None);
            }
            Ok(None) => self.show_login(None),
            Err(e) => {
                error!(error = %e, "could not read admin token");
                self.show_login(Some(format!("Local store error: {e}")));
            }
        }
    }

    fn show_login(&mut self, error: Option<String>) {
        self.admin_token = None;
        self.screen = Screen::Login;
        self.login.error = error;
        self.login.field = LoginField::Username;
    }

    /// Checks the login form (Enter on the password field).
    pub fn attempt_login(&mut self) {
        if self.login.busy {
            return;
        }
        self.login.busy = true;
        self.login.error = None;
        worker::spawn_login(
            self.services.gate.clone(),
            self.login.username.as_str().to_owned(),
            self.login.password.as_str().to_owned(),
            self.services.store.clone(),
            self.services.tx.clone(),
        );
    }

    pub fn apply_login(&mut self, result: Result<AdminToken, LoginError>) {
        self.login.busy = false;
        self.login.password.clear();
        match result {
            Ok(token) => {
                self.login.error = None;
                self.admin_token = Some(token);
                // The user may have gone back to the chat while the check ran.
                if self.screen == Screen::Login {
                    self.screen = Screen::Dashboard;
                    self.reload_stats();
                }
            }
            Err(e) => {
                warn!(error = %e, "admin login failed");
                self.login.error = Some(e.to_string());
            }
        }
    }

    /// Fetches stats again (`r` on the dashboard). Falls back to login when the
    /// token is missing or expired.
    pub fn reload_stats(&mut self) {
        let token = match &self.admin_token {
            Some(t) if self.services.gate.is_valid(t, now_secs()) => t.token.clone(),
            _ => {
                self.show_login(Some("Session expired. Please sign in again.".to_owned()));
                return;
            }
        };
        if let Some(previous) = self.stats_fetch.take() {
            previous.handle.abort();
        }
        let id = self.next_request_id();
        let handle = worker::spawn_stats_fetch(
            Arc::clone(&self.services.decisions),
            token,
            id,
            self.services.tx.clone(),
        );
        self.stats_fetch = Some(InFlight { id, handle });
        self.dashboard = DashboardView::Loading;
    }

    pub fn apply_stats(&mut self, request: u64, result: Result<DashboardStats, ClientError>) {
        if !self.stats_fetch.as_ref().is_some_and(|f| f.id == request) {
            debug!(request, "dropping stale stats");
            return;
        }
        self.stats_fetch = None;
        self.dashboard = match result {
            Ok(stats) => DashboardView::Loaded(stats),
            Err(e) => {
                warn!(error = %e, "failed to fetch dashboard stats");
                DashboardView::Failed(e.to_string())
            }
        };
    }

    /// Clears the stored token and returns to the login screen (`x`).
    pub fn logout(&mut self) {
        if let Some(inflight) = self.stats_fetch.take() {
            inflight.handle.abort();
        }
        self.dashboard = DashboardView::default();
        self.show_login(None);
        worker::spawn_token_clear(self.services.store.clone(), self.services.tx.clone());
    }

    pub fn apply_logout(&mut self, result: Result<(), StoreError>) {
        match result {
            Ok(()) => info!("admin token cleared"),
            Err(e) => error!(error = %e, "could not clear admin token"),
        }
    }

    pub fn back_to_chat(&mut self) {
        self.screen = Screen::Chat;
    }

    /// Aborts every outstanding request and timer. Called once when the event
    /// loop exits.
    pub fn shutdown(&mut self) {
        for inflight in [self.submission.take(), self.stats_fetch.take()].into_iter().flatten() {
            inflight.handle.abort();
        }
        if let Some(timer) = self.prompt_timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use loanbot_core::auth::AdminCredentials;
    use loanbot_core::types::{LoanStatus, MessageKind, Step, StatsSummary};
    use std::sync::Mutex;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    /// Decision service that records applications and replies from a script.
    struct ScriptedService {
        seen: Mutex<Vec<LoanApplication>>,
        fail_first: Mutex<bool>,
        fail_stats: Mutex<bool>,
    }

    #[async_trait]
    impl DecisionService for ScriptedService {
        async fn apply_loan(&self, application: &LoanApplication) -> Result<LoanResult, ClientError> {
            self.seen.lock().unwrap().push(*application);
            let mut fail = self.fail_first.lock().unwrap();
            if *fail {
                *fail = false;
                return Err(ClientError::Status { status: 500, body: "down".into() });
            }
            Ok(LoanResult {
                status: LoanStatus::Approved,
                title: "Approved".into(),
                message: "ok".into(),
                advice: None,
            })
        }

        async fn dashboard_stats(&self, token: Option<&str>) -> Result<DashboardStats, ClientError> {
            assert!(token.is_some());
            if *self.fail_stats.lock().unwrap() {
                return Err(ClientError::Status { status: 503, body: "stats offline".into() });
            }
            Ok(DashboardStats {
                summary: StatsSummary { total: 1, approved: 1, rejected: 0, conditional: 0 },
                recent_events: Vec::new(),
            })
        }
    }

    async fn state(fail_first: bool) -> (AppState, UnboundedReceiver<AppEvent>, Arc<ScriptedService>) {
        state_with_delay(fail_first, Duration::ZERO).await
    }

    async fn state_with_delay(
        fail_first: bool,
        prompt_delay: Duration,
    ) -> (AppState, UnboundedReceiver<AppEvent>, Arc<ScriptedService>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Arc::new(ScriptedService {
            seen: Mutex::new(Vec::new()),
            fail_first: Mutex::new(fail_first),
            fail_stats: Mutex::new(false),
        });
        let store = loanbot_core::db::open_db(":memory:").await.unwrap();
        let gate = AdminGate::new(
            Some(AdminCredentials {
                username: "ops".into(),
                password_hash: bcrypt_hash("pw"),
            }),
            Duration::from_secs(60),
        );
        let services = Services {
            tx,
            decisions: service.clone(),
            store,
            gate,
            prompt_delay,
        };
        (AppState::new(services), rx, service)
    }

    fn bcrypt_hash(pw: &str) -> String {
        loanbot_core::auth::hash_password(pw).unwrap()
    }

    fn type_and_send(app: &mut AppState, text: &str) {
        text.chars().for_each(|c| app.input.push(c));
        app.submit_input();
    }

    async fn pump(app: &mut AppState, rx: &mut UnboundedReceiver<AppEvent>) {
        match rx.recv().await.unwrap() {
            AppEvent::Decision { request, result } => app.apply_decision(request, result),
            AppEvent::Stats { request, result } => app.apply_stats(request, result),
            AppEvent::StoredToken(result) => app.apply_stored_token(result),
            AppEvent::LoginFinished(result) => app.apply_login(result),
            AppEvent::LoggedOut(result) => app.apply_logout(result),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn full_intake_reaches_done() {
        let (mut app, mut rx, service) = state(false).await;
        for answer in ["50000", "5000", "200000", "24"] {
            type_and_send(&mut app, answer);
        }
        assert_eq!(app.session.step(), Step::Processing);
        assert!(app.input.is_empty());

        pump(&mut app, &mut rx).await;
        assert_eq!(app.session.step(), Step::Done);
        assert_eq!(app.session.transcript().last().unwrap().kind, MessageKind::Result);
        assert_eq!(service.seen.lock().unwrap()[0].tenure_months, 24);
    }

    #[tokio::test]
    async fn rejected_input_stays_in_the_buffer() {
        let (mut app, _rx, _) = state(false).await;
        type_and_send(&mut app, "abc");
        assert_eq!(app.input.as_str(), "abc");
        assert_eq!(app.session.step(), Step::Income);
    }

    #[tokio::test]
    async fn failure_then_retry_resubmits_same_application() {
        let (mut app, mut rx, service) = state(true).await;
        for answer in ["50000", "5000", "200000", "24"] {
            type_and_send(&mut app, answer);
        }
        pump(&mut app, &mut rx).await;
        assert_eq!(app.session.step(), Step::Income);
        assert!(app.session.answers().is_empty());

        app.retry_submission();
        assert_eq!(app.session.step(), Step::Processing);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.session.step(), Step::Done);

        let seen = service.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
    }

    #[tokio::test]
    async fn stale_decision_after_cancel_is_ignored() {
        let (mut app, _rx, _) = state(false).await;
        for answer in ["50000", "5000", "200000", "24"] {
            type_and_send(&mut app, answer);
        }
        app.cancel_submission();
        assert_eq!(app.session.step(), Step::Income);
        let len = app.session.transcript().len();

        app.apply_decision(
            1,
            Ok(LoanResult {
                status: LoanStatus::Approved,
                title: "late".into(),
                message: "late".into(),
                advice: None,
            }),
        );
        assert_eq!(app.session.transcript().len(), len);
        assert_eq!(app.session.step(), Step::Income);
    }

    #[tokio::test]
    async fn admin_without_token_goes_to_login_then_dashboard() {
        let (mut app, mut rx, _) = state(false).await;
        app.open_admin();
        pump(&mut app, &mut rx).await;
        assert_eq!(app.screen, Screen::Login);

        "ops".chars().for_each(|c| app.login.username.push(c));
        "wrong".chars().for_each(|c| app.login.password.push(c));
        app.attempt_login();
        pump(&mut app, &mut rx).await;
        assert_eq!(app.screen, Screen::Login);
        assert_eq!(app.login.error.as_deref(), Some("Invalid credentials"));

        "pw".chars().for_each(|c| app.login.password.push(c));
        app.attempt_login();
        pump(&mut app, &mut rx).await;
        assert_eq!(app.screen, Screen::Dashboard);
        assert_eq!(app.dashboard, DashboardView::Loading);

        pump(&mut app, &mut rx).await;
        assert!(matches!(app.dashboard, DashboardView::Loaded(ref s) if s.summary.total == 1));

        // The token was persisted, so reopening skips the login screen.
        app.back_to_chat();
        app.open_admin();
        pump(&mut app, &mut rx).await;
        assert_eq!(app.dashboard, DashboardView::Loading);

        app.logout();
        assert_eq!(app.screen, Screen::Login);
        assert!(app.admin_token.is_none());
    }

    fn sign_in(app: &mut AppState) {
        "ops".chars().for_each(|c| app.login.username.push(c));
        "pw".chars().for_each(|c| app.login.password.push(c));
        app.attempt_login();
    }

    fn expired_token() -> AdminToken {
        let now = now_secs();
        AdminToken {
            token: "old".into(),
            issued_at: now - 120,
            expires_at: now - 60,
        }
    }

    #[tokio::test]
    async fn login_finishing_after_leaving_the_form_stays_in_chat() {
        let (mut app, mut rx, _) = state(false).await;
        app.open_admin();
        pump(&mut app, &mut rx).await;
        assert_eq!(app.screen, Screen::Login);

        sign_in(&mut app);
        app.back_to_chat();
        "500".chars().for_each(|c| app.input.push(c));
        pump(&mut app, &mut rx).await;

        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.input.as_str(), "500");
        assert!(app.admin_token.is_some());
        assert!(rx.try_recv().is_err(), "no stats fetch while in chat");
    }

    #[tokio::test]
    async fn stats_failure_is_shown_and_reload_recovers() {
        let (mut app, mut rx, service) = state(false).await;
        *service.fail_stats.lock().unwrap() = true;
        app.open_admin();
        pump(&mut app, &mut rx).await;
        sign_in(&mut app);
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;
        assert_eq!(
            app.dashboard,
            DashboardView::Failed("Server error (503): stats offline".into())
        );
        assert_eq!(app.screen, Screen::Dashboard);

        *service.fail_stats.lock().unwrap() = false;
        app.reload_stats();
        assert_eq!(app.dashboard, DashboardView::Loading);
        pump(&mut app, &mut rx).await;
        assert!(matches!(app.dashboard, DashboardView::Loaded(_)));
    }

    #[tokio::test]
    async fn expired_stored_token_opens_login() {
        let (mut app, mut rx, _) = state(false).await;
        loanbot_core::db::save_admin_token(&app.services.store, &expired_token())
            .await
            .unwrap();
        app.open_admin();
        pump(&mut app, &mut rx).await;
        assert_eq!(app.screen, Screen::Login);
        assert!(app.admin_token.is_none());
        assert!(app.login.error.is_none());
    }

    #[tokio::test]
    async fn reload_with_expired_token_asks_to_sign_in_again() {
        let (mut app, _rx, _) = state(false).await;
        app.screen = Screen::Dashboard;
        app.admin_token = Some(expired_token());
        app.reload_stats();
        assert_eq!(app.screen, Screen::Login);
        assert_eq!(
            app.login.error.as_deref(),
            Some("Session expired. Please sign in again.")
        );
    }

    #[tokio::test]
    async fn shutdown_stops_a_pending_prompt_timer() {
        let (mut app, mut rx, _) = state_with_delay(false, Duration::from_millis(20)).await;
        type_and_send(&mut app, "50000");
        assert_eq!(app.session.pending_prompt(), Some(Step::Emi));
        app.shutdown();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(rx.try_recv().is_err());
    }
}
