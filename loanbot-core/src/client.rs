//! Client for the external decision service.
//!
//! [`DecisionService`] is the seam between the TUI and the network: the binary
//! holds an `Arc<dyn DecisionService>` and tests substitute their own impl.
//! [`HttpDecisionService`] is the production implementation over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::types::{DashboardStats, LoanApplication, LoanResult};

pub const APPLY_LOAN_PATH: &str = "/chat/apply-loan";
pub const DASHBOARD_STATS_PATH: &str = "/api/dashboard/stats";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait DecisionService: Send + Sync {
    /// Submits one application and returns the decision.
    async fn apply_loan(&self, application: &LoanApplication) -> Result<LoanResult, ClientError>;

    /// Fetches dashboard aggregates. `token` is sent as a bearer credential when present.
    async fn dashboard_stats(&self, token: Option<&str>) -> Result<DashboardStats, ClientError>;
}

/// `reqwest`-backed [`DecisionService`] with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpDecisionService {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpDecisionService {
    /// Builds a client rooted at `base_url` (e.g. `http://127.0.0.1:8000`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `base_url` does not parse, and
    /// `ClientError::Transport` if the TLS backend fails to initialise.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::Url(e.to_string()))?;
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { client, base_url, timeout })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url.join(path).map_err(|e| ClientError::Url(e.to_string()))
    }

    fn map_send_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout.as_secs())
        } else {
            ClientError::Transport(err.to_string())
        }
    }

    /// Sends `request`, turns non-2xx replies into `ClientError::Status`, and
    /// decodes the JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body_len = body.len(), "decision service error");
            return Err(ClientError::Status { status: status.as_u16(), body });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        debug!(status = status.as_u16(), body_len = body.len(), "decision service reply");
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DecisionService for HttpDecisionService {
    async fn apply_loan(&self, application: &LoanApplication) -> Result<LoanResult, ClientError> {
        let url = self.endpoint(APPLY_LOAN_PATH)?;
        self.send_json(self.client.post(url).json(application)).await
    }

    async fn dashboard_stats(&self, token: Option<&str>) -> Result<DashboardStats, ClientError> {
        let url = self.endpoint(DASHBOARD_STATS_PATH)?;
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send_json(request).await
    }
}
