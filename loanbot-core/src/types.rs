use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position in the fixed intake sequence.
///
/// The four question steps are followed by two bookkeeping states:
/// `Processing` while the application is in flight and `Done` once a decision
/// has been rendered. `Step::next()` walks the sequence forward.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    #[default]
    Income,
    Emi,
    Amount,
    Tenure,
    Processing,
    Done,
}

impl Step {
    /// The four steps that collect an answer, in the order they are asked.
    pub const QUESTIONS: [Step; 4] = [Step::Income, Step::Emi, Step::Amount, Step::Tenure];

    /// Returns the successor of `self` in the fixed order. `Done` is its own successor.
    pub fn next(self) -> Self {
        match self {
            Step::Income => Step::Emi,
            Step::Emi => Step::Amount,
            Step::Amount => Step::Tenure,
            Step::Tenure => Step::Processing,
            Step::Processing | Step::Done => Step::Done,
        }
    }

    /// Question text shown to the user, or `None` for the bookkeeping states.
    pub fn question(self) -> Option<&'static str> {
        match self {
            Step::Income => Some("What is your monthly income? (in rupees)"),
            Step::Emi => Some("What is your existing EMI? (in rupees)"),
            Step::Amount => Some("How much loan amount do you need? (in rupees)"),
            Step::Tenure => Some("What tenure are you looking for? (in months)"),
            Step::Processing | Step::Done => None,
        }
    }

    /// Accumulator key for the step (`income`, `emi`, `amount`, `tenure`).
    pub fn key(self) -> &'static str {
        match self {
            Step::Income => "income",
            Step::Emi => "emi",
            Step::Amount => "amount",
            Step::Tenure => "tenure",
            Step::Processing => "processing",
            Step::Done => "done",
        }
    }

    /// True for the four steps that accept an answer.
    pub fn is_question(self) -> bool {
        self.question().is_some()
    }
}

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Bot,
    /// A rendered loan decision. `content` is empty; the payload is in `result`.
    Result,
}

/// One transcript entry. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: u64, // monotonic within one transcript
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub result: Option<LoanResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Approved,
    Rejected,
    Conditional,
}

impl LoanStatus {
    pub fn label(self) -> &'static str {
        match self {
            LoanStatus::Approved => "Approved",
            LoanStatus::Rejected => "Rejected",
            LoanStatus::Conditional => "Conditional",
        }
    }
}

/// Decision returned by `POST /chat/apply-loan`.
///
/// The wire field `personalized_improvement_advice` is surfaced as `advice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub status: LoanStatus,
    pub title: String,
    pub message: String,
    #[serde(
        rename = "personalized_improvement_advice",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub advice: Option<String>,
}

/// Request body for `POST /chat/apply-loan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub monthly_income: f64,
    pub existing_emi: f64,
    pub loan_amount: f64,
    pub tenure_months: u32,
}

/// Decision counters from `GET /api/dashboard/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total: u64,
    pub approved: u64,
    pub rejected: u64,
    pub conditional: u64,
}

/// One recent eligibility decision as reported by the stats endpoint.
///
/// The server reads these fields out of a free-form event snapshot, so any of
/// them may come back as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEvent {
    pub timestamp: String,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub risk_probability: Option<f64>, // 0..1
    #[serde(default)]
    pub eligibility_score: Option<f64>,
}

/// One row of the risk-profile chart.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskProfile {
    pub label: String,
    pub risk_percent: f64, // one decimal place
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub summary: StatsSummary,
    #[serde(default)]
    pub recent_events: Vec<RecentEvent>,
}

impl DashboardStats {
    /// Number of rows the risk-profile chart shows by default.
    pub const RISK_PROFILE_LIMIT: usize = 20;

    /// Decision counts in display order: Approved, Rejected, Conditional.
    pub fn decision_distribution(&self) -> [(LoanStatus, u64); 3] {
        [
            (LoanStatus::Approved, self.summary.approved),
            (LoanStatus::Rejected, self.summary.rejected),
            (LoanStatus::Conditional, self.summary.conditional),
        ]
    }

    /// Builds at most `limit` chart rows from `recent_events`, labelled `App 1..n`.
    ///
    /// Missing risk or score values are charted as zero.
    pub fn risk_profiles(&self, limit: usize) -> Vec<RiskProfile> {
        self.recent_events
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, e)| RiskProfile {
                label: format!("App {}", i + 1),
                risk_percent: (e.risk_probability.unwrap_or(0.0) * 1000.0).round() / 10.0,
                score: e.eligibility_score.unwrap_or(0.0),
            })
            .collect()
    }
}

/// Opaque admin session token kept in the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminToken {
    pub token: String,   // UUID v4 text
    pub issued_at: i64,  // Unix timestamp seconds
    pub expires_at: i64, // Unix timestamp seconds
}

impl AdminToken {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}
