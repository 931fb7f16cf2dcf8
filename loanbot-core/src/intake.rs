//! Conversational intake state machine.
//!
//! `IntakeSession` walks the user through the four questions in [`Step::QUESTIONS`]
//! order, validates each answer, and hands back a [`LoanApplication`] once the last
//! answer is in. It never performs I/O: the caller sends the application, waits
//! for the decision service, and feeds the outcome back through
//! [`IntakeSession::complete`]. This keeps every transition testable without a
//! terminal or a network.
//!
//! # Transitions
//!
//! | From                  | Input                 | To            | Appended                   |
//! |-----------------------|-----------------------|---------------|----------------------------|
//! | question step `S`     | invalid number        | `S`           | bot: validation error      |
//! | `Income/Emi/Amount`   | valid number          | `S.next()`    | user; bot question (paced) |
//! | `Tenure`              | valid number          | `Processing`  | user                       |
//! | `Processing`          | decision ok           | `Done`        | result                     |
//! | `Processing`          | decision err / cancel | `Income`      | bot: error                 |
//! | `Income` (after err)  | retry                 | `Processing`  | bot: retrying              |

use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::transcript::Transcript;
use crate::types::{LoanApplication, LoanResult, Step};

pub const GREETING: &str =
    "Hello! I'm your AI Loan Advisor. I'll help you check your loan eligibility. Let's get started!";
pub const INVALID_NUMBER: &str = "Please enter a valid number greater than 0.";
pub const RETRYING: &str = "Retrying your last application...";

/// Raw answers collected so far, keyed by step.
///
/// Each slot holds the parsed-and-stringified number (`" 50000 "` is stored as
/// `"50000"`), or an empty string when the step has not been answered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoanData {
    pub income: String,
    pub emi: String,
    pub amount: String,
    pub tenure: String,
}

impl LoanData {
    /// Returns the stored answer for a question step; bookkeeping steps yield `""`.
    pub fn get(&self, step: Step) -> &str {
        match step {
            Step::Income => &self.income,
            Step::Emi => &self.emi,
            Step::Amount => &self.amount,
            Step::Tenure => &self.tenure,
            Step::Processing | Step::Done => "",
        }
    }

    /// Stores `value` under `step`. Ignored for bookkeeping steps.
    pub fn set(&mut self, step: Step, value: String) {
        match step {
            Step::Income => self.income = value,
            Step::Emi => self.emi = value,
            Step::Amount => self.amount = value,
            Step::Tenure => self.tenure = value,
            Step::Processing | Step::Done => {}
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        Step::QUESTIONS.iter().all(|s| self.get(*s).is_empty())
    }

    /// Coerces the four answers into the numeric request body.
    ///
    /// Income, EMI, and amount are parsed as `f64`; tenure is truncated toward
    /// zero to whole months. Returns `None` if any slot is missing or not a number.
    pub fn to_application(&self) -> Option<LoanApplication> {
        let monthly_income = self.income.parse::<f64>().ok()?;
        let existing_emi = self.emi.parse::<f64>().ok()?;
        let loan_amount = self.amount.parse::<f64>().ok()?;
        let tenure_months = tenure_months(self.tenure.parse::<f64>().ok()?)?;
        Some(LoanApplication {
            monthly_income,
            existing_emi,
            loan_amount,
            tenure_months,
        })
    }
}

/// Parses one answer: a finite number strictly greater than zero.
///
/// Surrounding whitespace is ignored. Returns `None` for anything else,
/// including `NaN`, `inf`, `0`, and negative values.
pub fn parse_answer(input: &str) -> Option<f64> {
    let value = input.trim().parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Truncates a tenure answer to whole months, or `None` when it does not fit a `u32`.
pub fn tenure_months(value: f64) -> Option<u32> {
    let months = value.trunc();
    (months >= 0.0 && months <= f64::from(u32::MAX)).then_some(months as u32)
}

/// What the caller must do after [`IntakeSession::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Nothing happened: input was empty, or the session is not accepting input.
    Ignored,
    /// Validation failed and the user was re-prompted. Keep the input buffer.
    Rejected,
    /// The answer was recorded. Call [`IntakeSession::deliver_prompt`] after the
    /// pacing delay to show the question for `next`.
    Advanced { next: Step },
    /// The last answer was recorded and the session is now `Processing`.
    /// Send this application to the decision service.
    Submit(LoanApplication),
}

#[derive(Debug, Clone)]
pub struct IntakeSession {
    transcript: Transcript,
    answers: LoanData,
    step: Step,
    pending_prompt: Option<Step>,
    retry_snapshot: Option<LoanApplication>,
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeSession {
    /// Starts a conversation at `Income` with the greeting and first question.
    pub fn new() -> Self {
        let mut transcript = Transcript::new();
        transcript.push_bot(GREETING);
        if let Some(q) = Step::Income.question() {
            transcript.push_bot(q);
        }
        Self {
            transcript,
            answers: LoanData::default(),
            step: Step::Income,
            pending_prompt: None,
            retry_snapshot: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn answers(&self) -> &LoanData {
        &self.answers
    }

    pub fn pending_prompt(&self) -> Option<Step> {
        self.pending_prompt
    }

    /// False while processing, after completion, or while a question is pending.
    pub fn is_input_enabled(&self) -> bool {
        self.step.is_question() && self.pending_prompt.is_none()
    }

    /// True when a failed application can be resubmitted with [`Self::retry`].
    pub fn can_retry(&self) -> bool {
        self.step == Step::Income && self.answers.is_empty() && self.retry_snapshot.is_some()
    }

    /// Handles one submitted line of input at the current step.
    pub fn send(&mut self, input: &str) -> SendOutcome {
        if input.trim().is_empty() || !self.is_input_enabled() {
            return SendOutcome::Ignored;
        }

        let Some(value) = parse_answer(input)
            .filter(|v| self.step != Step::Tenure || tenure_months(*v).is_some())
        else {
            debug!(step = self.step.key(), "answer rejected");
            self.transcript.push_bot(INVALID_NUMBER);
            return SendOutcome::Rejected;
        };

        let current = self.step;
        self.transcript.push_user(input);
        self.answers.set(current, value.to_string());
        if current == Step::Income {
            // a fresh answer means the user restarted instead of retrying
            self.retry_snapshot = None;
        }

        let next = current.next();
        debug!(from = current.key(), to = next.key(), "answer recorded");
        self.step = next;

        if next == Step::Processing {
            return match self.answers.to_application() {
                Some(application) => {
                    info!(?application, "submitting loan application");
                    SendOutcome::Submit(application)
                }
                None => {
                    // Unreachable with validated answers; recover by restarting.
                    warn!(answers = ?self.answers, "incomplete answers at submission");
                    self.answers.clear();
                    self.step = Step::Income;
                    SendOutcome::Ignored
                }
            };
        }

        self.pending_prompt = Some(next);
        SendOutcome::Advanced { next }
    }

    /// Appends the pending question, if any. Returns whether a message was added.
    pub fn deliver_prompt(&mut self) -> bool {
        match self.pending_prompt.take().and_then(Step::question) {
            Some(q) => {
                self.transcript.push_bot(q);
                true
            }
            None => false,
        }
    }

    /// Applies the decision service outcome. Ignored unless `Processing`.
    ///
    /// Success appends a result card and ends the conversation. Failure appends
    /// an error message, keeps the failed application for [`Self::retry`],
    /// clears every answer, and returns to `Income`. Earlier messages are kept.
    pub fn complete(&mut self, outcome: Result<LoanResult, ClientError>) -> bool {
        if self.step != Step::Processing {
            return false;
        }
        match outcome {
            Ok(result) => {
                info!(status = result.status.label(), "decision received");
                self.transcript.push_result(result);
                self.step = Step::Done;
            }
            Err(err) => {
                warn!(error = %err, "loan application failed");
                self.transcript.push_bot(format!(
                    "Error processing application: {err}. Please try again."
                ));
                self.retry_snapshot = self.answers.to_application().or(self.retry_snapshot);
                self.answers.clear();
                self.step = Step::Income;
            }
        }
        true
    }

    /// Abandons the in-flight request; follows the failure path.
    pub fn cancel(&mut self) -> bool {
        self.complete(Err(ClientError::Cancelled))
    }

    /// Resubmits the application whose submission last failed.
    pub fn retry(&mut self) -> Option<LoanApplication> {
        if !self.can_retry() {
            return None;
        }
        let application = self.retry_snapshot?;
        self.transcript.push_bot(RETRYING);
        self.step = Step::Processing;
        info!(?application, "retrying loan application");
        Some(application)
    }
}
