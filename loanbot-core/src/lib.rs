//! Core of the loan advisor client: domain types, the intake state machine,
//! the decision-service client, the admin gate, and the local store.
//!
//! Nothing here touches the terminal; the `loanbot` binary drives these types
//! from its event loop.

pub mod auth;
pub mod client;
pub mod db;
pub mod error;
pub mod intake;
pub mod schema;
pub mod transcript;
pub mod types;

pub use client::{DecisionService, HttpDecisionService};
pub use error::{AuthError, ClientError, StoreError};
pub use intake::{IntakeSession, LoanData, SendOutcome};
pub use transcript::Transcript;
