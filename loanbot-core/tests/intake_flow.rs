//! Integration tests for the intake state machine.
//!
//! Exercises: seeded greeting, validation, step advance with paced prompts,
//! submission, success/failure completion, retry, and the input guard.

use loanbot_core::intake::{parse_answer, tenure_months, GREETING, INVALID_NUMBER, RETRYING};
use loanbot_core::types::{LoanApplication, LoanResult, LoanStatus, MessageKind, Step};
use loanbot_core::{ClientError, IntakeSession, LoanData, SendOutcome};

/// Answers one question and delivers the follow-up prompt, as the UI does after
/// its pacing delay.
fn answer(session: &mut IntakeSession, input: &str) -> SendOutcome {
    let outcome = session.send(input);
    if matches!(outcome, SendOutcome::Advanced { .. }) {
        assert!(session.deliver_prompt());
    }
    outcome
}

fn session_at_processing() -> (IntakeSession, LoanApplication) {
    let mut session = IntakeSession::new();
    answer(&mut session, "50000");
    answer(&mut session, "5000");
    answer(&mut session, "200000");
    match session.send("24") {
        SendOutcome::Submit(app) => (session, app),
        other => panic!("expected Submit, got {other:?}"),
    }
}

fn approved() -> LoanResult {
    LoanResult {
        status: LoanStatus::Approved,
        title: "Approved".into(),
        message: "You are eligible.".into(),
        advice: Some("Keep your EMI ratio below 40%.".into()),
    }
}

#[test]
fn new_session_seeds_greeting_and_first_question() {
    let session = IntakeSession::new();
    assert_eq!(session.step(), Step::Income);
    let contents: Vec<_> = session.transcript().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, [GREETING, Step::Income.question().unwrap()]);
    assert!(session.transcript().iter().all(|m| m.kind == MessageKind::Bot));
    assert!(session.answers().is_empty());
}

#[test]
fn invalid_inputs_never_advance_or_record() {
    for bad in ["abc", "0", "-5", "NaN", "inf", "-inf", "12abc", "1,000"] {
        let mut session = IntakeSession::new();
        answer(&mut session, "50000");
        let before_len = session.transcript().len();
        let before_answers = session.answers().clone();

        assert_eq!(session.send(bad), SendOutcome::Rejected, "input {bad:?}");
        assert_eq!(session.step(), Step::Emi);
        assert_eq!(session.answers(), &before_answers);
        assert_eq!(session.transcript().len(), before_len + 1);
        let last = session.transcript().last().unwrap();
        assert_eq!(last.kind, MessageKind::Bot);
        assert_eq!(last.content, INVALID_NUMBER);
    }
}

#[test]
fn blank_input_is_ignored_without_a_message() {
    let mut session = IntakeSession::new();
    let before = session.transcript().len();
    assert_eq!(session.send("   "), SendOutcome::Ignored);
    assert_eq!(session.transcript().len(), before);
}

#[test]
fn valid_answer_appends_user_message_then_paced_question() {
    let mut session = IntakeSession::new();
    assert_eq!(session.send(" 50000 "), SendOutcome::Advanced { next: Step::Emi });
    assert_eq!(session.step(), Step::Emi);
    assert_eq!(session.answers().income, "50000");

    let last = session.transcript().last().unwrap();
    assert_eq!(last.kind, MessageKind::User);
    assert_eq!(last.content, " 50000 ");

    // Input stays locked until the question is shown.
    assert!(!session.is_input_enabled());
    assert_eq!(session.send("5000"), SendOutcome::Ignored);

    assert!(session.deliver_prompt());
    assert_eq!(
        session.transcript().last().unwrap().content,
        Step::Emi.question().unwrap()
    );
    assert!(!session.deliver_prompt());
    assert!(session.is_input_enabled());
}

#[test]
fn four_answers_build_the_application_and_enter_processing() {
    let (session, app) = session_at_processing();

    assert_eq!(session.step(), Step::Processing);
    assert_eq!(
        session.answers(),
        &LoanData {
            income: "50000".into(),
            emi: "5000".into(),
            amount: "200000".into(),
            tenure: "24".into(),
        }
    );
    assert_eq!(
        app,
        LoanApplication {
            monthly_income: 50000.0,
            existing_emi: 5000.0,
            loan_amount: 200000.0,
            tenure_months: 24,
        }
    );
    let json = serde_json::to_value(app).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "monthly_income": 50000.0,
            "existing_emi": 5000.0,
            "loan_amount": 200000.0,
            "tenure_months": 24
        })
    );
}

#[test]
fn sends_are_no_ops_while_processing_and_after_done() {
    let (mut session, _) = session_at_processing();
    let len = session.transcript().len();
    for input in ["100", "abc", "", "-1"] {
        assert_eq!(session.send(input), SendOutcome::Ignored);
    }
    assert_eq!(session.transcript().len(), len);

    assert!(session.complete(Ok(approved())));
    let len = session.transcript().len();
    for input in ["100", "abc"] {
        assert_eq!(session.send(input), SendOutcome::Ignored);
    }
    assert_eq!(session.transcript().len(), len);
    assert_eq!(session.step(), Step::Done);
}

#[test]
fn success_appends_one_result_message_and_finishes() {
    let (mut session, _) = session_at_processing();
    let len = session.transcript().len();

    assert!(session.complete(Ok(approved())));

    assert_eq!(session.transcript().len(), len + 1);
    let last = session.transcript().last().unwrap();
    assert_eq!(last.kind, MessageKind::Result);
    assert!(last.content.is_empty());
    assert_eq!(last.result.as_ref(), Some(&approved()));
    assert_eq!(session.step(), Step::Done);
    assert!(!session.is_input_enabled());
}

#[test]
fn failure_resets_answers_but_keeps_the_transcript() {
    let (mut session, _) = session_at_processing();
    let before: Vec<_> = session.transcript().iter().cloned().collect();

    let err = ClientError::Status { status: 500, body: "boom".into() };
    assert!(session.complete(Err(err)));

    assert_eq!(session.step(), Step::Income);
    assert_eq!(session.answers(), &LoanData::default());
    assert_eq!(session.transcript().len(), before.len() + 1);
    assert_eq!(&session.transcript().as_slice()[..before.len()], before.as_slice());

    let last = session.transcript().last().unwrap();
    assert_eq!(last.kind, MessageKind::Bot);
    assert_eq!(
        last.content,
        "Error processing application: Server error (500): boom. Please try again."
    );
    assert!(session.is_input_enabled());
}

#[test]
fn complete_outside_processing_is_ignored() {
    let mut session = IntakeSession::new();
    let len = session.transcript().len();
    assert!(!session.complete(Ok(approved())));
    assert!(!session.cancel());
    assert_eq!(session.transcript().len(), len);
    assert_eq!(session.step(), Step::Income);
}

#[test]
fn retry_resubmits_the_failed_application() {
    let (mut session, app) = session_at_processing();
    session.complete(Err(ClientError::Timeout(30)));
    assert!(session.can_retry());

    let retried = session.retry().expect("retry available");
    assert_eq!(retried, app);
    assert_eq!(session.step(), Step::Processing);
    assert_eq!(session.transcript().last().unwrap().content, RETRYING);

    // A second failure keeps the snapshot available.
    session.cancel();
    assert_eq!(session.retry(), Some(app));
}

#[test]
fn new_income_answer_discards_the_retry_snapshot() {
    let (mut session, _) = session_at_processing();
    session.complete(Err(ClientError::Transport("refused".into())));

    answer(&mut session, "60000");
    assert!(!session.can_retry());
    assert_eq!(session.retry(), None);
    assert_eq!(session.step(), Step::Emi);
}

#[test]
fn message_ids_are_monotonic() {
    let (session, _) = session_at_processing();
    let ids: Vec<u64> = session.transcript().iter().map(|m| m.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn parse_answer_accepts_positive_finite_numbers_only() {
    assert_eq!(parse_answer("42"), Some(42.0));
    assert_eq!(parse_answer(" 0.5 "), Some(0.5));
    assert_eq!(parse_answer("1e3"), Some(1000.0));
    assert_eq!(parse_answer("0"), None);
    assert_eq!(parse_answer("-0.1"), None);
    assert_eq!(parse_answer("infinity"), None);
    assert_eq!(parse_answer(""), None);
}

#[test]
fn tenure_is_truncated_to_whole_months() {
    let data = LoanData {
        income: "50000.5".into(),
        emi: "0.25".into(),
        amount: "1000".into(),
        tenure: "24.9".into(),
    };
    let app = data.to_application().unwrap();
    assert_eq!(app.tenure_months, 24);
    assert_eq!(app.monthly_income, 50000.5);
}

#[test]
fn tenure_beyond_u32_months_is_rejected_at_the_tenure_step() {
    let mut session = IntakeSession::new();
    answer(&mut session, "50000");
    answer(&mut session, "5000");
    answer(&mut session, "200000");
    let answers_before = session.answers().clone();

    for input in ["1e10", "5000000000"] {
        let len_before = session.transcript().len();
        assert_eq!(session.send(input), SendOutcome::Rejected);
        assert_eq!(session.step(), Step::Tenure);
        assert_eq!(session.answers(), &answers_before);
        assert_eq!(session.transcript().len(), len_before + 1);
        assert_eq!(session.transcript().last().unwrap().content, INVALID_NUMBER);
    }

    // Largest whole month count still goes through.
    match session.send("4294967295.7") {
        SendOutcome::Submit(app) => assert_eq!(app.tenure_months, u32::MAX),
        other => panic!("expected Submit, got {other:?}"),
    }
}

#[test]
fn sub_month_tenure_truncates_to_zero() {
    assert_eq!(tenure_months(0.5), Some(0));
    assert_eq!(tenure_months(4_294_967_296.0), None);
}
