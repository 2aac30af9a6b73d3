//! End-to-end pipeline tests for tabchat.
//!
//! These run the full load -> profile -> synthesize -> execute -> render
//! pipeline against the mock LLM client, so no Ollama instance is needed.
//!
//! Run with: `cargo test --test integration_tests`

use std::io::Write as _;
use std::sync::Arc;

use tempfile::NamedTempFile;

use tabchat::frame::load::load_table;
use tabchat::frame::{Dtype, Frame, Value};
use tabchat::llm::{MockLlmClient, SamplingOptions};
use tabchat::profile::build_profile;
use tabchat::render::render_result;
use tabchat::session::{Outcome, Session, Stage};

/// Writes a small billing CSV and loads it as a frame.
fn billing_frame() -> (NamedTempFile, Frame) {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    writeln!(file, "Department,Doctor,Net Amount").unwrap();
    writeln!(file, "Surgery,Patel,100").unwrap();
    writeln!(file, "Surgery,Okafor,200").unwrap();
    writeln!(file, "ENT,Patel,50").unwrap();
    file.flush().unwrap();

    let frame = load_table(file.path()).unwrap();
    (file, frame)
}

fn session_over(frame: Frame, client: MockLlmClient) -> Session {
    Session::new(
        Some(Arc::new(frame)),
        Box::new(client),
        SamplingOptions::default(),
    )
}

#[tokio::test]
async fn test_csv_to_grouped_answer() {
    let (_file, frame) = billing_frame();
    assert_eq!(frame.n_rows(), 3);
    assert_eq!(
        frame.column_names(),
        vec!["Department", "Doctor", "Net Amount"]
    );
    assert_eq!(frame.column("Net Amount").unwrap().dtype, Dtype::Int);

    let session = session_over(frame, MockLlmClient::new());
    let outcome = session
        .ask("What's the total Net Amount by Department?")
        .await;

    let Outcome::Answer { result, program } = outcome else {
        panic!("expected an answer");
    };
    assert!(program.contains("groupby"));
    assert_eq!(result.rows, 2);
    assert_eq!(
        result.table.row(0),
        vec![&Value::from("Surgery"), &Value::Int(300)]
    );
    assert_eq!(
        result.table.row(1),
        vec![&Value::from("ENT"), &Value::Int(50)]
    );
}

#[tokio::test]
async fn test_rendered_answer_reports_row_count() {
    let (_file, frame) = billing_frame();
    let session = session_over(frame, MockLlmClient::new());

    let outcome = session.ask("Show me the first rows").await;
    let Outcome::Answer { result, .. } = outcome else {
        panic!("expected an answer");
    };

    let rendered = render_result(&result);
    assert!(rendered.contains("Department"));
    assert!(rendered.contains("Surgery"));
    assert!(rendered.contains("Found 3 rows"));
}

#[tokio::test]
async fn test_fenced_and_quoted_reply_still_executes() {
    let (_file, frame) = billing_frame();
    let client = MockLlmClient::new().with_response(
        "doctor",
        "\"```python\nresult = df.groupby(\"Doctor\").count()\n```\"",
    );
    let session = session_over(frame, client);

    let outcome = session.ask("How many rows per doctor?").await;
    let Outcome::Answer { result, program } = outcome else {
        panic!("expected an answer");
    };
    assert!(!program.contains("```"));
    assert_eq!(result.rows, 2);
    assert_eq!(
        result.table.row(0),
        vec![&Value::from("Patel"), &Value::Int(2)]
    );
}

#[tokio::test]
async fn test_failed_question_leaves_session_usable() {
    let (_file, frame) = billing_frame();
    let client = MockLlmClient::new()
        .with_response("broken", "result = df.sort(\"No Such Column\")");
    let session = session_over(frame, client);

    let Outcome::Failure { stage, reason } = session.ask("broken question").await else {
        panic!("expected a failure");
    };
    assert_eq!(stage, Stage::Execution);
    assert!(reason.contains("unknown column"));

    // The same session answers the next question normally.
    let next = session.ask("total Net Amount by Department").await;
    assert!(matches!(next, Outcome::Answer { .. }));
}

#[tokio::test]
async fn test_dataset_is_unchanged_after_questions() {
    let (_file, frame) = billing_frame();
    let before = frame.clone();
    let profile_before = build_profile(Some(&frame));

    let dataset = Arc::new(frame);
    let session = Session::new(
        Some(Arc::clone(&dataset)),
        Box::new(MockLlmClient::new()),
        SamplingOptions::default(),
    );

    session.ask("total Net Amount by Department").await;
    session.ask("Show me the first 2 rows").await;

    assert_eq!(*dataset, before);
    assert_eq!(build_profile(Some(&dataset)), profile_before);
}

#[tokio::test]
async fn test_missing_file_is_a_load_error() {
    let err = load_table(std::path::Path::new("/nonexistent/billing.csv")).unwrap_err();
    assert!(err.to_string().contains("File not found"));
}

#[tokio::test]
async fn test_unreachable_model_reported_with_hint() {
    let (_file, frame) = billing_frame();
    let session = session_over(
        frame,
        MockLlmClient::failing("Failed to connect to Ollama. Is it running? Try: ollama serve"),
    );

    let Outcome::Failure { stage, reason } = session.ask("anything").await else {
        panic!("expected a failure");
    };
    assert_eq!(stage, Stage::Synthesis);
    assert!(reason.contains("ollama serve"));
}
