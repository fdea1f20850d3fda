//! Unit tests for backend wire types.
//!
//! Covers status parsing, question record aliases, answer payload
//! serialization, and error body flattening.

use super::*;
use super::types::ErrorBody;
use pretty_assertions::assert_eq;
use serde_json::json;

// PipelineStatus tests
#[test]
fn test_pipeline_status_known_values() {
    let cases = [
        ("session_created", PipelineStatus::SessionCreated),
        ("started", PipelineStatus::Started),
        ("pipeline_running", PipelineStatus::PipelineRunning),
        ("generating_report", PipelineStatus::GeneratingReport),
        ("ready", PipelineStatus::Ready),
        ("error", PipelineStatus::Error),
        ("not_found", PipelineStatus::NotFound),
    ];
    for (raw, expected) in cases {
        let parsed: PipelineStatus = serde_json::from_value(json!(raw)).unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_str(), raw);
    }
}

#[test]
fn test_pipeline_status_unknown_preserved() {
    let parsed: PipelineStatus = serde_json::from_value(json!("warming_up")).unwrap();
    assert_eq!(parsed, PipelineStatus::Unknown("warming_up".to_string()));
    assert_eq!(parsed.to_string(), "warming_up");
}

#[test]
fn test_pipeline_status_case_insensitive() {
    let parsed = PipelineStatus::from("READY".to_string());
    assert_eq!(parsed, PipelineStatus::Ready);
}

#[test]
fn test_pipeline_status_serializes_as_string() {
    let value = serde_json::to_value(PipelineStatus::PipelineRunning).unwrap();
    assert_eq!(value, json!("pipeline_running"));
}

// StatusResponse tests
#[test]
fn test_status_response_minimal() {
    let resp: StatusResponse = serde_json::from_value(json!({"status": "started"})).unwrap();
    assert_eq!(resp.status, PipelineStatus::Started);
    assert!(resp.url.is_none());
    assert!(resp.error_message.is_none());
}

#[test]
fn test_status_response_ready_with_url() {
    let resp: StatusResponse = serde_json::from_value(json!({
        "status": "ready",
        "url": "https://reports.example.com/abc.pdf"
    }))
    .unwrap();
    assert_eq!(resp.status, PipelineStatus::Ready);
    assert_eq!(resp.url.as_deref(), Some("https://reports.example.com/abc.pdf"));
}

// QuestionRecord tests
#[test]
fn test_question_record_question_id_alias_and_numeric_id() {
    let record: QuestionRecord = serde_json::from_value(json!({
        "question_id": 42,
        "question": "How many employees?",
        "category": "Organization",
        "options": ["1-10", "11-50"]
    }))
    .unwrap();
    assert_eq!(record.id, "42");
    assert_eq!(record.category.as_deref(), Some("Organization"));
    assert!(record.subcategory.is_none());
    assert_eq!(record.options.unwrap().len(), 2);
    assert!(record.multiple_choice_options.is_none());
}

#[test]
fn test_question_record_rejects_object_id() {
    let result: Result<QuestionRecord, _> = serde_json::from_value(json!({
        "id": {"nested": true},
        "question": "?"
    }));
    assert!(result.is_err());
}

#[test]
fn test_question_list_null_is_none() {
    let list: Option<Vec<QuestionRecord>> = serde_json::from_value(json!(null)).unwrap();
    assert!(list.is_none());
}

// AnswerPayload tests
#[test]
fn test_answer_payload_empty_serializes_to_empty_object() {
    let payload = AnswerPayload::default();
    assert!(payload.is_empty());
    assert_eq!(serde_json::to_value(&payload).unwrap(), json!({}));
}

#[test]
fn test_answer_payload_multi_select_shape() {
    let payload = AnswerPayload {
        value: None,
        values: Some(vec!["A".to_string()]),
        subjective_value: Some(String::new()),
    };
    assert!(!payload.is_empty());
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({"values": ["A"], "subjective_value": ""})
    );
}

#[test]
fn test_submission_record_serialization() {
    let record = SubmissionRecord {
        session_id: "sess-1".to_string(),
        question_id: "q1".to_string(),
        question: "Describe your team".to_string(),
        category: Some("People".to_string()),
        subcategory: None,
        answer: AnswerPayload {
            value: Some("hello".to_string()),
            ..Default::default()
        },
    };
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({
            "session_id": "sess-1",
            "question_id": "q1",
            "question": "Describe your team",
            "category": "People",
            "subcategory": null,
            "answer": {"value": "hello"}
        })
    );
}

// ErrorBody tests
#[test]
fn test_error_body_string_detail() {
    let body: ErrorBody = serde_json::from_value(json!({"detail": "Session not found"})).unwrap();
    assert_eq!(body.message().as_deref(), Some("Session not found"));
}

#[test]
fn test_error_body_validation_list() {
    let body: ErrorBody = serde_json::from_value(json!({
        "detail": [
            {"loc": ["body", 0, "answer"], "msg": "field required"},
            {"loc": ["body", 1, "question_id"], "msg": "value is not a valid string"}
        ]
    }))
    .unwrap();
    assert_eq!(
        body.message().as_deref(),
        Some("field required; value is not a valid string")
    );
}

#[test]
fn test_error_body_null_detail() {
    let body: ErrorBody = serde_json::from_value(json!({"detail": null})).unwrap();
    assert!(body.message().is_none());
}

// Auth types
#[test]
fn test_token_response_default_type() {
    let token: TokenResponse = serde_json::from_value(json!({"access_token": "abc"})).unwrap();
    assert_eq!(token.access_token, "abc");
    assert_eq!(token.token_type, "bearer");
}
