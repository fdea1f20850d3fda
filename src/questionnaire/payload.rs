use tracing::{debug, warn};

use super::answer::AnswerValue;
use super::question::{AnswerSpec, Question};
use super::sheet::AnswerSheet;
use crate::api::{AnswerPayload, SubmissionRecord};
use crate::error::{SubmitError, SubmitResult};

/// Derive the wire answer for one question, or `None` if unanswered
pub fn answer_payload(question: &Question, answer: &AnswerValue) -> Option<AnswerPayload> {
    match (&question.spec, answer) {
        (AnswerSpec::SingleSelect { .. } | AnswerSpec::FreeText, AnswerValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(AnswerPayload {
                value: Some(trimmed.to_string()),
                ..Default::default()
            })
        }
        (
            AnswerSpec::MultiSelect {
                options,
                allow_other,
            },
            AnswerValue::Multi {
                selected,
                other_text,
            },
        ) => {
            let other = other_text.trim();
            if selected.is_empty() && other.is_empty() {
                return None;
            }

            // Keep option order stable regardless of click order.
            let ordered: Vec<String> = options
                .iter()
                .filter(|o| selected.contains(*o))
                .cloned()
                .collect();

            let values = if !ordered.is_empty() || options.is_empty() {
                Some(ordered)
            } else {
                None
            };
            let subjective_value = (*allow_other).then(|| other.to_string());

            Some(AnswerPayload {
                value: None,
                values,
                subjective_value,
            })
        }
        (spec, _) => {
            warn!(
                question_id = %question.id,
                kind = spec.kind(),
                "Answer shape does not match question, skipping"
            );
            None
        }
    }
}

/// Build every non-empty submission record for the sheet.
///
/// Records come out in question order. Fails with [`SubmitError::Empty`]
/// when nothing is answered, before any network call.
pub fn build_submission(session_id: &str, sheet: &AnswerSheet) -> SubmitResult<Vec<SubmissionRecord>> {
    let records: Vec<SubmissionRecord> = sheet
        .questions()
        .iter()
        .filter_map(|question| {
            let answer = sheet.answer(&question.id)?;
            let payload = answer_payload(question, answer)?;
            if payload.is_empty() {
                return None;
            }
            Some(SubmissionRecord {
                session_id: session_id.to_string(),
                question_id: question.id.clone(),
                question: question.prompt.clone(),
                category: question.category.clone(),
                subcategory: question.subcategory.clone(),
                answer: payload,
            })
        })
        .collect();

    debug!(
        questions = sheet.questions().len(),
        answered = records.len(),
        "Built submission payload"
    );

    if records.is_empty() {
        return Err(SubmitError::Empty);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QuestionRecord;
    use crate::questionnaire::AnswerEdit;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(id: &str, options: Option<Vec<&str>>, multi: Option<Vec<&str>>) -> QuestionRecord {
        let owned = |v: Vec<&str>| -> Vec<String> { v.into_iter().map(str::to_string).collect() };
        QuestionRecord {
            id: id.to_string(),
            question: format!("Question {}", id),
            category: Some("Operations".to_string()),
            subcategory: Some("Process".to_string()),
            options: options.map(owned),
            multiple_choice_options: multi.map(owned),
        }
    }

    #[test]
    fn test_free_text_is_trimmed() {
        let mut sheet = AnswerSheet::from_records(vec![record("q1", None, None)]);
        sheet
            .edit("q1", AnswerEdit::SetText("hello ".to_string()))
            .unwrap();

        let records = build_submission("sess-1", &sheet).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].answer.value.as_deref(), Some("hello"));
    }

    #[test]
    fn test_multi_select_with_empty_other() {
        let mut sheet =
            AnswerSheet::from_records(vec![record("q1", None, Some(vec!["A", "B", "Other"]))]);
        sheet.edit("q1", AnswerEdit::Toggle("A".to_string())).unwrap();

        let records = build_submission("sess-1", &sheet).unwrap();
        assert_eq!(
            serde_json::to_value(&records[0].answer).unwrap(),
            json!({"values": ["A"], "subjective_value": ""})
        );
    }

    #[test]
    fn test_multi_select_only_other_text() {
        let mut sheet =
            AnswerSheet::from_records(vec![record("q1", None, Some(vec!["A", "Other"]))]);
        sheet
            .edit("q1", AnswerEdit::SetOther("  custom  ".to_string()))
            .unwrap();

        let records = build_submission("sess-1", &sheet).unwrap();
        assert_eq!(
            serde_json::to_value(&records[0].answer).unwrap(),
            json!({"subjective_value": "custom"})
        );
    }

    #[test]
    fn test_pure_other_emits_explicit_empty_selection() {
        let mut sheet = AnswerSheet::from_records(vec![record("q1", None, Some(vec!["Other"]))]);
        sheet
            .edit("q1", AnswerEdit::SetOther("we use spreadsheets".to_string()))
            .unwrap();

        let records = build_submission("sess-1", &sheet).unwrap();
        assert_eq!(
            serde_json::to_value(&records[0].answer).unwrap(),
            json!({"values": [], "subjective_value": "we use spreadsheets"})
        );
    }

    #[test]
    fn test_selection_order_follows_options() {
        let mut sheet =
            AnswerSheet::from_records(vec![record("q1", None, Some(vec!["A", "B", "C"]))]);
        sheet.edit("q1", AnswerEdit::Toggle("C".to_string())).unwrap();
        sheet.edit("q1", AnswerEdit::Toggle("A".to_string())).unwrap();

        let records = build_submission("sess-1", &sheet).unwrap();
        assert_eq!(
            records[0].answer.values,
            Some(vec!["A".to_string(), "C".to_string()])
        );
        assert!(records[0].answer.subjective_value.is_none());
    }

    #[test]
    fn test_unanswered_questions_dropped() {
        let mut sheet = AnswerSheet::from_records(vec![
            record("q1", Some(vec!["Yes", "No"]), None),
            record("q2", None, None),
            record("q3", None, Some(vec!["A", "Other"])),
        ]);
        sheet.edit("q1", AnswerEdit::Select("No".to_string())).unwrap();
        sheet
            .edit("q2", AnswerEdit::SetText("   ".to_string()))
            .unwrap();

        let records = build_submission("sess-1", &sheet).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            SubmissionRecord {
                session_id: "sess-1".to_string(),
                question_id: "q1".to_string(),
                question: "Question q1".to_string(),
                category: Some("Operations".to_string()),
                subcategory: Some("Process".to_string()),
                answer: AnswerPayload {
                    value: Some("No".to_string()),
                    ..Default::default()
                },
            }
        );
    }

    #[test]
    fn test_all_empty_is_validation_error() {
        let sheet = AnswerSheet::from_records(vec![
            record("q1", None, None),
            record("q2", None, Some(vec!["A"])),
        ]);
        let err = build_submission("sess-1", &sheet).unwrap_err();
        assert!(matches!(err, SubmitError::Empty));
    }

    #[test]
    fn test_mismatched_shape_skipped() {
        let question = Question::from(record("q1", None, Some(vec!["A"])));
        let payload = answer_payload(&question, &AnswerValue::Text("A".to_string()));
        assert!(payload.is_none());
    }
}
