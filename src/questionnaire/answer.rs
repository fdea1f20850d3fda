use serde::{Deserialize, Serialize};

use super::question::{AnswerSpec, Question};
use crate::error::EditError;

/// Local, editable answer for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Single-select choice or free text
    Text(String),
    /// Multi-select choices and the "other" free text
    Multi {
        selected: Vec<String>,
        other_text: String,
    },
}

impl AnswerValue {
    /// True while the user has not entered anything
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Multi {
                selected,
                other_text,
            } => selected.is_empty() && other_text.trim().is_empty(),
        }
    }
}

/// A single user interaction with an answer field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerEdit {
    /// Replace the free text of a free-text question
    SetText(String),
    /// Choose the option of a single-select question; empty clears it
    Select(String),
    /// Flip one option of a multi-select question
    Toggle(String),
    /// Replace the whole selection of a multi-select question
    SetSelected(Vec<String>),
    /// Replace the "other" text of a multi-select question
    SetOther(String),
}

impl AnswerEdit {
    /// Apply this edit to `answer`, validating it against `question`
    pub fn apply(self, question: &Question, answer: &mut AnswerValue) -> Result<(), EditError> {
        let wrong_variant = |reason: &str| EditError::WrongVariant {
            question_id: question.id.clone(),
            reason: reason.to_string(),
        };
        let check_option = |option: &str| {
            if question.offers(option) {
                Ok(())
            } else {
                Err(EditError::InvalidOption {
                    question_id: question.id.clone(),
                    option: option.to_string(),
                })
            }
        };

        match (self, &question.spec, answer) {
            (AnswerEdit::SetText(text), AnswerSpec::FreeText, AnswerValue::Text(current)) => {
                *current = text;
                Ok(())
            }
            (AnswerEdit::Select(option), AnswerSpec::SingleSelect { .. }, AnswerValue::Text(current)) => {
                if !option.is_empty() {
                    check_option(&option)?;
                }
                *current = option;
                Ok(())
            }
            (
                AnswerEdit::Toggle(option),
                AnswerSpec::MultiSelect { .. },
                AnswerValue::Multi { selected, .. },
            ) => {
                check_option(&option)?;
                match selected.iter().position(|s| *s == option) {
                    Some(idx) => {
                        selected.remove(idx);
                    }
                    None => selected.push(option),
                }
                Ok(())
            }
            (
                AnswerEdit::SetSelected(options),
                AnswerSpec::MultiSelect { .. },
                AnswerValue::Multi { selected, .. },
            ) => {
                for option in &options {
                    check_option(option)?;
                }
                let mut deduped: Vec<String> = Vec::with_capacity(options.len());
                for option in options {
                    if !deduped.contains(&option) {
                        deduped.push(option);
                    }
                }
                *selected = deduped;
                Ok(())
            }
            (
                AnswerEdit::SetOther(text),
                AnswerSpec::MultiSelect { allow_other, .. },
                AnswerValue::Multi { other_text, .. },
            ) => {
                if !allow_other {
                    return Err(wrong_variant("question has no 'other' field"));
                }
                *other_text = text;
                Ok(())
            }
            (edit, spec, _) => Err(wrong_variant(&format!(
                "{} edit on a {} question",
                edit.kind(),
                spec.kind()
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AnswerEdit::SetText(_) => "set_text",
            AnswerEdit::Select(_) => "select",
            AnswerEdit::Toggle(_) => "toggle",
            AnswerEdit::SetSelected(_) => "set_selected",
            AnswerEdit::SetOther(_) => "set_other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(spec: AnswerSpec) -> Question {
        Question {
            id: "q1".to_string(),
            prompt: "Prompt".to_string(),
            category: None,
            subcategory: None,
            spec,
        }
    }

    fn multi(allow_other: bool) -> Question {
        question(AnswerSpec::MultiSelect {
            options: vec!["A".to_string(), "B".to_string()],
            allow_other,
        })
    }

    #[test]
    fn test_set_text_on_free_text() {
        let q = question(AnswerSpec::FreeText);
        let mut answer = q.spec.empty_answer();
        AnswerEdit::SetText("hello ".to_string())
            .apply(&q, &mut answer)
            .unwrap();
        assert_eq!(answer, AnswerValue::Text("hello ".to_string()));
        assert!(!answer.is_blank());
    }

    #[test]
    fn test_select_validates_option() {
        let q = question(AnswerSpec::SingleSelect {
            options: vec!["Yes".to_string(), "No".to_string()],
        });
        let mut answer = q.spec.empty_answer();

        AnswerEdit::Select("Yes".to_string())
            .apply(&q, &mut answer)
            .unwrap();
        assert_eq!(answer, AnswerValue::Text("Yes".to_string()));

        let err = AnswerEdit::Select("Maybe".to_string())
            .apply(&q, &mut answer)
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidOption { .. }));
        assert_eq!(answer, AnswerValue::Text("Yes".to_string()));

        AnswerEdit::Select(String::new())
            .apply(&q, &mut answer)
            .unwrap();
        assert!(answer.is_blank());
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let q = multi(false);
        let mut answer = q.spec.empty_answer();

        AnswerEdit::Toggle("A".to_string()).apply(&q, &mut answer).unwrap();
        AnswerEdit::Toggle("B".to_string()).apply(&q, &mut answer).unwrap();
        AnswerEdit::Toggle("A".to_string()).apply(&q, &mut answer).unwrap();

        assert_eq!(
            answer,
            AnswerValue::Multi {
                selected: vec!["B".to_string()],
                other_text: String::new(),
            }
        );
    }

    #[test]
    fn test_set_selected_deduplicates() {
        let q = multi(false);
        let mut answer = q.spec.empty_answer();
        AnswerEdit::SetSelected(vec!["B".to_string(), "A".to_string(), "B".to_string()])
            .apply(&q, &mut answer)
            .unwrap();
        assert_eq!(
            answer,
            AnswerValue::Multi {
                selected: vec!["B".to_string(), "A".to_string()],
                other_text: String::new(),
            }
        );
    }

    #[test]
    fn test_set_other_requires_allow_other() {
        let q = multi(false);
        let mut answer = q.spec.empty_answer();
        let err = AnswerEdit::SetOther("custom".to_string())
            .apply(&q, &mut answer)
            .unwrap_err();
        assert!(matches!(err, EditError::WrongVariant { .. }));

        let q = multi(true);
        AnswerEdit::SetOther("custom".to_string())
            .apply(&q, &mut answer)
            .unwrap();
        assert!(!answer.is_blank());
    }

    #[test]
    fn test_wrong_variant_rejected() {
        let q = question(AnswerSpec::FreeText);
        let mut answer = q.spec.empty_answer();
        let err = AnswerEdit::Toggle("A".to_string())
            .apply(&q, &mut answer)
            .unwrap_err();
        assert_eq!(
            err,
            EditError::WrongVariant {
                question_id: "q1".to_string(),
                reason: "toggle edit on a free_text question".to_string(),
            }
        );
    }
}
