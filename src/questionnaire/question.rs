use serde::{Deserialize, Serialize};

use super::answer::AnswerValue;
use crate::api::QuestionRecord;

/// How a question expects to be answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerSpec {
    /// Exactly one of `options`
    SingleSelect { options: Vec<String> },
    /// Any subset of `options`, plus free text when `allow_other`
    MultiSelect {
        options: Vec<String>,
        allow_other: bool,
    },
    /// Free text only
    FreeText,
}

impl AnswerSpec {
    /// The untouched answer for this variant
    pub fn empty_answer(&self) -> AnswerValue {
        match self {
            AnswerSpec::SingleSelect { .. } | AnswerSpec::FreeText => AnswerValue::Text(String::new()),
            AnswerSpec::MultiSelect { .. } => AnswerValue::Multi {
                selected: Vec::new(),
                other_text: String::new(),
            },
        }
    }

    /// Whether `answer` has the shape this variant expects
    pub fn accepts(&self, answer: &AnswerValue) -> bool {
        matches!(
            (self, answer),
            (
                AnswerSpec::SingleSelect { .. } | AnswerSpec::FreeText,
                AnswerValue::Text(_)
            ) | (AnswerSpec::MultiSelect { .. }, AnswerValue::Multi { .. })
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnswerSpec::SingleSelect { .. } => "single_select",
            AnswerSpec::MultiSelect { .. } => "multi_select",
            AnswerSpec::FreeText => "free_text",
        }
    }
}

/// A question normalized from its wire record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub spec: AnswerSpec,
}

impl Question {
    /// Options the user may pick from, empty for free text
    pub fn options(&self) -> &[String] {
        match &self.spec {
            AnswerSpec::SingleSelect { options } | AnswerSpec::MultiSelect { options, .. } => {
                options
            }
            AnswerSpec::FreeText => &[],
        }
    }

    pub fn offers(&self, option: &str) -> bool {
        self.options().iter().any(|o| o == option)
    }
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        let spec = classify(record.options, record.multiple_choice_options);
        Self {
            id: record.id,
            prompt: record.question,
            category: record.category,
            subcategory: record.subcategory,
            spec,
        }
    }
}

/// Pick the variant from whichever option array is non-empty.
///
/// Multi-select wins over single-select. An "Other" entry in the multi-select
/// list becomes the free-text sibling rather than a selectable option.
fn classify(options: Option<Vec<String>>, multi: Option<Vec<String>>) -> AnswerSpec {
    let multi = clean_options(multi.unwrap_or_default());
    if !multi.is_empty() {
        let allow_other = multi.iter().any(|o| is_other_option(o));
        let options = multi.into_iter().filter(|o| !is_other_option(o)).collect();
        return AnswerSpec::MultiSelect {
            options,
            allow_other,
        };
    }

    let options = clean_options(options.unwrap_or_default());
    if !options.is_empty() {
        return AnswerSpec::SingleSelect { options };
    }

    AnswerSpec::FreeText
}

fn clean_options(raw: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(raw.len());
    for option in raw {
        let trimmed = option.trim();
        if trimmed.is_empty() || seen.iter().any(|s: &String| s == trimmed) {
            continue;
        }
        seen.push(trimmed.to_string());
    }
    seen
}

fn is_other_option(option: &str) -> bool {
    let lower = option.trim().to_lowercase();
    lower == "other" || lower.starts_with("other (") || lower.starts_with("other:")
}
