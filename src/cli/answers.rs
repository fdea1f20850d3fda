//! Answers supplied on the command line as a JSON file.
//!
//! The file maps question ids to answers:
//!
//! ```json
//! {
//!   "q1": "free text or the chosen single-select option",
//!   "q2": ["A", "C"],
//!   "q3": { "selected": ["A"], "other": "something else" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, EditError};
use crate::questionnaire::{AnswerEdit, AnswerSheet, AnswerSpec, Question};

/// One answer from the file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileAnswer {
    Text(String),
    Choices(Vec<String>),
    Detailed {
        #[serde(default)]
        selected: Vec<String>,
        #[serde(default)]
        other: String,
    },
}

/// Answers keyed by question id
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AnswersFile {
    answers: BTreeMap<String, FileAnswer>,
}

impl AnswersFile {
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| AppError::Config {
            message: format!("Failed to read answers file {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&raw).map_err(|e| AppError::Config {
            message: format!("Invalid answers file {}: {}", path.display(), e),
        })
    }

    pub fn get(&self, question_id: &str) -> Option<&FileAnswer> {
        self.answers.get(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Edits answering `question`, or nothing if the file does not cover it
    pub fn edits_for(&self, question: &Question) -> Vec<AnswerEdit> {
        let Some(answer) = self.get(&question.id) else {
            return Vec::new();
        };

        match (answer, &question.spec) {
            (FileAnswer::Text(text), AnswerSpec::FreeText) => vec![AnswerEdit::SetText(text.clone())],
            (FileAnswer::Text(text), AnswerSpec::SingleSelect { .. }) => {
                vec![AnswerEdit::Select(text.clone())]
            }
            (FileAnswer::Text(text), AnswerSpec::MultiSelect { .. }) => {
                vec![AnswerEdit::SetSelected(vec![text.clone()])]
            }
            (FileAnswer::Choices(choices), _) => vec![AnswerEdit::SetSelected(choices.clone())],
            (FileAnswer::Detailed { selected, other }, _) => {
                let mut edits = vec![AnswerEdit::SetSelected(selected.clone())];
                if !other.is_empty() {
                    edits.push(AnswerEdit::SetOther(other.clone()));
                }
                edits
            }
        }
    }

    /// Fill a sheet from the file, returning every edit that was rejected
    pub fn apply(&self, sheet: &mut AnswerSheet) -> Vec<EditError> {
        let planned: Vec<(String, AnswerEdit)> = sheet
            .questions()
            .iter()
            .flat_map(|q| {
                self.edits_for(q)
                    .into_iter()
                    .map(move |edit| (q.id.clone(), edit))
            })
            .collect();

        planned
            .into_iter()
            .filter_map(|(id, edit)| sheet.edit(&id, edit).err())
            .collect()
    }
}
