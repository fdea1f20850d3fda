use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::answer::{AnswerEdit, AnswerValue};
use super::question::Question;
use crate::api::QuestionRecord;
use crate::error::EditError;

/// What a merge did to the sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The question list was swapped for the incoming one
    pub replaced: bool,
    /// Answer entries created for unseen questions or reset after a variant change
    pub initialized: usize,
}

/// Questions currently shown plus the user's in-progress answers.
///
/// Answers are keyed by question id. An entry is created the first time its
/// question arrives and is only ever changed by user edits or [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    questions: Vec<Question>,
    answers: HashMap<String, AnswerValue>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sheet from an initial question list
    pub fn from_records(records: Vec<QuestionRecord>) -> Self {
        let mut sheet = Self::new();
        sheet.merge(Some(records));
        sheet
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &HashMap<String, AnswerValue> {
        &self.answers
    }

    pub fn answer(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Reconcile a freshly fetched question list into the sheet.
    ///
    /// `None` is treated as an empty list. The question list is replaced only
    /// when the set of ids differs from the current one, ignoring order.
    /// Answers already present are never touched unless their shape no longer
    /// fits the question's variant, which happens when an id comes back as a
    /// different kind of question.
    pub fn merge(&mut self, records: Option<Vec<QuestionRecord>>) -> MergeOutcome {
        let mut seen = HashSet::new();
        let incoming: Vec<Question> = records
            .unwrap_or_default()
            .into_iter()
            .map(Question::from)
            .filter(|q| seen.insert(q.id.clone()))
            .collect();

        let current: HashSet<&str> = self.questions.iter().map(|q| q.id.as_str()).collect();
        let fresh: HashSet<&str> = incoming.iter().map(|q| q.id.as_str()).collect();
        let replaced = current != fresh;

        if replaced {
            debug!(
                previous = self.questions.len(),
                incoming = incoming.len(),
                "Question set changed, replacing list"
            );
            self.questions = incoming;
        }

        let mut initialized = 0;
        for question in &self.questions {
            let fits = self
                .answers
                .get(&question.id)
                .is_some_and(|answer| question.spec.accepts(answer));
            if !fits {
                if self.answers.contains_key(&question.id) {
                    debug!(
                        question_id = %question.id,
                        kind = question.spec.kind(),
                        "Answer shape changed, reinitializing"
                    );
                }
                self.answers
                    .insert(question.id.clone(), question.spec.empty_answer());
                initialized += 1;
            }
        }

        MergeOutcome {
            replaced,
            initialized,
        }
    }

    /// Apply a user edit to one answer
    pub fn edit(&mut self, question_id: &str, edit: AnswerEdit) -> Result<(), EditError> {
        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| EditError::UnknownQuestion {
                question_id: question_id.to_string(),
            })?;
        let answer = self
            .answers
            .entry(question.id.clone())
            .or_insert_with(|| question.spec.empty_answer());
        if !question.spec.accepts(answer) {
            *answer = question.spec.empty_answer();
        }
        edit.apply(question, answer)
    }

    /// Drop all questions and answers
    pub fn clear(&mut self) {
        self.questions.clear();
        self.answers.clear();
    }
}
