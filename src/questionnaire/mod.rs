//! Question and answer model shared by the survey and follow-up pages.
//!
//! - [`Question`] / [`AnswerSpec`]: normalized question with exactly one answer variant
//! - [`AnswerSheet`]: reconciles fetched questions with in-progress answers
//! - [`build_submission`]: projects a sheet into filtered submission records

mod answer;
mod payload;
mod question;
mod sheet;

pub use answer::{AnswerEdit, AnswerValue};
pub use payload::{answer_payload, build_submission};
pub use question::{AnswerSpec, Question};
pub use sheet::{AnswerSheet, MergeOutcome};
