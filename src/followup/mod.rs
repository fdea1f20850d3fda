//! Follow-up question page.
//!
//! [`FollowupPage`] is the page's state machine; every transition is an
//! explicit method call:
//!
//! ```text
//! Loading ──questions──▶ HasItems / NoItems ──submit──▶ Submitting
//!                                                         │
//!                       success: cleared ◀────────────────┤
//!                       failure: previous phase ◀─────────┘
//! ```
//!
//! [`FollowupSession`] drives a page from two event sources: the status
//! poller and user commands, both delivered over channels to a single task
//! that owns the page.

mod session;

pub use session::{FollowupSession, PageExit, PageUpdate, UserCommand};

use tracing::{debug, info};

use crate::api::{QuestionRecord, SubmissionRecord};
use crate::error::{ApiResult, EditError, SubmitError, SubmitResult};
use crate::questionnaire::{build_submission, AnswerEdit, AnswerSheet, MergeOutcome};

/// Page lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePhase {
    /// Waiting for the first question fetch
    Loading,
    HasItems,
    NoItems,
    /// A submission request is in flight
    Submitting,
}

/// Follow-up page state
#[derive(Debug)]
pub struct FollowupPage {
    session_id: String,
    sheet: AnswerSheet,
    phase: PagePhase,
    error: Option<String>,
}

impl FollowupPage {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            sheet: AnswerSheet::new(),
            phase: PagePhase::Loading,
            error: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> PagePhase {
        self.phase
    }

    pub fn sheet(&self) -> &AnswerSheet {
        &self.sheet
    }

    /// Inline error shown to the user, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Merge a question fetch into the page
    pub fn on_questions(&mut self, records: Option<Vec<QuestionRecord>>) -> MergeOutcome {
        let outcome = self.sheet.merge(records);
        if self.phase != PagePhase::Submitting {
            self.phase = self.items_phase();
        }
        debug!(
            session_id = %self.session_id,
            replaced = outcome.replaced,
            initialized = outcome.initialized,
            questions = self.sheet.questions().len(),
            "Merged follow-up questions"
        );
        outcome
    }

    /// Apply a user edit
    pub fn on_edit(&mut self, question_id: &str, edit: AnswerEdit) -> Result<(), EditError> {
        self.sheet.edit(question_id, edit)
    }

    /// Validate and build the payload, entering `Submitting` on success.
    ///
    /// An empty payload records the validation message and leaves the phase as is.
    pub fn begin_submit(&mut self) -> SubmitResult<Vec<SubmissionRecord>> {
        if self.phase == PagePhase::Submitting {
            return Err(SubmitError::InFlight);
        }
        match build_submission(&self.session_id, &self.sheet) {
            Ok(records) => {
                self.error = None;
                self.phase = PagePhase::Submitting;
                Ok(records)
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Record the outcome of a submission request
    pub fn finish_submit(&mut self, result: ApiResult<()>) -> SubmitResult<()> {
        match result {
            Ok(()) => {
                info!(session_id = %self.session_id, "Follow-up answers accepted");
                self.sheet.clear();
                self.error = None;
                self.phase = PagePhase::NoItems;
                Ok(())
            }
            Err(e) => {
                let err = SubmitError::from(e);
                self.error = Some(err.user_message());
                self.phase = self.items_phase();
                Err(err)
            }
        }
    }

    fn items_phase(&self) -> PagePhase {
        if self.sheet.is_empty() {
            PagePhase::NoItems
        } else {
            PagePhase::HasItems
        }
    }
}
