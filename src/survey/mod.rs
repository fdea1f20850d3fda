//! Initial survey step.
//!
//! The survey uses the same question shapes and answer reconciliation as the
//! follow-up page, but is fetched once rather than polled.

use tracing::info;

use crate::api::ApiClient;
use crate::error::{ApiResult, SubmitError, SubmitResult};
use crate::questionnaire::{build_submission, AnswerSheet};

/// Survey page backed by the assessment API
pub struct SurveyFlow {
    client: ApiClient,
}

impl SurveyFlow {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the survey and build an empty answer sheet for it
    pub async fn load(&self) -> ApiResult<AnswerSheet> {
        let records = self.client.survey_questions().await?;
        let sheet = AnswerSheet::from_records(records);
        info!(questions = sheet.questions().len(), "Survey loaded");
        Ok(sheet)
    }

    /// Submit answered survey questions for the current session.
    ///
    /// Returns the number of records sent. Nothing is sent when no question
    /// is answered or no session is active.
    pub async fn submit(&self, sheet: &AnswerSheet) -> SubmitResult<usize> {
        let session_id = self
            .client
            .session()
            .session_id()
            .ok_or(SubmitError::NoSession)?;
        let records = build_submission(&session_id, sheet)?;
        self.client.submit_survey_responses(&records).await?;
        Ok(records.len())
    }
}
