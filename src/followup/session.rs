use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::FollowupPage;
use crate::api::{PipelineApi, StatusResponse};
use crate::error::{ApiError, EditError};
use crate::poller::{PollEvent, PollerConfig, StatusPoller};
use crate::questionnaire::{AnswerEdit, Question};

/// Input from the person answering
#[derive(Debug, Clone)]
pub enum UserCommand {
    Edit {
        question_id: String,
        edit: AnswerEdit,
    },
    Submit,
    /// Leave the page
    Quit,
}

/// Notifications for whatever renders the page
#[derive(Debug, Clone)]
pub enum PageUpdate {
    /// The question list changed
    QuestionsChanged(Vec<Question>),
    EditRejected(EditError),
    /// Submission blocked locally, no request sent
    ValidationFailed(String),
    Submitted { count: usize },
    SubmitFailed(String),
}

/// Why the page loop ended
#[derive(Debug)]
pub enum PageExit {
    /// Terminal pipeline status; show the results view
    Navigate(StatusResponse),
    /// Credentials rejected; show the login view
    LoggedOut,
    /// The user quit or closed the command channel
    Closed,
}

/// Drives a [`FollowupPage`] from poller events and user commands.
///
/// The page is owned by the task running [`run`](Self::run), so answers are
/// only ever mutated from that task.
pub struct FollowupSession {
    api: Arc<dyn PipelineApi>,
    page: FollowupPage,
    poller: StatusPoller,
}

impl FollowupSession {
    pub fn new(api: Arc<dyn PipelineApi>, session_id: impl Into<String>, config: PollerConfig) -> Self {
        let poller = StatusPoller::new(api.clone(), config);
        Self {
            api,
            page: FollowupPage::new(session_id),
            poller,
        }
    }

    pub fn page(&self) -> &FollowupPage {
        &self.page
    }

    /// Run until a terminal status, an auth failure, or the user leaves
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<UserCommand>,
        updates: mpsc::Sender<PageUpdate>,
    ) -> PageExit {
        let (poll_tx, mut poll_rx) = mpsc::channel(8);
        self.poller.start(self.page.session_id().to_string(), poll_tx);

        let exit = loop {
            tokio::select! {
                event = poll_rx.recv() => match event {
                    Some(PollEvent::Questions(records)) => {
                        let outcome = self.page.on_questions(records);
                        if outcome.replaced {
                            let questions = self.page.sheet().questions().to_vec();
                            notify(&updates, PageUpdate::QuestionsChanged(questions)).await;
                        }
                    }
                    Some(PollEvent::Terminal(status)) => break PageExit::Navigate(status),
                    Some(PollEvent::AuthExpired) => break PageExit::LoggedOut,
                    None => {
                        warn!(session_id = %self.page.session_id(), "Poller ended without a terminal status");
                        break PageExit::Closed;
                    }
                },
                command = commands.recv() => match command {
                    Some(UserCommand::Edit { question_id, edit }) => {
                        if let Err(e) = self.page.on_edit(&question_id, edit) {
                            notify(&updates, PageUpdate::EditRejected(e)).await;
                        }
                    }
                    Some(UserCommand::Submit) => {
                        if let Some(exit) = self.submit(&updates).await {
                            break exit;
                        }
                    }
                    Some(UserCommand::Quit) | None => break PageExit::Closed,
                },
            }
        };

        self.poller.stop();
        info!(session_id = %self.page.session_id(), exit = ?exit, "Follow-up page closed");
        exit
    }

    /// Submit current answers with polling paused for the duration
    async fn submit(&mut self, updates: &mpsc::Sender<PageUpdate>) -> Option<PageExit> {
        let records = match self.page.begin_submit() {
            Ok(records) => records,
            Err(e) => {
                notify(updates, PageUpdate::ValidationFailed(e.user_message())).await;
                return None;
            }
        };

        let count = records.len();
        self.poller.pause();
        let result = self.api.submit_followup_responses(&records).await;
        self.poller.resume();

        let auth_lost = matches!(result, Err(ApiError::Unauthorized { .. }));
        match self.page.finish_submit(result) {
            Ok(()) => notify(updates, PageUpdate::Submitted { count }).await,
            Err(e) => notify(updates, PageUpdate::SubmitFailed(e.user_message())).await,
        }

        auth_lost.then_some(PageExit::LoggedOut)
    }
}

async fn notify(updates: &mpsc::Sender<PageUpdate>, update: PageUpdate) {
    if updates.send(update).await.is_err() {
        warn!("Page update receiver dropped");
    }
}
