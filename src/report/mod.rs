//! Report page: wait for the pipeline to finish and resolve the report.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

use crate::api::{PipelineApi, PipelineStatus, StatusResponse};
use crate::error::{ApiError, AppError, AppResult};
use crate::poller::{PollDecision, PollEvent, PollerConfig, StatusPoller};

/// Fallback shown when the backend reports an error without a message
pub const GENERIC_REPORT_FAILURE: &str = "Report generation failed.";

/// What the results view should show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReportOutcome {
    Ready { url: Option<String> },
    Generating,
    Failed { message: String },
    NotFound,
}

impl ReportOutcome {
    /// Map a terminal status to an outcome; `None` for non-terminal statuses
    pub fn from_status(status: StatusResponse) -> Option<Self> {
        match status.status {
            PipelineStatus::Ready => Some(ReportOutcome::Ready { url: status.url }),
            PipelineStatus::GeneratingReport => Some(ReportOutcome::Generating),
            PipelineStatus::Error => Some(ReportOutcome::Failed {
                message: status
                    .error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_REPORT_FAILURE.to_string()),
            }),
            PipelineStatus::NotFound => Some(ReportOutcome::NotFound),
            _ => None,
        }
    }
}

/// Classification for the results view: keep polling while the report is
/// being generated, stop only once it is ready, failed or missing.
pub fn classify_report(status: &PipelineStatus) -> PollDecision {
    match status {
        PipelineStatus::Ready | PipelineStatus::Error | PipelineStatus::NotFound => {
            PollDecision::Terminal
        }
        PipelineStatus::SessionCreated
        | PipelineStatus::Started
        | PipelineStatus::PipelineRunning
        | PipelineStatus::GeneratingReport
        | PipelineStatus::Unknown(_) => PollDecision::Continue,
    }
}

/// Poll until the report is ready, failed or missing, without fetching questions
pub async fn wait_for_report(
    api: Arc<dyn PipelineApi>,
    session_id: &str,
    interval: Duration,
) -> AppResult<ReportOutcome> {
    let (tx, mut rx) = mpsc::channel(4);
    let config = PollerConfig::new(interval)
        .without_questions()
        .with_classifier(classify_report);
    let mut poller = StatusPoller::new(api, config);
    poller.start(session_id, tx);

    while let Some(event) = rx.recv().await {
        match event {
            PollEvent::Terminal(status) => {
                let raw = status.status.clone();
                if let Some(outcome) = ReportOutcome::from_status(status) {
                    info!(session_id = %session_id, status = %raw, "Report status resolved");
                    return Ok(outcome);
                }
            }
            PollEvent::AuthExpired => {
                return Err(ApiError::Unauthorized {
                    message: "session expired while waiting for report".to_string(),
                }
                .into())
            }
            PollEvent::Questions(_) => {}
        }
    }

    Err(AppError::Internal {
        message: "status poller stopped without a terminal status".to_string(),
    })
}
