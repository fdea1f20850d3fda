//! # Assessment Client
//!
//! Client library and CLI for a multi-step assessment service: an initial
//! survey, follow-up questions produced by a backend pipeline, and a
//! generated report.
//!
//! ## Features
//!
//! - **Status Polling**: Owned scheduler that polls the pipeline status and stops on terminal states
//! - **Question Reconciliation**: Merges fetched questions without discarding in-progress answers
//! - **Answer Payloads**: Normalizes single-select, multi-select and free-text answers for submission
//! - **Event-Driven Pages**: Follow-up page driven by poller and user events over channels
//! - **Typed API Client**: Bearer-token client for every backend endpoint with global 401 handling
//!
//! ## Architecture
//!
//! ```text
//! StatusPoller ──PollEvent──▶ FollowupSession ──▶ FollowupPage (AnswerSheet)
//!      │                            ▲                   │
//!      ▼                       UserCommand          build_submission
//!  ApiClient (HTTP) ◀───────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use assessment_client::{Config, ApiClient, SessionStore};
//! use assessment_client::followup::FollowupSession;
//! use assessment_client::poller::PollerConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = ApiClient::new(&config.api, config.request.clone(), SessionStore::new())?;
//!     client.login("alice", "secret").await?;
//!     let session_id = client.create_session().await?;
//!
//!     let page = FollowupSession::new(
//!         Arc::new(client),
//!         session_id,
//!         PollerConfig::new(config.polling.followup_interval()),
//!     );
//!     let (_commands, rx) = tokio::sync::mpsc::channel(8);
//!     let (tx, _updates) = tokio::sync::mpsc::channel(8);
//!     let exit = page.run(rx, tx).await;
//!     println!("{:?}", exit);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Assessment backend client and wire types.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Follow-up question page.
pub mod followup;
/// Pipeline status poller.
pub mod poller;
/// Question and answer model.
pub mod questionnaire;
/// Report page.
pub mod report;
/// Ephemeral credential and session storage.
pub mod session;
/// Initial survey page.
pub mod survey;

pub use api::ApiClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::SessionStore;
