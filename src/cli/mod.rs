//! Command-line interface.
//!
//! Each subcommand corresponds to one page of the assessment flow. Commands
//! return a [`CliResult`] carrying the exit code and the text to print.

mod answers;

pub use answers::{AnswersFile, FileAnswer};

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::{ApiClient, PipelineApi, PipelineStatus, RegisterRequest};
use crate::config::Config;
use crate::followup::{FollowupSession, PageExit, PageUpdate, UserCommand};
use crate::poller::PollerConfig;
use crate::questionnaire::{AnswerSheet, AnswerSpec, Question};
use crate::report::{wait_for_report, ReportOutcome};
use crate::survey::SurveyFlow;

/// Assessment service client
#[derive(Parser, Debug)]
#[command(name = "assessment", version, about)]
pub struct Cli {
    /// Backend base URL (overrides ASSESSMENT_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides ASSESSMENT_API_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in and print an access token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Show the authenticated user
    Me,

    /// Start a new assessment session and print its id
    CreateSession,

    /// Initial survey
    Survey {
        #[command(subcommand)]
        command: SurveyCommands,
    },

    /// Poll for follow-up questions and optionally answer them
    Followup {
        #[arg(long)]
        session: String,

        /// JSON file of answers to submit once questions arrive
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Poll interval in milliseconds (defaults to POLL_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Show the current pipeline status once
    Status {
        #[arg(long)]
        session: String,
    },

    /// Wait for the report and print where to find it
    Report {
        #[arg(long)]
        session: String,

        /// Poll interval in milliseconds (defaults to REPORT_POLL_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

/// Survey subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SurveyCommands {
    /// List survey questions
    Show,

    /// Submit survey answers from a JSON file
    Submit {
        #[arg(long)]
        session: String,
        #[arg(long)]
        answers: PathBuf,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute a CLI command.
pub async fn execute_command(command: Commands, client: ApiClient, config: &Config) -> CliResult {
    match command {
        Commands::Register {
            username,
            email,
            password,
        } => execute_register(&client, username, email, password).await,
        Commands::Login { username, password } => execute_login(&client, &username, &password).await,
        Commands::Me => execute_me(&client).await,
        Commands::CreateSession => execute_create_session(&client).await,
        Commands::Survey { command } => execute_survey(client, command).await,
        Commands::Followup {
            session,
            answers,
            interval_ms,
        } => {
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.polling.followup_interval());
            execute_followup(
                client,
                session,
                answers,
                interval,
                config.polling.report_interval(),
            )
            .await
        }
        Commands::Status { session } => execute_status(&client, &session).await,
        Commands::Report {
            session,
            interval_ms,
        } => {
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.polling.report_interval());
            execute_report(client, &session, interval).await
        }
    }
}

async fn execute_register(
    client: &ApiClient,
    username: String,
    email: String,
    password: String,
) -> CliResult {
    let request = RegisterRequest {
        username,
        email,
        password,
    };
    match client.register(&request).await {
        Ok(user) => CliResult::success(format!("Registered {}", user.username)),
        Err(e) => CliResult::error(format!("Registration failed: {}", e)),
    }
}

async fn execute_login(client: &ApiClient, username: &str, password: &str) -> CliResult {
    match client.login(username, password).await {
        Ok(token) => CliResult::success(token.access_token),
        Err(e) => CliResult::error(format!("Login failed: {}", e)),
    }
}

async fn execute_me(client: &ApiClient) -> CliResult {
    match client.current_user().await {
        Ok(user) => CliResult::success(match user.email {
            Some(email) => format!("{} <{}>", user.username, email),
            None => user.username,
        }),
        Err(e) => CliResult::error(format!("Could not load user: {}", e)),
    }
}

async fn execute_create_session(client: &ApiClient) -> CliResult {
    match client.create_session().await {
        Ok(session_id) => CliResult::success(session_id),
        Err(e) => CliResult::error(format!("Could not create session: {}", e)),
    }
}

async fn execute_survey(client: ApiClient, command: SurveyCommands) -> CliResult {
    let flow = SurveyFlow::new(client.clone());
    let mut sheet = match flow.load().await {
        Ok(sheet) => sheet,
        Err(e) => return CliResult::error(format!("Could not load survey: {}", e)),
    };

    match command {
        SurveyCommands::Show => CliResult::success(render_questions(sheet.questions())),
        SurveyCommands::Submit { session, answers } => {
            let answers = match AnswersFile::load(&answers) {
                Ok(a) => a,
                Err(e) => return CliResult::error(e.to_string()),
            };
            for rejected in answers.apply(&mut sheet) {
                warn!(error = %rejected, "Ignoring answer");
            }

            client.session().set_session_id(session);
            info!(
                answered = answered_count(&sheet),
                total = sheet.questions().len(),
                "Submitting survey"
            );
            match flow.submit(&sheet).await {
                Ok(count) => CliResult::success(format!("Submitted {} survey answers", count)),
                Err(e) => CliResult::error(e.user_message()),
            }
        }
    }
}

async fn execute_status(client: &ApiClient, session_id: &str) -> CliResult {
    match client.pipeline_status(session_id).await {
        Ok(status) => {
            let mut line = status.status.to_string();
            if let Some(url) = status.url {
                line.push_str(&format!(" {}", url));
            }
            if let Some(message) = status.error_message {
                line.push_str(&format!(" ({})", message));
            }
            CliResult::success(line)
        }
        Err(e) => CliResult::error(format!("Status check failed: {}", e)),
    }
}

async fn execute_report(client: ApiClient, session_id: &str, interval: Duration) -> CliResult {
    execute_report_with(Arc::new(client), session_id, interval).await
}

async fn execute_report_with(
    api: Arc<dyn PipelineApi>,
    session_id: &str,
    interval: Duration,
) -> CliResult {
    match wait_for_report(api, session_id, interval).await {
        Ok(outcome) => render_report(outcome),
        Err(e) => CliResult::error(format!("Could not retrieve report: {}", e)),
    }
}

async fn execute_followup(
    client: ApiClient,
    session_id: String,
    answers: Option<PathBuf>,
    interval: Duration,
    report_interval: Duration,
) -> CliResult {
    let answers = match answers.map(|path| AnswersFile::load(&path)).transpose() {
        Ok(a) => a,
        Err(e) => return CliResult::error(e.to_string()),
    };

    let api: Arc<dyn PipelineApi> = Arc::new(client);
    let session = FollowupSession::new(api.clone(), session_id.clone(), PollerConfig::new(interval));

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (update_tx, mut update_rx) = mpsc::channel(32);
    let page = tokio::spawn(session.run(cmd_rx, update_tx));

    let mut batches = BatchTracker::default();
    loop {
        tokio::select! {
            update = update_rx.recv() => match update {
                Some(PageUpdate::QuestionsChanged(questions)) => {
                    println!("{}", render_questions(&questions));
                    let answer_now = batches.should_answer(&questions);
                    if let Some(answers) = answers.as_ref().filter(|_| answer_now) {
                        let mut sent = 0;
                        for question in &questions {
                            for edit in answers.edits_for(question) {
                                let command = UserCommand::Edit {
                                    question_id: question.id.clone(),
                                    edit,
                                };
                                if cmd_tx.send(command).await.is_ok() {
                                    sent += 1;
                                }
                            }
                        }
                        if sent > 0 && cmd_tx.send(UserCommand::Submit).await.is_ok() {
                            batches.mark_submitted(&questions);
                        }
                    }
                }
                Some(PageUpdate::EditRejected(e)) => warn!(error = %e, "Answer rejected"),
                Some(PageUpdate::ValidationFailed(message)) => {
                    println!("{}", message);
                    batches.reset();
                }
                Some(PageUpdate::Submitted { count }) => {
                    info!(count, "Follow-up answers submitted");
                    println!("Submitted {} answers, waiting for the pipeline...", count);
                }
                Some(PageUpdate::SubmitFailed(message)) => {
                    println!("Submission failed: {}", message);
                    batches.reset();
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                let _ = cmd_tx.send(UserCommand::Quit).await;
            }
        }
    }

    match page.await {
        Ok(PageExit::Navigate(status)) if status.status == PipelineStatus::GeneratingReport => {
            println!("Report is being generated, waiting...");
            execute_report_with(api, &session_id, report_interval).await
        }
        Ok(PageExit::Navigate(status)) => match ReportOutcome::from_status(status) {
            Some(outcome) => render_report(outcome),
            None => CliResult::error("Pipeline stopped in an unexpected state"),
        },
        Ok(PageExit::LoggedOut) => CliResult::error("Session expired, please log in again"),
        Ok(PageExit::Closed) => CliResult::success("Stopped"),
        Err(e) => CliResult::error(format!("Follow-up page crashed: {}", e)),
    }
}

/// Tracks which question set the answers file was last submitted for
#[derive(Debug, Default)]
struct BatchTracker {
    submitted: Option<HashSet<String>>,
}

impl BatchTracker {
    /// True unless this exact question set was already submitted
    fn should_answer(&self, questions: &[Question]) -> bool {
        match &self.submitted {
            Some(ids) => *ids != question_ids(questions),
            None => true,
        }
    }

    fn mark_submitted(&mut self, questions: &[Question]) {
        self.submitted = Some(question_ids(questions));
    }

    /// Forget the last batch so the next question update is answered again
    fn reset(&mut self) {
        self.submitted = None;
    }
}

fn question_ids(questions: &[Question]) -> HashSet<String> {
    questions.iter().map(|q| q.id.clone()).collect()
}

fn render_report(outcome: ReportOutcome) -> CliResult {
    match outcome {
        ReportOutcome::Ready { url: Some(url) } => CliResult::success(format!("Report ready: {}", url)),
        ReportOutcome::Ready { url: None } => CliResult::success("Report ready"),
        ReportOutcome::Generating => CliResult::success("Report is being generated"),
        ReportOutcome::Failed { message } => CliResult::error(format!("Report failed: {}", message)),
        ReportOutcome::NotFound => CliResult::error("Session not found"),
    }
}

/// Plain-text listing of questions and how to answer them
pub fn render_questions(questions: &[Question]) -> String {
    if questions.is_empty() {
        return "No questions pending.".to_string();
    }

    let mut output = String::new();
    for question in questions {
        output.push_str(&format!("[{}] {}\n", question.id, question.prompt));
        if let Some(category) = &question.category {
            match &question.subcategory {
                Some(sub) => output.push_str(&format!("    category: {} / {}\n", category, sub)),
                None => output.push_str(&format!("    category: {}\n", category)),
            }
        }
        match &question.spec {
            AnswerSpec::SingleSelect { options } => {
                output.push_str(&format!("    choose one: {}\n", options.join(" | ")));
            }
            AnswerSpec::MultiSelect {
                options,
                allow_other,
            } => {
                if !options.is_empty() {
                    output.push_str(&format!("    choose any: {}\n", options.join(" | ")));
                }
                if *allow_other {
                    output.push_str("    other: free text\n");
                }
            }
            AnswerSpec::FreeText => output.push_str("    free text\n"),
        }
    }
    output
}

/// Number of listed questions with a non-blank answer
pub fn answered_count(sheet: &AnswerSheet) -> usize {
    sheet
        .questions()
        .iter()
        .filter_map(|question| sheet.answer(&question.id))
        .filter(|answer| !answer.is_blank())
        .count()
}
