use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::types::{
    CreateSessionResponse, ErrorBody, LoginRequest, QuestionRecord, RegisterRequest,
    StatusResponse, SubmissionRecord, TokenResponse, User,
};
use super::PipelineApi;
use crate::config::{ApiConfig, RequestConfig};
use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;

/// Client for the assessment backend REST API
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
    request_config: RequestConfig,
}

impl ApiClient {
    /// Create a new API client sharing the given session store
    pub fn new(
        config: &ApiConfig,
        request_config: RequestConfig,
        session: SessionStore,
    ) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = request_config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build().map_err(ApiError::Http)?;

        if let Some(token) = &config.token {
            session.set_token(token.clone());
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session store shared with this client
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `path` with `segment` appended as a single percent-encoded path segment
    fn segment_url(&self, path: &str, segment: &str) -> ApiResult<Url> {
        let invalid = |message: String| ApiError::InvalidUrl { message };
        let mut url = Url::parse(&self.url(path)).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid(format!("{} cannot carry path segments", self.base_url)))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the raw successful response
    async fn execute(&self, label: &str, builder: RequestBuilder) -> ApiResult<reqwest::Response> {
        let start = Instant::now();
        let response = self.authorized(builder).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    timeout_ms: self.request_config.timeout_ms.unwrap_or_default(),
                }
            } else {
                ApiError::Http(e)
            }
        })?;

        let status = response.status();
        debug!(
            endpoint = label,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis(),
            "Backend call completed"
        );

        if status == StatusCode::UNAUTHORIZED {
            warn!(endpoint = label, "Backend rejected credentials, clearing session");
            self.session.clear();
            let detail = error_detail(response).await;
            return Err(ApiError::Unauthorized {
                message: detail.unwrap_or_else(|| "credentials rejected".to_string()),
            });
        }

        if !status.is_success() {
            let detail = error_detail(response).await;
            return Err(ApiError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        label: &str,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        let response = self.execute(label, builder).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                message: format!("Failed to parse {} response: {}", label, e),
            })
    }

    /// Exchange credentials for a bearer token and store it
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenResponse> {
        let form = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let builder = self.client.post(self.url("/token")).form(&form);
        let token: TokenResponse = self.execute_json("token", builder).await?;

        self.session.set_token(token.access_token.clone());
        info!(username = %username, "Logged in");
        Ok(token)
    }

    /// Register a new account
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<User> {
        let builder = self.client.post(self.url("/register")).json(request);
        let user: User = self.execute_json("register", builder).await?;
        info!(username = %user.username, "Account registered");
        Ok(user)
    }

    /// Fetch the currently authenticated user
    pub async fn current_user(&self) -> ApiResult<User> {
        let builder = self.client.get(self.url("/users/me"));
        self.execute_json("users/me", builder).await
    }

    /// Drop all local credentials
    pub fn logout(&self) {
        self.session.clear();
    }

    /// Start a new assessment session and remember its id
    pub async fn create_session(&self) -> ApiResult<String> {
        let builder = self.client.post(self.url("/create-session"));
        let created: CreateSessionResponse = self.execute_json("create-session", builder).await?;

        self.session.set_session_id(created.session_id.clone());
        info!(session_id = %created.session_id, "Assessment session created");
        Ok(created.session_id)
    }

    /// Fetch the initial survey questions
    pub async fn survey_questions(&self) -> ApiResult<Vec<QuestionRecord>> {
        let builder = self.client.get(self.url("/survey-questions"));
        let questions: Option<Vec<QuestionRecord>> =
            self.execute_json("survey-questions", builder).await?;
        Ok(questions.unwrap_or_default())
    }

    /// Submit survey answers
    pub async fn submit_survey_responses(&self, records: &[SubmissionRecord]) -> ApiResult<()> {
        let builder = self.client.post(self.url("/survey-responses")).json(records);
        self.execute("survey-responses", builder).await?;
        info!(count = records.len(), "Survey responses submitted");
        Ok(())
    }
}

#[async_trait]
impl PipelineApi for ApiClient {
    async fn pipeline_status(&self, session_id: &str) -> ApiResult<StatusResponse> {
        let url = self.segment_url("/recommendations/status", session_id)?;
        let builder = self.client.get(url);
        self.execute_json("recommendations/status", builder).await
    }

    async fn followup_questions(&self, session_id: &str) -> ApiResult<Option<Vec<QuestionRecord>>> {
        let builder = self
            .client
            .get(self.url("/followup-questions"))
            .query(&[("session_id", session_id)]);
        self.execute_json("followup-questions", builder).await
    }

    async fn submit_followup_responses(&self, records: &[SubmissionRecord]) -> ApiResult<()> {
        let builder = self.client.post(self.url("/followup-responses")).json(records);
        self.execute("followup-responses", builder).await?;
        info!(count = records.len(), "Follow-up responses submitted");
        Ok(())
    }
}

/// Extract the backend's `detail` message from an error response
async fn error_detail(response: reqwest::Response) -> Option<String> {
    let body = response.text().await.unwrap_or_default();
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.message(),
        Err(_) => Some(body),
    }
}
