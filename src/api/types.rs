use serde::{Deserialize, Deserializer, Serialize};

/// Backend pipeline phase for an assessment session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PipelineStatus {
    SessionCreated,
    Started,
    PipelineRunning,
    GeneratingReport,
    Ready,
    Error,
    NotFound,
    /// Any value the client does not recognize
    Unknown(String),
}

impl PipelineStatus {
    /// Convert to wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            PipelineStatus::SessionCreated => "session_created",
            PipelineStatus::Started => "started",
            PipelineStatus::PipelineRunning => "pipeline_running",
            PipelineStatus::GeneratingReport => "generating_report",
            PipelineStatus::Ready => "ready",
            PipelineStatus::Error => "error",
            PipelineStatus::NotFound => "not_found",
            PipelineStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for PipelineStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "session_created" => PipelineStatus::SessionCreated,
            "started" => PipelineStatus::Started,
            "pipeline_running" => PipelineStatus::PipelineRunning,
            "generating_report" => PipelineStatus::GeneratingReport,
            "ready" => PipelineStatus::Ready,
            "error" => PipelineStatus::Error,
            "not_found" => PipelineStatus::NotFound,
            _ => PipelineStatus::Unknown(raw),
        }
    }
}

impl From<PipelineStatus> for String {
    fn from(status: PipelineStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response of `GET /recommendations/status/{session_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: PipelineStatus,
    /// Report location once the pipeline is ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Question as served by the survey and follow-up endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(alias = "question_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "text")]
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    /// Single-select choices
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Multi-select choices; may contain an "Other" entry
    #[serde(default)]
    pub multiple_choice_options: Option<Vec<String>>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Normalized answer object sent to the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPayload {
    /// Trimmed text for single-select and free-text questions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Selected options for multi-select questions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    /// Free-text "other" sibling of a multi-select question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjective_value: Option<String>,
}

impl AnswerPayload {
    /// True when serializing would produce `{}`
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.values.is_none() && self.subjective_value.is_none()
    }
}

/// One entry of `POST /followup-responses` or `POST /survey-responses`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub session_id: String,
    pub question_id: String,
    pub question: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub answer: AnswerPayload,
}

/// Form body of `POST /token`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response of `POST /token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// JSON body of `POST /register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response of `GET /users/me` and `POST /register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Response of `POST /create-session`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Error body returned by the backend
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Flatten `detail`, which is either a string or a list of validation entries.
    pub(crate) fn message(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                    .map(str::to_string)
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("; "))
                }
            }
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
