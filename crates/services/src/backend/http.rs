use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use quiz_core::model::{AttemptResult, ContentId};

use super::{AttemptEnvelope, AttemptStatus, QuizBackend, SubmitRequest};
use crate::error::BackendError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
    /// Bearer token for the signed-in course flow; `None` for guest attempts.
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl BackendConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|value| !value.trim().is_empty());
        self
    }

    /// Read `QUIZ_API_BASE_URL`, `QUIZ_API_TOKEN` and `QUIZ_API_TIMEOUT_SECS`.
    ///
    /// Returns `None` when no base URL is configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("QUIZ_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let timeout = env::var("QUIZ_API_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Some(Self {
            base_url,
            api_token: None,
            timeout: Duration::from_secs(timeout),
        }
        .with_token(env::var("QUIZ_API_TOKEN").ok()))
    }
}

/// `QuizBackend` over the platform's JSON REST API.
#[derive(Clone)]
pub struct HttpQuizBackend {
    client: Client,
    base: Url,
    api_token: Option<String>,
}

impl HttpQuizBackend {
    /// # Errors
    ///
    /// Returns `BackendError::InvalidConfig` for an unusable base URL and
    /// `BackendError::Http` if the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let base = Url::parse(config.base_url.trim())
            .map_err(|err| BackendError::InvalidConfig(format!("base url: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::InvalidConfig(format!(
                "base url cannot hold paths: {base}"
            )));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base,
            api_token: config.api_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidConfig(format!("base url: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response: Response = self.authorize(request).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl QuizBackend for HttpQuizBackend {
    async fn get_attempt_status(
        &self,
        content_id: &ContentId,
    ) -> Result<AttemptStatus, BackendError> {
        let url = self.endpoint(&["quizzes", content_id.as_str(), "attempt-status"])?;
        debug!(%url, "fetching attempt status");
        self.send(self.client.get(url)).await
    }

    async fn start_attempt(&self, content_id: &ContentId) -> Result<AttemptEnvelope, BackendError> {
        let url = self.endpoint(&["quizzes", content_id.as_str(), "attempts"])?;
        debug!(%url, "starting attempt");
        self.send(self.client.post(url)).await
    }

    async fn resume_attempt(
        &self,
        content_id: &ContentId,
    ) -> Result<AttemptEnvelope, BackendError> {
        let url = self.endpoint(&["quizzes", content_id.as_str(), "attempts", "resume"])?;
        debug!(%url, "resuming attempt");
        self.send(self.client.post(url)).await
    }

    async fn submit_attempt(&self, request: SubmitRequest) -> Result<AttemptResult, BackendError> {
        let url = self.endpoint(&["attempts", request.attempt_id.as_str(), "submit"])?;
        debug!(%url, answers = request.answers.len(), "submitting attempt");
        self.send(self.client.post(url).json(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AttemptId, SubmittedAnswer};
    use quiz_core::time::fixed_now;

    fn backend(base: &str) -> HttpQuizBackend {
        HttpQuizBackend::new(BackendConfig::new(base)).unwrap()
    }

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let backend = backend("https://api.example.com/v1/");
        let url = backend
            .endpoint(&["quizzes", "abc", "attempt-status"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/quizzes/abc/attempt-status"
        );
    }

    #[test]
    fn endpoint_escapes_ids() {
        let backend = backend("https://api.example.com");
        let url = backend.endpoint(&["attempts", "a b/c", "submit"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/attempts/a%20b%2Fc/submit");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            HttpQuizBackend::new(BackendConfig::new("not a url")),
            Err(BackendError::InvalidConfig(_))
        ));
        assert!(matches!(
            HttpQuizBackend::new(BackendConfig::new("mailto:quiz@example.com")),
            Err(BackendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn blank_token_means_guest() {
        let config = BackendConfig::new("https://api.example.com").with_token(Some("  ".into()));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn envelope_decodes_without_started_at() {
        let json = r#"{
            "attemptId": "att-9",
            "content": {
                "durationSeconds": 600,
                "questions": [{ "prompt": "2 + 2?", "options": ["3", "4"] }]
            }
        }"#;
        let envelope: AttemptEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.attempt_id, "att-9");
        assert!(envelope.started_at.is_none());
        assert_eq!(envelope.content.duration_seconds, 600);
        assert_eq!(envelope.content.questions[0].options, ["3", "4"]);
    }

    #[test]
    fn submit_body_omits_attempt_id() {
        let request = SubmitRequest {
            attempt_id: AttemptId::new("att-1").unwrap(),
            answers: vec![
                SubmittedAnswer {
                    question_index: 0,
                    selected_answer: Some(1),
                },
                SubmittedAnswer {
                    question_index: 1,
                    selected_answer: None,
                },
            ],
            elapsed_minutes: 4,
            started_at: fixed_now(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("attemptId").is_none());
        assert_eq!(body["elapsedMinutes"], 4);
        assert_eq!(body["answers"][0]["questionIndex"], 0);
        assert_eq!(body["answers"][1]["selectedAnswer"], serde_json::Value::Null);
    }
}
