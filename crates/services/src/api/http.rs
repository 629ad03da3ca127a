use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Deserializer, de};
use tracing::{debug, warn};

use exam_core::model::{ExamScore, Question, QuestionId, SubmissionRequest};

use super::{QuestionSource, SubmissionSink};
use crate::error::ExamApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const QUESTIONS_PATH: &str = "api/questions";
pub const SUBMIT_PATH: &str = "api/results/submit";

#[derive(Clone, Debug)]
pub struct ExamApiConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ExamApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Read `EXAM_API_URL` and `EXAM_API_TOKEN`, falling back to [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("EXAM_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let api_token = env::var("EXAM_API_TOKEN")
            .ok()
            .filter(|value| !value.trim().is_empty());
        Self {
            api_token,
            ..Self::new(base_url)
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|value| !value.trim().is_empty());
        self
    }
}

/// HTTP client for the exam backend. Implements both [`QuestionSource`] and
/// [`SubmissionSink`].
#[derive(Clone, Debug)]
pub struct ExamApiClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl ExamApiClient {
    /// # Errors
    ///
    /// Returns `ExamApiError::InvalidUrl` for an unparsable base URL and
    /// `ExamApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ExamApiConfig) -> Result<Self, ExamApiError> {
        let mut base_url = Url::parse(config.base_url.trim())?;
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ExamApiError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl QuestionSource for ExamApiClient {
    async fn fetch_questions(&self) -> Result<Vec<Question>, ExamApiError> {
        let url = self.endpoint(QUESTIONS_PATH)?;
        debug!(%url, "fetching exam questions");
        let response = self.authorized(self.client.get(url)).send().await?;
        let response = ensure_success(response).await?;

        let records: Vec<QuestionRecord> = response.json().await?;
        records
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect()
    }
}

#[async_trait]
impl SubmissionSink for ExamApiClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<ExamScore, ExamApiError> {
        let url = self.endpoint(SUBMIT_PATH)?;
        debug!(%url, exam_id = %request.exam_id, "submitting exam");
        let response = self
            .authorized(self.client.post(url))
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let body: SubmitResponse = response.json().await?;
        Ok(ExamScore::new(body.score, body.total_questions))
    }
}

async fn ensure_success(response: Response) -> Result<Response, ExamApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
        .and_then(ErrorBody::into_message);
    Err(ExamApiError::HttpStatus { status, message })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    id: u64,
    #[serde(default)]
    question_text: Option<String>,
    #[serde(default)]
    option1: Option<String>,
    #[serde(default)]
    option2: Option<String>,
    #[serde(default)]
    option3: Option<String>,
    #[serde(default)]
    option4: Option<String>,
}

impl QuestionRecord {
    fn into_question(self) -> Result<Question, ExamApiError> {
        let text = self.question_text.unwrap_or_default();
        if text.trim().is_empty() {
            warn!(question = self.id, "question has no prompt text");
        }
        Ok(Question::new(
            QuestionId::new(self.id),
            text,
            [self.option1, self.option2, self.option3, self.option4],
        )?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    #[serde(deserialize_with = "count_from_number")]
    score: u32,
    #[serde(deserialize_with = "count_from_number")]
    total_questions: u32,
}

/// Accepts any non-negative JSON number; some backends send `2.0` for 2.
/// Fractional values are rounded to the nearest whole count.
fn count_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value.round() > f64::from(u32::MAX) {
        return Err(de::Error::custom(format!(
            "expected a non-negative count, got {value}"
        )));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = value.round() as u32;
    Ok(count)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}
