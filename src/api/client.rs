use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::{ChatQueryArgs, ChatQueryResponse, GenerateArgs, ReportResponse};

pub const ANALYZE_ENDPOINT: &str = "analyze_landscaping";
pub const CHAT_QUERY_ENDPOINT: &str = "chat_query";

/// Client for the analysis backend.
///
/// Every call is a single round trip: no retries, no timeout, no caching.
/// Failures are logged and handed back to the caller unchanged.
#[derive(Clone)]
pub struct ReportClient {
    http: Client,
    config: ApiConfig,
}

// Error payload of non-success responses
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl ReportClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Build a client from `GARDEN_API_BASE_URL`.
    pub fn from_env() -> ApiResult<Self> {
        Ok(Self::new(ApiConfig::from_env()?))
    }

    /// Send images and tasks for analysis.
    pub async fn submit_analysis(&self, args: &GenerateArgs) -> ApiResult<ReportResponse> {
        self.post_json(ANALYZE_ENDPOINT, args)
            .await
            .inspect_err(|err| tracing::error!("Error generating report: {err}"))
    }

    /// Ask a follow-up question about a previous analysis.
    pub async fn submit_chat_query(&self, args: &ChatQueryArgs) -> ApiResult<ChatQueryResponse> {
        self.post_json(CHAT_QUERY_ENDPOINT, args)
            .await
            .inspect_err(|err| tracing::error!("Error sending chat query: {err}"))
    }

    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.config.endpoint(endpoint);
        tracing::debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message: remote_error_message(status, &text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Server supplied `error` field, or the status code when there is none.
fn remote_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP error! Status: {}", status.as_u16()))
}
