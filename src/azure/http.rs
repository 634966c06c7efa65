//! HTTP utilities for Azure Resource Manager REST calls

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote answered with a non-success status
    #[error("API request failed: {status}{}", format_remote_detail(.code, .message))]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    /// A successful response lacked a field the caller relies on
    #[error("response did not include `{0}`")]
    Incomplete(&'static str),
}

impl ApiError {
    /// HTTP status carried by the error, if the remote answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            ApiError::Decode(_) | ApiError::Auth(_) | ApiError::Incomplete(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

fn format_remote_detail(code: &Option<String>, message: &Option<String>) -> String {
    match (code, message) {
        (Some(code), Some(message)) => format!(" ({code}: {message})"),
        (Some(code), None) => format!(" ({code})"),
        (None, Some(message)) => format!(" ({message})"),
        (None, None) => String::new(),
    }
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A response that completed at the HTTP level, successful or not
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// Turn a non-success response into an [`ApiError::Status`]
    pub fn error_for_status(self) -> Result<Value, ApiError> {
        if self.status.is_success() {
            return Ok(self.body);
        }
        let envelope = serde_json::from_value::<ErrorEnvelope>(self.body).ok();
        let (code, message) = match envelope {
            Some(envelope) => (envelope.error.code, envelope.error.message),
            None => (None, None),
        };
        Err(ApiError::Status {
            status: self.status,
            code,
            message,
        })
    }
}

/// HTTP client wrapper for Azure Resource Manager calls
#[derive(Clone)]
pub struct AzureHttpClient {
    client: Client,
}

impl AzureHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("azwb/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request, returning the response whatever its status
    pub async fn get(&self, url: &str, token: &str) -> Result<ApiResponse, ApiError> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url).bearer_auth(token)).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, token: &str, body: &Value) -> Result<ApiResponse, ApiError> {
        tracing::debug!("PUT {}", url);
        self.send(self.client.put(url).bearer_auth(token).json(body))
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> Result<ApiResponse, ApiError> {
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url).bearer_auth(token)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, ApiError> {
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() && status != StatusCode::NOT_FOUND {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
        }

        // Empty bodies are common for 202/204 and for some 404s
        let body = if text.trim().is_empty() {
            Value::Null
        } else if status.is_success() {
            serde_json::from_str(&text)?
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        Ok(ApiResponse { status, body })
    }
}

/// Short, actionable hint for an API error
pub fn format_api_error(error: &ApiError) -> String {
    match error {
        ApiError::Status { status, code, .. } => status_hint(*status, code.as_deref()),
        ApiError::Transport(err) if err.is_timeout() => {
            "The request to Azure timed out. Check connectivity and retry.".to_string()
        }
        ApiError::Transport(err) if err.is_connect() => {
            "Could not reach Azure Resource Manager. Check the endpoint setting.".to_string()
        }
        ApiError::Transport(err) => match err.status() {
            Some(status) => status_hint(status, None),
            None => "The request to Azure failed before a response arrived.".to_string(),
        },
        ApiError::Decode(_) => "Azure returned a response azwb could not parse.".to_string(),
        ApiError::Auth(reason) => format!(
            "Authentication failed ({}). Set AZURE_ACCESS_TOKEN or the service principal variables.",
            reason
        ),
        ApiError::Incomplete(field) => format!(
            "Azure accepted the request but returned no `{}`. Run `azwb show` to check the workbook.",
            field
        ),
    }
}

fn status_hint(status: StatusCode, code: Option<&str>) -> String {
    let hint = match status {
        StatusCode::UNAUTHORIZED => "The access token was rejected. Refresh the credentials.",
        StatusCode::FORBIDDEN => {
            "Permission denied. The identity needs a workbook role on the resource group."
        }
        StatusCode::NOT_FOUND => "Not found. Check the subscription and resource group.",
        StatusCode::CONFLICT => "Conflict. Another operation on this workbook may be running.",
        StatusCode::TOO_MANY_REQUESTS => "Throttled by Azure Resource Manager. Retry later.",
        s if s.is_client_error() => "The request was rejected. Check the manifest values.",
        s if s.is_server_error() => "Azure returned a server error. Retry later.",
        _ => "Unexpected response from Azure.",
    };

    match code {
        Some(code) => format!("{} [{}]", hint, code),
        None => hint.to_string(),
    }
}
