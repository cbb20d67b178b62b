use thiserror::Error;

#[derive(Debug, Error)]
pub enum YandexGptError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Network error: {source}")]
    NetworkError { source: reqwest::Error },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Operation {operation_id} failed with code {code}: {message}")]
    OperationFailed {
        operation_id: String,
        code: i64,
        message: String,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl YandexGptError {
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            YandexGptError::AuthenticationFailed { .. } | YandexGptError::PermissionDenied { .. }
        )
    }

    pub fn is_rate_limit_error(&self) -> bool {
        matches!(self, YandexGptError::RateLimitExceeded { .. })
    }

    pub fn is_timeout_error(&self) -> bool {
        matches!(self, YandexGptError::Timeout { .. })
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, YandexGptError::NetworkError { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            YandexGptError::ServerError { .. } | YandexGptError::ServiceUnavailable { .. }
        )
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, YandexGptError::ParseError { .. })
    }

    pub fn is_invalid_response_error(&self) -> bool {
        matches!(self, YandexGptError::InvalidResponse { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            YandexGptError::AuthenticationFailed { .. } => {
                "YandexGPT authentication failed. Please check your API key.".to_string()
            }
            YandexGptError::PermissionDenied { .. } => {
                "The API key has no access to this catalog. Please check the catalog id and service account roles.".to_string()
            }
            YandexGptError::RateLimitExceeded { .. } => {
                "YandexGPT rate limit exceeded. Consider a longer scan interval.".to_string()
            }
            YandexGptError::Timeout { timeout_ms } => {
                format!("YandexGPT did not answer within {timeout_ms}ms.")
            }
            YandexGptError::NetworkError { .. } => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            YandexGptError::InvalidRequest { message } => {
                format!("Invalid request: {message}")
            }
            YandexGptError::ServerError { .. } | YandexGptError::ServiceUnavailable { .. } => {
                "YandexGPT service is experiencing issues. Please try again later.".to_string()
            }
            YandexGptError::ParseError { .. } => {
                "Error parsing YandexGPT response.".to_string()
            }
            YandexGptError::InvalidResponse { .. } => {
                "Received invalid response from YandexGPT.".to_string()
            }
            YandexGptError::OperationFailed { message, .. } => {
                format!("Completion operation failed: {message}")
            }
            YandexGptError::ConfigurationError { message } => {
                format!("Configuration error: {message}")
            }
        }
    }

    pub fn from_reqwest_error(error: reqwest::Error, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            YandexGptError::Timeout { timeout_ms }
        } else if error.is_connect() {
            YandexGptError::NetworkError { source: error }
        } else if let Some(status) = error.status() {
            Self::from_status_and_body(status, &error.to_string())
        } else if error.is_decode() {
            YandexGptError::ParseError {
                message: error.to_string(),
            }
        } else {
            YandexGptError::NetworkError { source: error }
        }
    }

    /// Map a non-success HTTP status and its body to an error
    ///
    /// Cloud API errors look like `{"error": {"grpcCode": 16, "httpCode": 401,
    /// "message": "...", "httpStatus": "Unauthorized"}}`; the operations API
    /// returns the same fields without the `error` wrapper.
    pub fn from_status_and_body(status: reqwest::StatusCode, body: &str) -> Self {
        let status_code = status.as_u16();

        let error_message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .or_else(|| value.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());

        match status_code {
            400 | 404 => YandexGptError::InvalidRequest {
                message: error_message,
            },
            401 => YandexGptError::AuthenticationFailed {
                message: error_message,
            },
            403 => YandexGptError::PermissionDenied {
                message: error_message,
            },
            429 => YandexGptError::RateLimitExceeded {
                message: error_message,
            },
            503 => YandexGptError::ServiceUnavailable {
                message: error_message,
            },
            500..=599 => YandexGptError::ServerError {
                status: status_code,
                message: error_message,
            },
            _ => YandexGptError::InvalidRequest {
                message: format!("HTTP {status_code}: {error_message}"),
            },
        }
    }
}
