use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Http {
            status: status.as_u16(),
            body: Self::truncate_body(body),
        }
    }

    /// HTTP status code, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// 401 or 403: the credentials were rejected
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Message suitable for a blocking notification.
    ///
    /// The backend reports failures as `{"error": "..."}` (custom views) or
    /// `{"detail": "..."}` (framework auth errors). Field validation errors
    /// come back as `{"field": ["message"]}` and are flattened.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { status, body } => {
                extract_backend_message(body).unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        format!("Request failed with status {}", status)
                    } else {
                        format!("Request failed with status {}: {}", status, body)
                    }
                })
            }
            ApiError::Network(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Network(_) => {
                "Unable to connect to server. Check your connection.".to_string()
            }
            other => other.to_string(),
        }
    }
}

fn extract_backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let obj = value.as_object()?;

    for key in ["error", "detail", "message"] {
        if let Some(msg) = obj.get(key).and_then(|v| v.as_str()) {
            return Some(msg.to_string());
        }
    }

    let parts: Vec<String> = obj
        .iter()
        .filter_map(|(field, v)| {
            let msgs: Vec<&str> = v.as_array()?.iter().filter_map(|m| m.as_str()).collect();
            if msgs.is_empty() {
                None
            } else {
                Some(format!("{}: {}", field, msgs.join(" ")))
            }
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}
