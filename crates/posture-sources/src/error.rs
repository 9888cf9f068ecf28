use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("HTTP status error: {status} {body}")]
    HttpStatus { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response exceeded {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// URLs are stripped before storing: query strings carry API keys.
impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Http(e.without_url())
    }
}

impl SourceError {
    pub fn http_status(status: reqwest::StatusCode, body: String) -> Self {
        Self::HttpStatus {
            status: status.as_u16(),
            body,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::HttpStatus { status, .. } => Some(*status),
            SourceError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short cause used in adapter error markers: the HTTP status code when
    /// there is one, otherwise the transport error kind.
    pub fn cause(&self) -> String {
        if let Some(status) = self.status() {
            return status.to_string();
        }
        match self {
            SourceError::Http(e) if e.is_timeout() => "timeout".to_string(),
            SourceError::Http(e) if e.is_connect() => "connection failed".to_string(),
            SourceError::Http(e) if e.is_redirect() => "too many redirects".to_string(),
            SourceError::Http(e) if e.is_decode() => "invalid response body".to_string(),
            SourceError::Http(e) => e.to_string(),
            SourceError::Json(e) => format!("invalid JSON: {}", e),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_prefers_status_code() {
        let e = SourceError::http_status(reqwest::StatusCode::SERVICE_UNAVAILABLE, "busy".into());
        assert_eq!(e.cause(), "503");
    }

    #[test]
    fn cause_for_oversized_body() {
        let e = SourceError::TooLarge { limit: 16 };
        assert_eq!(e.cause(), "response exceeded 16 bytes");
    }
}
