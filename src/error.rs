use std::fmt;

/// Error types that can occur while searching the catalog or talking to remote providers.
#[derive(Debug)]
pub enum FinderError {
    /// HTTP request/response errors
    HttpError(String),
    /// Authentication and authorization errors (missing key, 401, 403)
    AuthError(String),
    /// The provider rejected the request because of rate limiting (429)
    RateLimited(String),
    /// Invalid request parameters, rejected locally before any network call
    InvalidRequest(String),
    /// Errors returned by the provider
    ProviderError(String),
    /// The provider answered with something we could not decode
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// JSON serialization/deserialization errors
    JsonError(String),
    /// Malformed rows in the movie dataset
    DatasetError(String),
    /// Local IO errors (dataset file, secret store, audio output)
    IoError(String),
    /// Anything else
    Generic(String),
}

impl FinderError {
    /// Classifies a non-success HTTP status returned by `provider`.
    pub fn from_status(provider: &str, status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => FinderError::AuthError(format!(
                "{provider} rejected the API key ({status})"
            )),
            429 => FinderError::RateLimited(format!("{provider} rate limit reached ({status})")),
            _ => FinderError::ResponseFormatError {
                message: format!("{provider} API returned error status: {status}"),
                raw_response: body,
            },
        }
    }

    /// Validation errors are warnings for the user, not failures of a remote call.
    pub fn is_validation(&self) -> bool {
        matches!(self, FinderError::InvalidRequest(_))
    }
}

impl fmt::Display for FinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinderError::HttpError(e) => write!(f, "HTTP Error: {e}"),
            FinderError::AuthError(e) => write!(f, "Auth Error: {e}"),
            FinderError::RateLimited(e) => write!(f, "Rate Limited: {e}"),
            FinderError::InvalidRequest(e) => write!(f, "Invalid Request: {e}"),
            FinderError::ProviderError(e) => write!(f, "Provider Error: {e}"),
            FinderError::ResponseFormatError {
                message,
                raw_response,
            } => write!(f, "Response Format Error: {message}. Raw response: {raw_response}"),
            FinderError::JsonError(e) => write!(f, "JSON Parse Error: {e}"),
            FinderError::DatasetError(e) => write!(f, "Dataset Error: {e}"),
            FinderError::IoError(e) => write!(f, "IO Error: {e}"),
            FinderError::Generic(e) => write!(f, "Generic Error: {e}"),
        }
    }
}

impl std::error::Error for FinderError {}

/// Converts reqwest HTTP errors into FinderErrors
impl From<reqwest::Error> for FinderError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 429 => FinderError::RateLimited(err.to_string()),
            Some(status) if matches!(status.as_u16(), 401 | 403) => {
                FinderError::AuthError(err.to_string())
            }
            _ => FinderError::HttpError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FinderError {
    fn from(err: serde_json::Error) -> Self {
        FinderError::JsonError(format!(
            "{} at line {} column {}",
            err, err.line(), err.column()
        ))
    }
}

impl From<csv::Error> for FinderError {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(pos) => FinderError::DatasetError(format!("line {}: {err}", pos.line())),
            None => FinderError::DatasetError(err.to_string()),
        }
    }
}

impl From<std::io::Error> for FinderError {
    fn from(err: std::io::Error) -> Self {
        FinderError::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_classified() {
        let auth = FinderError::from_status("Groq", reqwest::StatusCode::UNAUTHORIZED, "".into());
        assert!(matches!(auth, FinderError::AuthError(_)));

        let limited =
            FinderError::from_status("Groq", reqwest::StatusCode::TOO_MANY_REQUESTS, "".into());
        assert!(matches!(limited, FinderError::RateLimited(_)));

        let other = FinderError::from_status(
            "Groq",
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".into(),
        );
        match other {
            FinderError::ResponseFormatError { raw_response, .. } => {
                assert_eq!(raw_response, "boom")
            }
            e => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn only_invalid_request_is_validation() {
        assert!(FinderError::InvalidRequest("blank".into()).is_validation());
        assert!(!FinderError::HttpError("down".into()).is_validation());
    }
}
