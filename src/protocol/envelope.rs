use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Why the backend refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    /// `success: false` or a 4xx that is none of the below.
    Rejected,
    /// 401 or 403.
    Unauthorized,
    /// 404.
    NotFound,
    /// 5xx.
    Server,
}

impl FailureCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => FailureCode::Unauthorized,
            404 => FailureCode::NotFound,
            500..=599 => FailureCode::Server,
            _ => FailureCode::Rejected,
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureCode::Rejected => "rejected",
            FailureCode::Unauthorized => "unauthorized",
            FailureCode::NotFound => "not found",
            FailureCode::Server => "server error",
        };
        f.write_str(label)
    }
}

/// Failure half of [`ApiOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub code: FailureCode,
    pub message: String,
}

/// A decoded envelope: either a typed payload or a typed failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    /// `data` is absent for endpoints that only acknowledge (e.g. register).
    Success { data: Option<T>, message: Option<String> },
    Failure(ApiFailure),
}

impl<T> ApiOutcome<T> {
    pub fn into_result(self) -> Result<Option<T>, ApiFailure> {
        match self {
            ApiOutcome::Success { data, .. } => Ok(data),
            ApiOutcome::Failure(failure) => Err(failure),
        }
    }
}

/// `{success, message?, data?, errors?}`
#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "Option::default")]
    data: Option<T>,
    /// Field validation messages keyed by field name.
    #[serde(default)]
    errors: Option<BTreeMap<String, String>>,
}

/// Decode a response body given its HTTP status.
///
/// Error statuses always produce a failure, falling back to a generic message
/// when the body is not an envelope. A successful status with a body that is
/// not an envelope of `T` is a decoding error.
pub fn decode<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<ApiOutcome<T>, serde_json::Error> {
    let status_ok = (200..300).contains(&status);

    if !status_ok {
        let message = serde_json::from_slice::<Envelope<serde_json::Value>>(body)
            .ok()
            .and_then(failure_message)
            .unwrap_or_else(|| format!("request failed with status {}", status));
        return Ok(ApiOutcome::Failure(ApiFailure {
            code: FailureCode::from_status(status),
            message,
        }));
    }

    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    if envelope.success {
        return Ok(ApiOutcome::Success {
            data: envelope.data,
            message: envelope.message,
        });
    }

    let message = failure_message(Envelope {
        success: false,
        message: envelope.message,
        data: None::<serde_json::Value>,
        errors: envelope.errors,
    })
    .unwrap_or_else(|| "request was rejected".to_string());

    Ok(ApiOutcome::Failure(ApiFailure {
        code: FailureCode::Rejected,
        message,
    }))
}

fn failure_message<T>(envelope: Envelope<T>) -> Option<String> {
    if let Some(message) = envelope.message.filter(|m| !m.trim().is_empty()) {
        return Some(message);
    }
    let errors = envelope.errors?;
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|(field, reason)| format!("{}: {}", field, reason))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuizResult;

    #[test]
    fn test_success_with_data() {
        let body = br#"{"success": true, "message": "Quiz submitted successfully!",
            "data": {"quizId": 1, "score": 67, "totalQuestions": 3, "correctAnswers": 2, "timeTaken": 40, "passed": true}}"#;

        let outcome: ApiOutcome<QuizResult> = decode(200, body).unwrap();
        let result = outcome.into_result().unwrap().unwrap();
        assert_eq!(result.score, 67);
        assert!(result.passed);
    }

    #[test]
    fn test_success_without_data() {
        let body = br#"{"success": true, "message": "User registered successfully!"}"#;
        let outcome: ApiOutcome<serde_json::Value> = decode(200, body).unwrap();
        assert_eq!(
            outcome,
            ApiOutcome::Success {
                data: None,
                message: Some("User registered successfully!".to_string())
            }
        );
    }

    #[test]
    fn test_rejected_envelope() {
        let body = br#"{"success": false, "message": "Quiz not found with id: 9"}"#;
        let outcome: ApiOutcome<QuizResult> = decode(400, body).unwrap();
        assert_eq!(
            outcome.into_result().unwrap_err(),
            ApiFailure {
                code: FailureCode::Rejected,
                message: "Quiz not found with id: 9".to_string()
            }
        );
    }

    #[test]
    fn test_unsuccessful_envelope_with_ok_status() {
        let body = br#"{"success": false}"#;
        let outcome: ApiOutcome<QuizResult> = decode(200, body).unwrap();
        let failure = outcome.into_result().unwrap_err();
        assert_eq!(failure.code, FailureCode::Rejected);
        assert_eq!(failure.message, "request was rejected");
    }

    #[test]
    fn test_validation_errors_become_message() {
        let body = br#"{"success": false, "errors": {"email": "must be valid", "password": "too short"}}"#;
        let outcome: ApiOutcome<QuizResult> = decode(400, body).unwrap();
        assert_eq!(
            outcome.into_result().unwrap_err().message,
            "email: must be valid, password: too short"
        );
    }

    #[test]
    fn test_error_status_with_unparseable_body() {
        let outcome: ApiOutcome<QuizResult> = decode(502, b"<html>Bad Gateway</html>").unwrap();
        let failure = outcome.into_result().unwrap_err();
        assert_eq!(failure.code, FailureCode::Server);
        assert_eq!(failure.message, "request failed with status 502");

        let outcome: ApiOutcome<QuizResult> = decode(401, b"").unwrap();
        assert_eq!(outcome.into_result().unwrap_err().code, FailureCode::Unauthorized);
    }

    #[test]
    fn test_malformed_success_body() {
        let result: Result<ApiOutcome<QuizResult>, _> = decode(200, br#"{"success": true, "data": {"score": "high"}}"#);
        assert!(result.is_err());

        let result: Result<ApiOutcome<QuizResult>, _> = decode(200, b"not json");
        assert!(result.is_err());
    }
}
