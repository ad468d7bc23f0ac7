//! Backend paths, relative to the API base URL.

use crate::models::QuizId;

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const ALL_QUIZZES: &str = "/quiz/all";
pub const SUBMIT: &str = "/quiz/submit";
pub const MY_RESULTS: &str = "/quiz/my-results";

pub fn quiz(id: QuizId) -> String {
    format!("/quiz/{}", id)
}

pub fn quizzes_by_category(category: &str) -> String {
    format!("/quiz/category/{}", encode_segment(category))
}

/// Login and registration, which are answered without a bearer token.
pub fn is_auth(path: &str) -> bool {
    path.starts_with("/auth/")
}

/// Percent-encode a single path segment.
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Join the base URL and a path without doubling slashes.
pub fn url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth() {
        assert!(is_auth(LOGIN));
        assert!(is_auth(REGISTER));
        assert!(!is_auth(MY_RESULTS));
        assert!(!is_auth(&quiz(1)));
    }

    #[test]
    fn test_paths() {
        assert_eq!(quiz(12), "/quiz/12");
        assert_eq!(
            quizzes_by_category("Web Development"),
            "/quiz/category/Web%20Development"
        );
        assert_eq!(
            url("http://localhost:8080/api/", ALL_QUIZZES),
            "http://localhost:8080/api/quiz/all"
        );
    }
}
