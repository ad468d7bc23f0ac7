use serde::{Deserialize, Serialize};

use super::{null_as_default, QuizId};

/// One answered question in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_id: u64,
    pub selected_option: usize,
}

/// Body of `POST /quiz/submit`.
///
/// Unanswered questions are left out of `answers` entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub quiz_id: QuizId,
    pub answers: Vec<AnswerSubmission>,
    /// Seconds.
    pub time_taken: u32,
}

/// Outcome of one attempt as computed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub quiz_id: QuizId,
    /// Percent.
    pub score: u32,
    pub total_questions: u32,
    /// `my-results` listings leave this unset (absent or `null`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct_answers: u32,
    /// Seconds.
    pub time_taken: u32,
    pub passed: bool,
}
