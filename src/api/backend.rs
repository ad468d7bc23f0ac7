use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Quiz, QuizId, QuizResult, QuizSubmission};

/// Backend calls made by the terminal client while browsing and taking quizzes.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, ApiError>;

    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError>;

    async fn submit_attempt(&self, submission: QuizSubmission) -> Result<QuizResult, ApiError>;
}
