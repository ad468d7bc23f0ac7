use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::null_as_default;

/// Identifier assigned to a quiz by the backend.
pub type QuizId = u64;

/// Minimum number of options a question must offer.
pub const MIN_OPTIONS: usize = 2;

/// Difficulty label attached to every quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Ordering weight, higher is harder.
    pub fn rank(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.pad(label)
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty: {}", s))
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u64,
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    /// Only present when the backend chooses to ship it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Whether `option` names one of this question's options.
    pub fn has_option(&self, option: usize) -> bool {
        option < self.options.len()
    }

    /// `Some(true/false)` when the correct option is known locally.
    pub fn is_correct(&self, option: usize) -> Option<bool> {
        self.correct_option_index.map(|correct| correct == option)
    }
}

/// A quiz definition as served by `GET /quiz/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    /// Minutes.
    pub time_limit: u32,
    /// Percent threshold.
    pub passing_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<usize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
}

/// Reasons a fetched quiz cannot be attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizValidationError {
    #[error("quiz has no questions")]
    NoQuestions,
    #[error("question {question_id} offers {found} options, at least 2 are required")]
    TooFewOptions { question_id: u64, found: usize },
    #[error("quiz has no time limit")]
    NoTimeLimit,
}

impl Quiz {
    /// Time allowed for one attempt.
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit.saturating_mul(60)
    }

    /// Number of questions, falling back to the advertised count for listings
    /// that ship without the question bodies.
    pub fn question_count(&self) -> usize {
        if self.questions.is_empty() {
            self.total_questions.unwrap_or(0)
        } else {
            self.questions.len()
        }
    }

    /// Check that the quiz can back an attempt.
    pub fn validate(&self) -> Result<(), QuizValidationError> {
        if self.questions.is_empty() {
            return Err(QuizValidationError::NoQuestions);
        }
        if self.time_limit == 0 {
            return Err(QuizValidationError::NoTimeLimit);
        }
        if let Some(question) = self.questions.iter().find(|q| q.options.len() < MIN_OPTIONS) {
            return Err(QuizValidationError::TooFewOptions {
                question_id: question.id,
                found: question.options.len(),
            });
        }
        Ok(())
    }

    /// True when every question ships its correct option.
    pub fn has_answer_key(&self) -> bool {
        self.questions
            .iter()
            .all(|q| q.correct_option_index.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64, options: usize) -> Question {
        Question {
            id,
            text: format!("Question {}", id),
            options: (0..options).map(|i| format!("Option {}", i)).collect(),
            correct_option_index: None,
            explanation: None,
        }
    }

    #[test]
    fn test_deserialize_backend_quiz() {
        let json = r#"{
            "id": 3,
            "title": "CSS Basics",
            "description": "Selectors and layout",
            "category": "Web Development",
            "difficulty": "Medium",
            "timeLimit": 10,
            "passingScore": 70,
            "questions": [
                {"id": 11, "text": "Which property sets color?", "options": ["color", "font"]}
            ]
        }"#;

        let quiz: Quiz = serde_json::from_str(json).unwrap();
        assert_eq!(quiz.difficulty, Difficulty::Medium);
        assert_eq!(quiz.time_limit_secs(), 600);
        assert_eq!(quiz.questions[0].correct_option_index, None);
        assert!(quiz.validate().is_ok());
        assert!(!quiz.has_answer_key());
    }

    #[test]
    fn test_null_description_and_questions() {
        let json = r#"{
            "id": 5,
            "title": "Draft",
            "description": null,
            "category": "Business",
            "difficulty": "Easy",
            "timeLimit": 5,
            "passingScore": 60,
            "questions": null
        }"#;

        let quiz: Quiz = serde_json::from_str(json).unwrap();
        assert!(quiz.description.is_empty());
        assert_eq!(quiz.validate(), Err(QuizValidationError::NoQuestions));
    }

    #[test]
    fn test_validate_rejects_unplayable_quizzes() {
        let mut quiz = Quiz {
            id: 1,
            title: "Empty".to_string(),
            description: String::new(),
            category: "Science".to_string(),
            difficulty: Difficulty::Easy,
            time_limit: 5,
            passing_score: 50,
            total_questions: None,
            questions: Vec::new(),
        };
        assert_eq!(quiz.validate(), Err(QuizValidationError::NoQuestions));

        quiz.questions = vec![question(1, 4), question(2, 1)];
        assert_eq!(
            quiz.validate(),
            Err(QuizValidationError::TooFewOptions {
                question_id: 2,
                found: 1
            })
        );

        quiz.questions = vec![question(1, 2)];
        quiz.time_limit = 0;
        assert_eq!(quiz.validate(), Err(QuizValidationError::NoTimeLimit));
    }

    #[test]
    fn test_difficulty_parse_and_rank() {
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("extreme".parse::<Difficulty>().is_err());
        assert!(Difficulty::Hard.rank() > Difficulty::Easy.rank());
    }
}
