//! Statistics shown on the profile screen, derived from `my-results`.

use crate::models::{QuizResult, User};
use crate::scoring::ScoringPolicy;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStats {
    pub attempts: usize,
    pub passed: usize,
    /// Mean percentage, rounded.
    pub average_score: u32,
    pub best_score: u32,
    /// Rounded minutes.
    pub total_minutes: u32,
    /// Share of attempts passed, percent.
    pub completion_rate: u32,
    /// Cumulative points on record for the user.
    pub points: u32,
    /// Points the listed attempts account for, when the backend reports
    /// correct answer counts.
    pub points_from_results: u32,
}

impl ProfileStats {
    pub fn from_results(results: &[QuizResult], user: Option<&User>, policy: &ScoringPolicy) -> Self {
        let points = user.map(|u| u.score).unwrap_or(0);
        if results.is_empty() {
            return Self {
                points,
                ..Self::default()
            };
        }

        let attempts = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let total_score: u64 = results.iter().map(|r| u64::from(r.score)).sum();
        let total_secs: u64 = results.iter().map(|r| u64::from(r.time_taken)).sum();

        Self {
            attempts,
            passed,
            average_score: rounded_div(total_score, attempts as u64),
            best_score: results.iter().map(|r| r.score).max().unwrap_or(0),
            total_minutes: rounded_div(total_secs, 60),
            completion_rate: policy.percentage(passed, attempts),
            points,
            points_from_results: results
                .iter()
                .map(|r| policy.points(r.correct_answers))
                .sum(),
        }
    }
}

fn rounded_div(numerator: u64, denominator: u64) -> u32 {
    ((numerator * 2 + denominator) / (denominator * 2)) as u32
}
