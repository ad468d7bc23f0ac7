//! Scoring rules shared by the quiz session and the profile view.

/// Points awarded per correct answer unless configured otherwise.
pub const DEFAULT_POINTS_PER_CORRECT: u32 = 10;

/// How an attempt turns into a percentage, a pass/fail verdict and points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub points_per_correct: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            points_per_correct: DEFAULT_POINTS_PER_CORRECT,
        }
    }
}

impl ScoringPolicy {
    pub fn new(points_per_correct: u32) -> Self {
        Self { points_per_correct }
    }

    /// `round(correct / total * 100)`, halves rounding up. Zero questions score zero.
    pub fn percentage(&self, correct: usize, total: usize) -> u32 {
        if total == 0 {
            return 0;
        }
        let correct = correct.min(total) as u64;
        let total = total as u64;
        ((correct * 200 + total) / (total * 2)) as u32
    }

    pub fn passed(&self, percentage: u32, passing_score: u32) -> bool {
        percentage >= passing_score
    }

    /// Points credited to the user's cumulative score.
    pub fn points(&self, correct_answers: u32) -> u32 {
        correct_answers.saturating_mul(self.points_per_correct)
    }
}
