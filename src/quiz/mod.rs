//! One timed quiz attempt, from fetch to result.

mod session;
mod timer;

pub use session::{
    AttemptTicket, Phase, PendingSubmission, QuizOutcome, QuizSession, ScoreSource, TickOutcome,
};
pub use timer::{Countdown, CountdownTick};

use crate::error::StoreError;

/// Receives the points earned by an authoritative result.
pub trait ScoreLedger {
    fn credit(&self, points: u32) -> Result<(), StoreError>;
}
