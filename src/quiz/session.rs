//! Quiz attempt state machine.
//!
//! ```text
//! Loading ──> InProgress ──> Submitting ──> Completed
//!    │            ^                             │
//!    v            └────────── retake ───────────┘
//! Errored ── retry ──> Loading
//! ```
//!
//! The session never performs I/O. Callers run the fetch and the submission
//! and feed the replies back together with the [`AttemptTicket`] they were
//! issued for; replies for any other ticket are dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn};

use crate::error::ApiError;
use crate::models::{AnswerSubmission, Question, Quiz, QuizId, QuizResult, QuizSubmission};
use crate::scoring::ScoringPolicy;

use super::timer::{Countdown, CountdownTick};
use super::ScoreLedger;

/// Identifies one fetch or one attempt. Unique for the life of the process,
/// so a reply can never be mistaken for one belonging to another session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptTicket(u64);

impl AttemptTicket {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        AttemptTicket(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Coarse state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    InProgress,
    Submitting,
    Completed,
    Errored,
}

/// Where the score of a completed attempt came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreSource {
    /// Computed by the backend.
    Server,
    /// Computed locally after the submission failed. Answered questions whose
    /// correct option is unknown locally count as wrong and are `unverifiable`.
    LocalEstimate { unverifiable: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub result: QuizResult,
    pub source: ScoreSource,
}

impl QuizOutcome {
    pub fn is_authoritative(&self) -> bool {
        matches!(self.source, ScoreSource::Server)
    }
}

/// A submission the caller must send, tagged with its attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub ticket: AttemptTicket,
    pub submission: QuizSubmission,
}

/// Result of feeding one timer tick to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is not running a timer.
    Ignored,
    Running { remaining: u32 },
    /// Time ran out; the attempt moved to `Submitting`.
    Expired(PendingSubmission),
}

#[derive(Debug)]
enum State {
    Loading,
    InProgress,
    Submitting,
    Completed(QuizOutcome),
    Errored(String),
}

pub struct QuizSession {
    quiz_id: QuizId,
    policy: ScoringPolicy,
    quiz: Option<Quiz>,
    state: State,
    answers: Vec<Option<usize>>,
    current: usize,
    countdown: Countdown,
    ticket: AttemptTicket,
}

impl QuizSession {
    /// Start a session in `Loading`; fetch the quiz under [`Self::ticket`].
    pub fn new(quiz_id: QuizId, policy: ScoringPolicy) -> Self {
        Self {
            quiz_id,
            policy,
            quiz: None,
            state: State::Loading,
            answers: Vec::new(),
            current: 0,
            countdown: Countdown::new(0),
            ticket: AttemptTicket::fresh(),
        }
    }

    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    pub fn ticket(&self) -> AttemptTicket {
        self.ticket
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Loading => Phase::Loading,
            State::InProgress => Phase::InProgress,
            State::Submitting => Phase::Submitting,
            State::Completed(_) => Phase::Completed,
            State::Errored(_) => Phase::Errored,
        }
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn question_count(&self) -> usize {
        self.answers.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.as_ref()?.questions.get(self.current)
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.answers.get(self.current).copied().flatten()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    /// True while ticks should be delivered.
    pub fn is_timer_running(&self) -> bool {
        matches!(self.state, State::InProgress)
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        match &self.state {
            State::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            State::Errored(message) => Some(message),
            _ => None,
        }
    }

    /// Apply the reply of the quiz fetch.
    ///
    /// Returns false when the reply was discarded (stale ticket or the session
    /// is no longer loading).
    pub fn on_loaded(&mut self, ticket: AttemptTicket, reply: Result<Quiz, ApiError>) -> bool {
        if ticket != self.ticket || !matches!(self.state, State::Loading) {
            warn!("Discarding quiz {} fetch reply for stale attempt", self.quiz_id);
            return false;
        }

        let quiz = match reply {
            Ok(quiz) => quiz,
            Err(err) => {
                warn!("Failed to load quiz {}: {}", self.quiz_id, err);
                let message = if err.is_malformed() {
                    format!("The quiz could not be read: {}", err)
                } else {
                    err.to_string()
                };
                self.state = State::Errored(message);
                return true;
            }
        };

        if let Err(err) = quiz.validate() {
            warn!("Quiz {} cannot be attempted: {}", self.quiz_id, err);
            self.state = State::Errored(format!("This quiz cannot be taken: {}", err));
            return true;
        }

        debug!(
            "Loaded quiz {} with {} questions (answer key: {})",
            quiz.id,
            quiz.questions.len(),
            quiz.has_answer_key()
        );
        self.quiz = Some(quiz);
        self.start_attempt();
        true
    }

    /// `Errored -> Loading`. Returns the ticket the new fetch must use.
    pub fn retry(&mut self) -> Option<AttemptTicket> {
        if !matches!(self.state, State::Errored(_)) {
            return None;
        }
        self.ticket = AttemptTicket::fresh();
        self.state = State::Loading;
        debug!("Retrying quiz {}", self.quiz_id);
        Some(self.ticket)
    }

    /// `Completed -> InProgress` with a fresh attempt of the same quiz.
    pub fn retake(&mut self) -> bool {
        if !matches!(self.state, State::Completed(_)) {
            return false;
        }
        self.start_attempt();
        true
    }

    fn start_attempt(&mut self) {
        let Some(quiz) = &self.quiz else {
            return;
        };
        self.ticket = AttemptTicket::fresh();
        self.answers = vec![None; quiz.questions.len()];
        self.current = 0;
        self.countdown = Countdown::new(quiz.time_limit_secs());
        self.state = State::InProgress;
        debug!(
            "Started attempt {:?} of quiz {} ({}s)",
            self.ticket,
            quiz.id,
            self.countdown.total()
        );
    }

    /// Record `option` for the current question without advancing.
    pub fn select(&mut self, option: usize) -> bool {
        if !matches!(self.state, State::InProgress) {
            return false;
        }
        let valid = self
            .current_question()
            .is_some_and(|question| question.has_option(option));
        if !valid {
            return false;
        }
        self.answers[self.current] = Some(option);
        true
    }

    pub fn next(&mut self) {
        self.jump_to(self.current.saturating_add(1));
    }

    pub fn previous(&mut self) {
        self.jump_to(self.current.saturating_sub(1));
    }

    /// Move to `index`, clamped to the question range.
    pub fn jump_to(&mut self, index: usize) {
        if !matches!(self.state, State::InProgress) || self.answers.is_empty() {
            return;
        }
        self.current = index.min(self.answers.len() - 1);
    }

    /// Advance the timer by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if !matches!(self.state, State::InProgress) {
            return TickOutcome::Ignored;
        }
        match self.countdown.tick() {
            CountdownTick::Running(remaining) => TickOutcome::Running { remaining },
            CountdownTick::Expired => {
                info!("Time is up for quiz {}, submitting", self.quiz_id);
                match self.begin_submission() {
                    Some(pending) => TickOutcome::Expired(pending),
                    None => TickOutcome::Ignored,
                }
            }
            CountdownTick::Stopped => TickOutcome::Ignored,
        }
    }

    /// `InProgress -> Submitting`. `None` once a submission has begun.
    pub fn submit(&mut self) -> Option<PendingSubmission> {
        if !matches!(self.state, State::InProgress) {
            return None;
        }
        self.begin_submission()
    }

    fn begin_submission(&mut self) -> Option<PendingSubmission> {
        let quiz = self.quiz.as_ref()?;
        let answers = quiz
            .questions
            .iter()
            .zip(&self.answers)
            .filter_map(|(question, answer)| {
                answer.map(|selected_option| AnswerSubmission {
                    question_id: question.id,
                    selected_option,
                })
            })
            .collect();

        let submission = QuizSubmission {
            quiz_id: quiz.id,
            answers,
            time_taken: self.countdown.elapsed(),
        };
        self.state = State::Submitting;
        debug!(
            "Submitting {} answers for quiz {}",
            submission.answers.len(),
            quiz.id
        );

        Some(PendingSubmission {
            ticket: self.ticket,
            submission,
        })
    }

    /// Apply the reply of the submission. A failed submission still completes
    /// the attempt, with a locally estimated score.
    pub fn on_submitted(
        &mut self,
        ticket: AttemptTicket,
        reply: Result<QuizResult, ApiError>,
        ledger: &dyn ScoreLedger,
    ) -> Option<&QuizOutcome> {
        if ticket != self.ticket || !matches!(self.state, State::Submitting) {
            warn!("Discarding quiz {} submission reply for stale attempt", self.quiz_id);
            return None;
        }

        let outcome = match reply {
            Ok(result) => {
                info!(
                    "Quiz {} scored {}% ({}/{})",
                    result.quiz_id, result.score, result.correct_answers, result.total_questions
                );
                let points = self.policy.points(result.correct_answers);
                if let Err(err) = ledger.credit(points) {
                    warn!("Failed to record {} points: {}", points, err);
                }
                QuizOutcome {
                    result,
                    source: ScoreSource::Server,
                }
            }
            Err(err) => {
                warn!(
                    "Submission for quiz {} failed, estimating locally: {}",
                    self.quiz_id, err
                );
                self.local_outcome(err.to_string())
            }
        };

        self.state = State::Completed(outcome);
        self.outcome()
    }

    fn local_outcome(&self, reason: String) -> QuizOutcome {
        let (total, passing_score) = self
            .quiz
            .as_ref()
            .map(|quiz| (quiz.questions.len(), quiz.passing_score))
            .unwrap_or((0, 0));

        let mut correct = 0;
        let mut unverifiable = 0;
        if let Some(quiz) = &self.quiz {
            for (question, answer) in quiz.questions.iter().zip(&self.answers) {
                let Some(option) = answer else {
                    continue;
                };
                match question.is_correct(*option) {
                    Some(true) => correct += 1,
                    Some(false) => {}
                    None => unverifiable += 1,
                }
            }
        }

        let score = self.policy.percentage(correct, total);
        QuizOutcome {
            result: QuizResult {
                quiz_id: self.quiz_id,
                score,
                total_questions: total as u32,
                correct_answers: correct as u32,
                time_taken: self.countdown.elapsed(),
                passed: self.policy.passed(score, passing_score),
            },
            source: ScoreSource::LocalEstimate {
                unverifiable,
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::StoreError;
    use crate::models::Difficulty;
    use crate::protocol::FailureCode;

    #[derive(Default)]
    struct RecordingLedger {
        credits: RefCell<Vec<u32>>,
    }

    impl ScoreLedger for RecordingLedger {
        fn credit(&self, points: u32) -> Result<(), StoreError> {
            self.credits.borrow_mut().push(points);
            Ok(())
        }
    }

    /// Three questions whose correct option is the question's position.
    fn sample_quiz(time_limit: u32, passing_score: u32, with_key: bool) -> Quiz {
        let questions = (0..3)
            .map(|i| Question {
                id: 100 + i as u64,
                text: format!("Question {}", i + 1),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_option_index: with_key.then_some(i),
                explanation: None,
            })
            .collect();

        Quiz {
            id: 9,
            title: "Sample".to_string(),
            description: String::new(),
            category: "Programming".to_string(),
            difficulty: Difficulty::Easy,
            time_limit,
            passing_score,
            total_questions: Some(3),
            questions,
        }
    }

    fn loaded(quiz: Quiz) -> QuizSession {
        let mut session = QuizSession::new(quiz.id, ScoringPolicy::default());
        let ticket = session.ticket();
        assert!(session.on_loaded(ticket, Ok(quiz)));
        session
    }

    fn network_error() -> ApiError {
        ApiError::Rejected {
            code: FailureCode::Server,
            message: "request failed with status 503".to_string(),
        }
    }

    fn server_result(score: u32, correct: u32, time_taken: u32, passed: bool) -> QuizResult {
        QuizResult {
            quiz_id: 9,
            score,
            total_questions: 3,
            correct_answers: correct,
            time_taken,
            passed,
        }
    }

    #[test]
    fn test_load_initializes_attempt() {
        let session = loaded(sample_quiz(2, 60, false));
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.answers(), &[None, None, None]);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.remaining_secs(), 120);
        assert!(session.is_timer_running());
    }

    #[test]
    fn test_load_failure_then_retry() {
        let mut session = QuizSession::new(9, ScoringPolicy::default());
        let first = session.ticket();
        session.on_loaded(first, Err(network_error()));
        assert_eq!(session.phase(), Phase::Errored);
        assert_eq!(session.error(), Some("request failed with status 503"));
        assert_eq!(session.tick(), TickOutcome::Ignored);

        let second = session.retry().unwrap();
        assert_ne!(first, second);
        assert_eq!(session.phase(), Phase::Loading);

        // A late reply for the first fetch is ignored.
        assert!(!session.on_loaded(first, Ok(sample_quiz(1, 60, false))));
        assert_eq!(session.phase(), Phase::Loading);

        assert!(session.on_loaded(second, Ok(sample_quiz(1, 60, false))));
        assert_eq!(session.phase(), Phase::InProgress);
    }

    #[test]
    fn test_unplayable_quiz_errors() {
        let mut quiz = sample_quiz(1, 60, false);
        quiz.questions.clear();
        let mut session = QuizSession::new(quiz.id, ScoringPolicy::default());
        let ticket = session.ticket();
        session.on_loaded(ticket, Ok(quiz));
        assert_eq!(session.phase(), Phase::Errored);
        assert!(session.error().unwrap().contains("no questions"));
    }

    #[test]
    fn test_navigation_stays_in_range() {
        let mut session = loaded(sample_quiz(1, 60, false));

        session.previous();
        assert_eq!(session.current_index(), 0);

        for _ in 0..10 {
            session.next();
            assert!(session.current_index() < 3);
        }
        assert_eq!(session.current_index(), 2);

        session.jump_to(usize::MAX);
        assert_eq!(session.current_index(), 2);
        session.jump_to(1);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_select_records_without_advancing() {
        let mut session = loaded(sample_quiz(1, 60, false));
        session.next();
        assert!(session.select(3));
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.answers(), &[None, Some(3), None]);

        // Re-selecting replaces, out-of-range options are ignored.
        assert!(session.select(0));
        assert!(!session.select(4));
        assert_eq!(session.current_answer(), Some(0));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn test_submission_omits_unanswered_questions() {
        let mut session = loaded(sample_quiz(1, 60, false));
        session.select(2);
        session.jump_to(2);
        session.select(1);
        for _ in 0..15 {
            session.tick();
        }

        let pending = session.submit().unwrap();
        assert_eq!(pending.ticket, session.ticket());
        assert_eq!(
            pending.submission,
            QuizSubmission {
                quiz_id: 9,
                answers: vec![
                    AnswerSubmission {
                        question_id: 100,
                        selected_option: 2
                    },
                    AnswerSubmission {
                        question_id: 102,
                        selected_option: 1
                    },
                ],
                time_taken: 15,
            }
        );
        assert_eq!(session.phase(), Phase::Submitting);
    }

    #[test]
    fn test_submit_is_idempotent() {
        let ledger = RecordingLedger::default();
        let mut session = loaded(sample_quiz(1, 60, false));
        let pending = session.submit().unwrap();

        assert!(session.submit().is_none());
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert!(!session.select(1));

        session.on_submitted(pending.ticket, Ok(server_result(0, 0, 0, false)), &ledger);
        assert!(session.submit().is_none());
        assert!(session
            .on_submitted(pending.ticket, Ok(server_result(100, 3, 0, true)), &ledger)
            .is_none());
        assert_eq!(ledger.credits.borrow().as_slice(), &[0]);
        assert_eq!(session.outcome().unwrap().result.score, 0);
    }

    #[test]
    fn test_timer_monotonic_and_single_auto_submit() {
        // Scenario C: one minute limit.
        let mut session = loaded(sample_quiz(1, 60, false));
        let mut last = session.remaining_secs();
        let mut submissions = Vec::new();

        for _ in 0..100 {
            match session.tick() {
                TickOutcome::Running { remaining } => {
                    assert!(remaining < last);
                    last = remaining;
                }
                TickOutcome::Expired(pending) => submissions.push(pending),
                TickOutcome::Ignored => {}
            }
            assert!(session.remaining_secs() <= last);
        }

        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].submission.time_taken, 60);
        assert_eq!(session.remaining_secs(), 0);
        assert_eq!(session.phase(), Phase::Submitting);
    }

    #[test]
    fn test_scenario_a_server_result_credits_points() {
        let ledger = RecordingLedger::default();
        let mut session = loaded(sample_quiz(5, 60, false));
        session.select(0);
        session.next();
        session.select(1);
        session.next();
        session.select(0);

        let pending = session.submit().unwrap();
        let outcome = session
            .on_submitted(pending.ticket, Ok(server_result(67, 2, 30, true)), &ledger)
            .unwrap();

        assert!(outcome.is_authoritative());
        assert_eq!(outcome.result.score, 67);
        assert!(outcome.result.passed);
        assert_eq!(session.phase(), Phase::Completed);
        assert!(!session.is_timer_running());
        assert_eq!(ledger.credits.borrow().as_slice(), &[20]);
    }

    #[test]
    fn test_scenario_b_failed_submission_estimates_locally() {
        let ledger = RecordingLedger::default();
        let mut session = loaded(sample_quiz(5, 60, true));
        session.select(0);
        session.next();
        session.select(1);
        session.next();
        session.select(3);

        let pending = session.submit().unwrap();
        let outcome = session
            .on_submitted(pending.ticket, Err(network_error()), &ledger)
            .unwrap()
            .clone();

        assert!(!outcome.is_authoritative());
        assert_eq!(outcome.result.score, 67);
        assert_eq!(outcome.result.correct_answers, 2);
        assert!(outcome.result.passed);
        assert_eq!(
            outcome.source,
            ScoreSource::LocalEstimate {
                unverifiable: 0,
                reason: "request failed with status 503".to_string()
            }
        );
        assert!(ledger.credits.borrow().is_empty());
        assert_eq!(session.phase(), Phase::Completed);
    }

    #[test]
    fn test_local_estimate_without_answer_key() {
        let mut session = loaded(sample_quiz(5, 60, false));
        session.select(0);
        let pending = session.submit().unwrap();
        let outcome = session
            .on_submitted(pending.ticket, Err(ApiError::MissingData), &RecordingLedger::default())
            .unwrap();

        assert_eq!(outcome.result.score, 0);
        assert!(!outcome.result.passed);
        assert_eq!(
            outcome.source,
            ScoreSource::LocalEstimate {
                unverifiable: 1,
                reason: "response carried no data".to_string()
            }
        );
    }

    #[test]
    fn test_scenario_d_expiry_without_answers() {
        let mut session = loaded(sample_quiz(1, 60, true));
        let pending = (0..60)
            .find_map(|_| match session.tick() {
                TickOutcome::Expired(pending) => Some(pending),
                _ => None,
            })
            .unwrap();

        assert!(pending.submission.answers.is_empty());
        assert_eq!(pending.submission.time_taken, 60);

        let outcome = session
            .on_submitted(pending.ticket, Err(network_error()), &RecordingLedger::default())
            .unwrap();
        assert_eq!(outcome.result.score, 0);
        assert!(!outcome.result.passed);
    }

    #[test]
    fn test_retake_resets_attempt() {
        let ledger = RecordingLedger::default();
        let mut session = loaded(sample_quiz(2, 60, false));
        let initial_answers = session.answers().to_vec();
        let initial_remaining = session.remaining_secs();

        session.select(1);
        session.next();
        session.tick();
        session.tick();
        let pending = session.submit().unwrap();
        session.on_submitted(pending.ticket, Ok(server_result(0, 0, 2, false)), &ledger);

        assert!(session.retake());
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.answers(), initial_answers.as_slice());
        assert_eq!(session.remaining_secs(), initial_remaining);
        assert_eq!(session.current_index(), 0);
        assert_ne!(session.ticket(), pending.ticket);
        assert!(!session.retake());
    }

    #[test]
    fn test_late_submission_reply_after_retake_is_discarded() {
        let ledger = RecordingLedger::default();
        let mut session = loaded(sample_quiz(2, 60, false));
        let first = session.submit().unwrap();
        session.on_submitted(first.ticket, Err(network_error()), &ledger);
        session.retake();

        assert!(session
            .on_submitted(first.ticket, Ok(server_result(100, 3, 5, true)), &ledger)
            .is_none());
        assert_eq!(session.phase(), Phase::InProgress);
        assert!(ledger.credits.borrow().is_empty());
    }
}
