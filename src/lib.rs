//! # quiz-client
//!
//! Terminal client for a quiz REST backend: sign in, browse the catalog,
//! take timed multiple-choice quizzes and review the results.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quiz_client::{ApiClient, ClientError, ScoringPolicy, SessionStore};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), ClientError> {
//!     let store = SessionStore::open(".quiz-session.json")?;
//!     let client = ApiClient::new("http://localhost:8080/api", store.clone())?;
//!
//!     // Take quiz 3 in the terminal
//!     quiz_client::client::run(client, store, ScoringPolicy::default(), Some(3)).await
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod profile;
pub mod protocol;
pub mod quiz;
pub mod scoring;
pub mod session;
pub mod terminal;

pub use api::{ApiClient, QuizBackend};
pub use config::Config;
pub use error::{ApiError, ClientError, StoreError};
pub use models::{Difficulty, Question, Quiz, QuizResult, QuizSubmission, User};
pub use quiz::{QuizOutcome, QuizSession, ScoreLedger, ScoreSource};
pub use scoring::ScoringPolicy;
pub use session::{SessionSnapshot, SessionStore};
