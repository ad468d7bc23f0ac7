//! REST access to the quiz backend.

mod backend;
mod client;

pub use backend::QuizBackend;
pub use client::{ApiClient, DEFAULT_TIMEOUT};
