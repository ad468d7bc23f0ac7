//! Wire format of the quiz backend.
//!
//! Every endpoint answers with the same JSON envelope; [`envelope`] turns it
//! into a typed outcome and [`endpoints`] names the paths.

pub mod endpoints;
mod envelope;

pub use envelope::{decode, ApiFailure, ApiOutcome, FailureCode};

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
