//! Domain types shared by the REST client, the quiz session and the screens.

mod quiz;
mod result;
mod user;

pub use quiz::{Difficulty, Question, Quiz, QuizId, QuizValidationError};
pub use result::{AnswerSubmission, QuizResult, QuizSubmission};
pub use user::{AuthPayload, Credentials, RegisterRequest, User};

use serde::{Deserialize, Deserializer};

/// Read an explicit `null` the same way as a missing field.
///
/// The backend serializes unset boxed fields as `null` rather than leaving
/// them out; pair with `#[serde(default)]`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
