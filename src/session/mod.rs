//! Signed-in user state shared across screens.

mod store;

pub use store::{SessionSnapshot, SessionStore};
