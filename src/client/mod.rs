//! Interactive terminal client.
//!
//! Catalog, quiz-taking and result screens driven by a single-threaded event
//! loop.

mod app;
mod input;
mod runner;
mod ui;

pub use app::{App, CatalogView, Command, Effect, QuizScreen, Reply, Screen, ScreenKind};
pub use runner::run;
