//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use log::debug;

use crate::api::{ApiClient, DEFAULT_TIMEOUT};
use crate::error::{ClientError, StoreError};
use crate::protocol::DEFAULT_API_URL;
use crate::scoring::{ScoringPolicy, DEFAULT_POINTS_PER_CORRECT};
use crate::session::SessionStore;

pub const DEFAULT_SESSION_FILE: &str = ".quiz-session.json";

/// Settings shared by every subcommand.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the quiz backend API
    #[arg(long, global = true, env = "QUIZ_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// File the login session is kept in
    #[arg(long, global = true, env = "QUIZ_SESSION_FILE", default_value = DEFAULT_SESSION_FILE)]
    pub session_file: PathBuf,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Points credited per correct answer
    #[arg(
        long,
        global = true,
        env = "QUIZ_POINTS_PER_CORRECT",
        default_value_t = DEFAULT_POINTS_PER_CORRECT
    )]
    pub points_per_correct: u32,

    /// Seconds before a backend request is abandoned
    #[arg(
        long,
        global = true,
        env = "QUIZ_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs()
    )]
    pub timeout_secs: u64,
}

impl Config {
    pub fn scoring(&self) -> ScoringPolicy {
        ScoringPolicy::new(self.points_per_correct)
    }

    pub fn open_store(&self) -> Result<SessionStore, StoreError> {
        if self.ephemeral {
            debug!("Using an in-memory session");
            return Ok(SessionStore::in_memory());
        }
        SessionStore::open(&self.session_file)
    }

    /// Open the session store and bind a client to it.
    pub fn connect(&self) -> Result<ApiClient, ClientError> {
        let store = self.open_store()?;
        let client = ApiClient::with_timeout(
            self.api_url.trim_end_matches('/'),
            store,
            Duration::from_secs(self.timeout_secs),
        )?;
        Ok(client)
    }
}
