//! `reqwest` implementation of the backend API.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{
    AuthPayload, Credentials, Quiz, QuizId, QuizResult, QuizSubmission, RegisterRequest, User,
};
use crate::protocol::{decode, endpoints, ApiFailure, ApiOutcome, FailureCode};
use crate::session::SessionStore;

use super::QuizBackend;

/// Upper bound on one request, connect to last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one backend and one session store.
///
/// Cloning is cheap; clones share the connection pool and the store.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: SessionStore) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, store, DEFAULT_TIMEOUT)
    }

    /// Requests that take longer than `timeout` fail with
    /// [`ApiError::Transport`].
    pub fn with_timeout(
        base_url: impl Into<String>,
        store: SessionStore,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Log in and remember the token and profile in the session store.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let payload: AuthPayload = self
            .send(Method::POST, endpoints::LOGIN, Some(credentials))
            .await?
            .ok_or(ApiError::MissingData)?;

        let (token, user) = payload.into_session();
        self.store.sign_in(token, user.clone())?;
        info!("Logged in as {}", user.email);
        Ok(user)
    }

    /// Create an account. Returns the backend's confirmation message.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<String>, ApiError> {
        let outcome = self
            .send_raw::<serde_json::Value, _>(Method::POST, endpoints::REGISTER, Some(request), None)
            .await?;
        match outcome {
            ApiOutcome::Success { message, .. } => Ok(message),
            ApiOutcome::Failure(failure) => Err(self.rejected(failure, false)),
        }
    }

    pub async fn all_quizzes(&self) -> Result<Vec<Quiz>, ApiError> {
        Ok(self
            .send::<Vec<Quiz>, ()>(Method::GET, endpoints::ALL_QUIZZES, None)
            .await?
            .unwrap_or_default())
    }

    pub async fn quizzes_by_category(&self, category: &str) -> Result<Vec<Quiz>, ApiError> {
        Ok(self
            .send::<Vec<Quiz>, ()>(Method::GET, &endpoints::quizzes_by_category(category), None)
            .await?
            .unwrap_or_default())
    }

    pub async fn quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        self.send::<Quiz, ()>(Method::GET, &endpoints::quiz(id), None)
            .await?
            .ok_or(ApiError::MissingData)
    }

    pub async fn submit(&self, submission: &QuizSubmission) -> Result<QuizResult, ApiError> {
        self.send(Method::POST, endpoints::SUBMIT, Some(submission))
            .await?
            .ok_or(ApiError::MissingData)
    }

    pub async fn my_results(&self) -> Result<Vec<QuizResult>, ApiError> {
        Ok(self
            .send::<Vec<QuizResult>, ()>(Method::GET, endpoints::MY_RESULTS, None)
            .await?
            .unwrap_or_default())
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.token_for(path);
        let token_sent = token.is_some();
        match self.send_raw(method, path, body, token.as_deref()).await? {
            ApiOutcome::Success { data, .. } => Ok(data),
            ApiOutcome::Failure(failure) => Err(self.rejected(failure, token_sent)),
        }
    }

    async fn send_raw<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<ApiOutcome<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = endpoints::url(&self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        debug!("{} -> {} ({} bytes)", path, status, bytes.len());

        Ok(decode(status.as_u16(), &bytes)?)
    }

    /// The stored token, except on the auth endpoints which never take one.
    fn token_for(&self, path: &str) -> Option<String> {
        if endpoints::is_auth(path) {
            None
        } else {
            self.store.get_token()
        }
    }

    /// Map a backend failure, expiring the session when a sent token was refused.
    fn rejected(&self, failure: ApiFailure, token_sent: bool) -> ApiError {
        if failure.code == FailureCode::Unauthorized && token_sent {
            warn!("Token rejected ({}), clearing session", failure.message);
            if let Err(err) = self.store.clear() {
                warn!("Could not clear session: {}", err);
            }
            return ApiError::AuthExpired;
        }
        ApiError::Rejected {
            code: failure.code,
            message: failure.message,
        }
    }
}

#[async_trait]
impl QuizBackend for ApiClient {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, ApiError> {
        self.all_quizzes().await
    }

    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        self.quiz(id).await
    }

    async fn submit_attempt(&self, submission: QuizSubmission) -> Result<QuizResult, ApiError> {
        self.submit(&submission).await
    }
}
