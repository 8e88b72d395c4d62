use async_trait::async_trait;
use serde_derive::Deserialize;
use thiserror::Error;

use super::Profile;
use super::Task;
use super::TaskDraft;

/// Failures from the task server, split so callers can route a rejected
/// credential to session teardown instead of the generic error slot.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("your session has expired")]
    Unauthorized,
    #[error("cannot reach the task server")]
    Unreachable,
    #[error("{0}")]
    Rejected(String),
    #[error("the task server returned an unexpected response")]
    Malformed,
}

/// Result of exchanging a Google access token at the backend. The profile
/// returned here is the authoritative one that gets persisted, not the
/// userinfo preview shown during sign-in.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthExchange {
    pub access: String,
    pub user: Profile,
}

#[async_trait]
pub trait Api {
    /// Trades a Google-issued access token for a backend credential and
    /// profile.
    async fn exchange_google_token(&self, provider_token: &str) -> Result<AuthExchange, ApiError>;

    /// Fetches every task belonging to the credential. The response is the
    /// sole source of truth for the local cache.
    async fn list_tasks(&self, credential: &str) -> Result<Vec<Task>, ApiError>;

    async fn create_task(&self, credential: &str, draft: &TaskDraft) -> Result<Task, ApiError>;

    /// Submits a full representation of the task. The server does not accept
    /// partial patches.
    async fn update_task(&self, credential: &str, task: &Task) -> Result<Task, ApiError>;

    async fn delete_task(&self, credential: &str, id: i64) -> Result<(), ApiError>;
}

pub type ApiBox = Box<dyn Api + Send + Sync>;
