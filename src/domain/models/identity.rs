use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::Event;
use super::Profile;

/// What the user needs to see to approve a device sign-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginPrompt {
    pub verification_url: String,
    pub user_code: String,
}

#[async_trait]
pub trait IdentityProvider {
    /// Runs the interactive consent flow and resolves to a short-lived
    /// provider access token. The verification prompt is surfaced through the
    /// channel as soon as it is known, while polling continues in the
    /// background.
    async fn obtain_access_token<'a>(
        &self,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String>;

    /// Fetches the profile attached to a provider token. Used only to enrich
    /// what is displayed before the backend exchange completes.
    async fn userinfo(&self, access_token: &str) -> Result<Profile>;
}

pub type IdentityBox = Box<dyn IdentityProvider + Send + Sync>;
