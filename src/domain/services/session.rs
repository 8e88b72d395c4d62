#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use anyhow::Result;

use super::CredentialStore;
use crate::domain::models::AuthState;
use crate::domain::models::Profile;
use crate::domain::models::Session;

/// Owns the authentication state: the active session, its persistence, and
/// the login/logout transitions. The task list controller receives this by
/// reference rather than reading ambient global token state, so the
/// authorization dependency stays explicit.
pub struct SessionManager {
    store: CredentialStore,
    state: AuthState,
    session: Option<Session>,
}

impl Default for SessionManager {
    fn default() -> SessionManager {
        return SessionManager::new(CredentialStore::default());
    }
}

impl SessionManager {
    pub fn new(store: CredentialStore) -> SessionManager {
        return SessionManager {
            store,
            state: AuthState::Unknown,
            session: None,
        };
    }

    /// Loads a previously persisted session without contacting any server.
    /// A stale credential is discovered lazily, on the first authorized
    /// request that comes back 401.
    pub async fn restore(&mut self) -> Result<AuthState> {
        match self.store.load().await? {
            Some((credential, profile)) => {
                self.session = Some(Session {
                    credential,
                    profile,
                });
                self.state = AuthState::Authenticated;
            }
            None => {
                self.session = None;
                self.state = AuthState::Unauthenticated;
            }
        }

        return Ok(self.state);
    }

    pub fn begin_login(&mut self) {
        self.state = AuthState::Authenticating;
    }

    /// Persists the exchanged credential and profile together and activates
    /// the session. Concurrent logins are not de-duplicated; the last writer
    /// wins in both memory and storage.
    pub async fn activate(&mut self, credential: String, profile: Profile) -> Result<()> {
        self.store.save(&credential, &profile).await?;
        self.session = Some(Session {
            credential,
            profile,
        });
        self.state = AuthState::Authenticated;

        return Ok(());
    }

    /// A login attempt failed. Any prior session is left untouched.
    pub fn fail_login(&mut self) {
        if self.state != AuthState::Authenticating {
            return;
        }

        if self.session.is_some() {
            self.state = AuthState::Authenticated;
        } else {
            self.state = AuthState::Unauthenticated;
        }
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.store.clear().await?;
        self.session = None;
        self.state = AuthState::Unauthenticated;

        return Ok(());
    }

    /// Teardown triggered by a server reporting the credential as rejected.
    /// Same outcome as an explicit logout.
    pub async fn expire(&mut self) -> Result<()> {
        return self.logout().await;
    }

    pub fn credential(&self) -> Option<&str> {
        return self
            .session
            .as_ref()
            .map(|session| return session.credential.as_str());
    }

    pub fn profile(&self) -> Option<&Profile> {
        return self.session.as_ref().map(|session| return &session.profile);
    }

    pub fn state(&self) -> AuthState {
        return self.state;
    }
}
