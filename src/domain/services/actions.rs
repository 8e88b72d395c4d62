#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use super::SessionManager;
use super::SyncOutcome;
use super::TaskListController;
use crate::domain::models::Action;
use crate::domain::models::Api;
use crate::domain::models::ApiBox;
use crate::domain::models::AuthState;
use crate::domain::models::Event;
use crate::domain::models::IdentityProvider;
use crate::infrastructure::api::http::HttpApi;
use crate::infrastructure::auth::google::GoogleAuth;

/// Runs the Google consent flow and the backend credential exchange off the
/// main action loop, reporting back through the action channel so session
/// state only ever changes inside that loop. Provider failures and exchange
/// failures surface as distinct messages.
async fn login_flow(
    event_tx: mpsc::UnboundedSender<Event>,
    action_tx: mpsc::UnboundedSender<Action>,
) -> Result<()> {
    let provider = GoogleAuth::default();

    let token = match provider.obtain_access_token(&event_tx).await {
        Ok(token) => token,
        Err(err) => {
            action_tx.send(Action::FailLogin(format!("Google sign-in failed: {err}")))?;
            return Ok(());
        }
    };

    // Best-effort preview of who is signing in; the profile that gets
    // persisted is the one the exchange returns.
    match provider.userinfo(&token).await {
        Ok(profile) => {
            event_tx.send(Event::LoginVerifying(profile))?;
        }
        Err(err) => {
            tracing::warn!(error = ?err, "Could not fetch userinfo preview");
        }
    }

    match HttpApi::default().exchange_google_token(&token).await {
        Ok(exchange) => {
            action_tx.send(Action::CompleteLogin(exchange.access, exchange.user))?;
        }
        Err(err) => {
            action_tx.send(Action::FailLogin(format!("Sign-in was not accepted: {err}")))?;
        }
    }

    return Ok(());
}

/// The single logical thread of the app: owns the session manager and the
/// task list controller, consumes actions from the UI one at a time, and
/// publishes events back. Because actions are handled sequentially, the
/// refreshes triggered by rapid mutations cannot interleave in-process.
pub struct ActionsService {
    session: SessionManager,
    tasks: TaskListController,
    event_tx: mpsc::UnboundedSender<Event>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl ActionsService {
    pub fn new(
        api: ApiBox,
        session: SessionManager,
        event_tx: mpsc::UnboundedSender<Event>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> ActionsService {
        return ActionsService {
            session,
            tasks: TaskListController::new(api),
            event_tx,
            action_tx,
        };
    }

    pub async fn start(
        api: ApiBox,
        event_tx: mpsc::UnboundedSender<Event>,
        action_tx: mpsc::UnboundedSender<Action>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let mut service = ActionsService::new(api, SessionManager::default(), event_tx, action_tx);
        service.boot().await?;

        loop {
            let action = rx.recv().await;
            if action.is_none() {
                return Ok(());
            }

            service.handle(action.unwrap()).await?;
        }
    }

    /// Restores a persisted session before anything else runs. No server is
    /// contacted to validate the credential; a stale one surfaces as a 401 on
    /// the first fetch.
    async fn boot(&mut self) -> Result<()> {
        let state = self.session.restore().await?;
        if state != AuthState::Authenticated {
            self.event_tx.send(Event::SessionEnded())?;
            return Ok(());
        }

        if let Some(profile) = self.session.profile() {
            self.event_tx.send(Event::SessionActivated(profile.clone()))?;
        }

        let outcome = self.tasks.refresh(&mut self.session).await?;
        return self.publish(outcome);
    }

    async fn handle(&mut self, action: Action) -> Result<()> {
        match action {
            Action::RefreshTasks() => {
                let outcome = self.tasks.refresh(&mut self.session).await?;
                return self.publish(outcome);
            }
            Action::CreateTask(title) => {
                let outcome = self.tasks.create(&title, &mut self.session).await?;
                return self.publish(outcome);
            }
            Action::ToggleTask(task) => {
                let outcome = self.tasks.toggle(&task, &mut self.session).await?;
                return self.publish(outcome);
            }
            Action::RemoveTask(id) => {
                let outcome = self.tasks.remove(id, &mut self.session).await?;
                return self.publish(outcome);
            }
            Action::BeginLogin() => {
                self.session.begin_login();
                self.event_tx.send(Event::LoginStarted())?;

                let event_tx = self.event_tx.clone();
                let action_tx = self.action_tx.clone();
                tokio::spawn(async move {
                    return login_flow(event_tx, action_tx).await;
                });

                return Ok(());
            }
            Action::CompleteLogin(credential, profile) => {
                // A login resolving after a logout must not resurrect the
                // session.
                if self.session.state() != AuthState::Authenticating {
                    tracing::warn!("Discarding login result, no login is in progress");
                    return Ok(());
                }

                self.session.activate(credential, profile.clone()).await?;
                self.event_tx.send(Event::SessionActivated(profile))?;

                let outcome = self.tasks.refresh(&mut self.session).await?;
                return self.publish(outcome);
            }
            Action::FailLogin(message) => {
                if self.session.state() != AuthState::Authenticating {
                    return Ok(());
                }

                self.session.fail_login();
                self.event_tx.send(Event::LoginFailed(message))?;
                return Ok(());
            }
            Action::Logout() => {
                self.session.logout().await?;
                self.tasks.clear();
                self.event_tx.send(Event::SessionEnded())?;
                return Ok(());
            }
        }
    }

    fn publish(&self, outcome: SyncOutcome) -> Result<()> {
        match outcome {
            SyncOutcome::Updated => {
                self.event_tx
                    .send(Event::TasksRefreshed(self.tasks.all().to_vec()))?;
            }
            SyncOutcome::Failed => {
                self.event_tx
                    .send(Event::TasksRefreshed(self.tasks.all().to_vec()))?;
                if let Some(error) = self.tasks.error() {
                    self.event_tx.send(Event::StatusError(error.to_string()))?;
                }
            }
            SyncOutcome::SessionExpired => {
                self.event_tx.send(Event::SessionEnded())?;
            }
            SyncOutcome::Skipped => {}
        }

        return Ok(());
    }
}
