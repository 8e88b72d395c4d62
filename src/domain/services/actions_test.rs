use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ActionsService;
use crate::domain::models::Action;
use crate::domain::models::Api;
use crate::domain::models::ApiError;
use crate::domain::models::AuthExchange;
use crate::domain::models::AuthState;
use crate::domain::models::Event;
use crate::domain::models::Profile;
use crate::domain::models::Task;
use crate::domain::models::TaskDraft;
use crate::domain::services::CredentialStore;
use crate::domain::services::SessionManager;

#[derive(Clone, Default)]
struct StubApi {
    list_responses: Arc<Mutex<VecDeque<Result<Vec<Task>, ApiError>>>>,
}

#[async_trait]
impl Api for StubApi {
    async fn exchange_google_token(&self, _provider_token: &str) -> Result<AuthExchange, ApiError> {
        return Err(ApiError::Malformed);
    }

    async fn list_tasks(&self, _credential: &str) -> Result<Vec<Task>, ApiError> {
        if let Some(res) = self.list_responses.lock().unwrap().pop_front() {
            return res;
        }

        return Ok(vec![]);
    }

    async fn create_task(&self, _credential: &str, draft: &TaskDraft) -> Result<Task, ApiError> {
        return Ok(Task {
            id: 1,
            title: draft.title.to_string(),
            completed: draft.completed,
        });
    }

    async fn update_task(&self, _credential: &str, task: &Task) -> Result<Task, ApiError> {
        return Ok(task.clone());
    }

    async fn delete_task(&self, _credential: &str, _id: i64) -> Result<(), ApiError> {
        return Ok(());
    }
}

struct Harness {
    service: ActionsService,
    event_rx: mpsc::UnboundedReceiver<Event>,
    _action_rx: mpsc::UnboundedReceiver<Action>,
}

fn harness(api: StubApi, session: SessionManager) -> Harness {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();

    return Harness {
        service: ActionsService::new(Box::new(api), session, event_tx, action_tx),
        event_rx,
        _action_rx: action_rx,
    };
}

fn profile() -> Profile {
    return Profile {
        name: "Ann".to_string(),
        email: "ann@example.com".to_string(),
        picture: "".to_string(),
    };
}

async fn fresh_session(dir: &tempfile::TempDir) -> Result<SessionManager> {
    let mut session = SessionManager::new(CredentialStore::new(dir.path().to_path_buf()));
    session.restore().await?;
    return Ok(session);
}

fn expect_session_activated(event: Option<Event>) -> Result<Profile> {
    match event {
        Some(Event::SessionActivated(profile)) => return Ok(profile),
        _ => bail!("Expected a SessionActivated event"),
    }
}

fn expect_tasks_refreshed(event: Option<Event>) -> Result<Vec<Task>> {
    match event {
        Some(Event::TasksRefreshed(tasks)) => return Ok(tasks),
        _ => bail!("Expected a TasksRefreshed event"),
    }
}

#[tokio::test]
async fn it_discards_a_login_that_resolves_after_logout() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let session = fresh_session(&dir).await?;
    let mut harness = harness(StubApi::default(), session);

    harness
        .service
        .handle(Action::CompleteLogin("token-123".to_string(), profile()))
        .await?;

    assert_eq!(harness.service.session.state(), AuthState::Unauthenticated);
    assert!(harness.event_rx.try_recv().is_err());
    assert!(!dir.path().join("credential").exists());

    return Ok(());
}

#[tokio::test]
async fn it_activates_a_login_in_progress() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut session = fresh_session(&dir).await?;
    session.begin_login();

    let api = StubApi::default();
    api.list_responses.lock().unwrap().push_back(Ok(vec![Task {
        id: 1,
        title: "Buy milk".to_string(),
        completed: false,
    }]));

    let mut harness = harness(api, session);
    harness
        .service
        .handle(Action::CompleteLogin("token-123".to_string(), profile()))
        .await?;

    assert_eq!(harness.service.session.state(), AuthState::Authenticated);
    assert!(dir.path().join("credential").exists());

    let activated = expect_session_activated(harness.event_rx.try_recv().ok())?;
    assert_eq!(activated.name, "Ann");

    let tasks = expect_tasks_refreshed(harness.event_rx.try_recv().ok())?;
    assert_eq!(tasks.len(), 1);

    return Ok(());
}

#[tokio::test]
async fn it_reports_login_failure_and_resets_state() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut session = fresh_session(&dir).await?;
    session.begin_login();

    let mut harness = harness(StubApi::default(), session);
    harness
        .service
        .handle(Action::FailLogin("Google sign-in failed: declined".to_string()))
        .await?;

    assert_eq!(harness.service.session.state(), AuthState::Unauthenticated);
    match harness.event_rx.try_recv().ok() {
        Some(Event::LoginFailed(message)) => {
            assert_eq!(message, "Google sign-in failed: declined");
        }
        _ => bail!("Expected a LoginFailed event"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_clears_everything_on_logout() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut session = fresh_session(&dir).await?;
    session.activate("token-123".to_string(), profile()).await?;

    let mut harness = harness(StubApi::default(), session);
    harness.service.handle(Action::Logout()).await?;

    assert_eq!(harness.service.session.state(), AuthState::Unauthenticated);
    assert!(!dir.path().join("credential").exists());
    assert!(!dir.path().join("profile.json").exists());
    assert!(matches!(
        harness.event_rx.try_recv().ok(),
        Some(Event::SessionEnded())
    ));

    return Ok(());
}

#[tokio::test]
async fn it_publishes_the_refreshed_list() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut session = fresh_session(&dir).await?;
    session.activate("token-123".to_string(), profile()).await?;

    let api = StubApi::default();
    api.list_responses.lock().unwrap().push_back(Ok(vec![Task {
        id: 1,
        title: "Buy milk".to_string(),
        completed: false,
    }]));

    let mut harness = harness(api, session);
    harness.service.handle(Action::RefreshTasks()).await?;

    let tasks = expect_tasks_refreshed(harness.event_rx.try_recv().ok())?;
    assert_eq!(tasks[0].title, "Buy milk");

    return Ok(());
}

#[tokio::test]
async fn it_ends_the_session_when_a_refresh_is_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut session = fresh_session(&dir).await?;
    session.activate("token-123".to_string(), profile()).await?;

    let api = StubApi::default();
    api.list_responses
        .lock()
        .unwrap()
        .push_back(Err(ApiError::Unauthorized));

    let mut harness = harness(api, session);
    harness.service.handle(Action::RefreshTasks()).await?;

    assert_eq!(harness.service.session.state(), AuthState::Unauthenticated);
    assert!(matches!(
        harness.event_rx.try_recv().ok(),
        Some(Event::SessionEnded())
    ));

    return Ok(());
}
