use super::AppState;
use crate::domain::models::AuthState;
use crate::domain::models::Event;
use crate::domain::models::LoginPrompt;
use crate::domain::models::Profile;
use crate::domain::models::Task;
use crate::domain::models::TaskFilter;

fn profile() -> Profile {
    return Profile {
        name: "Ann".to_string(),
        email: "ann@example.com".to_string(),
        picture: "".to_string(),
    };
}

fn fixture() -> Vec<Task> {
    return vec![
        Task {
            id: 1,
            title: "Buy milk".to_string(),
            completed: false,
        },
        Task {
            id: 2,
            title: "Walk the dog".to_string(),
            completed: true,
        },
    ];
}

#[test]
fn it_applies_a_refreshed_list_and_clears_the_error() {
    let mut app_state = AppState::default();
    app_state.error = Some("cannot reach the task server".to_string());
    app_state.selected = 5;

    app_state.handle_worker_event(Event::TasksRefreshed(fixture()));

    assert_eq!(app_state.tasks.len(), 2);
    assert!(app_state.error.is_none());
    assert_eq!(app_state.selected, 1);
}

#[test]
fn it_drops_everything_when_the_session_ends() {
    let mut app_state = AppState::default();
    app_state.auth_state = AuthState::Authenticated;
    app_state.profile = Some(profile());
    app_state.tasks = fixture();

    app_state.handle_worker_event(Event::SessionEnded());

    assert_eq!(app_state.auth_state, AuthState::Unauthenticated);
    assert!(app_state.profile.is_none());
    assert!(app_state.tasks.is_empty());
    assert_eq!(app_state.selected, 0);
}

#[test]
fn it_tracks_the_login_flow() {
    let mut app_state = AppState::default();
    app_state.auth_state = AuthState::Unauthenticated;

    app_state.handle_worker_event(Event::LoginStarted());
    assert_eq!(app_state.auth_state, AuthState::Authenticating);

    app_state.handle_worker_event(Event::LoginPrompt(LoginPrompt {
        verification_url: "https://google.com/device".to_string(),
        user_code: "ABCD-EFGH".to_string(),
    }));
    assert_eq!(
        app_state.login_prompt.as_ref().unwrap().user_code,
        "ABCD-EFGH"
    );

    app_state.handle_worker_event(Event::SessionActivated(profile()));
    assert_eq!(app_state.auth_state, AuthState::Authenticated);
    assert!(app_state.login_prompt.is_none());
    assert!(app_state.syncing);
}

#[test]
fn it_surfaces_login_failure_without_a_session() {
    let mut app_state = AppState::default();
    app_state.handle_worker_event(Event::LoginStarted());
    app_state.handle_worker_event(Event::LoginFailed("Google sign-in failed".to_string()));

    assert_eq!(app_state.auth_state, AuthState::Unauthenticated);
    assert_eq!(app_state.error.as_deref(), Some("Google sign-in failed"));
}

#[test]
fn it_recomputes_the_visible_list_per_filter() {
    let mut app_state = AppState::default();
    app_state.tasks = fixture();

    assert_eq!(app_state.visible().len(), 2);

    app_state.next_filter();
    assert_eq!(app_state.filter, TaskFilter::Active);
    assert_eq!(app_state.visible()[0].title, "Buy milk");

    app_state.next_filter();
    assert_eq!(app_state.filter, TaskFilter::Completed);
    assert_eq!(app_state.visible()[0].title, "Walk the dog");
}

#[test]
fn it_keeps_the_selection_in_bounds() {
    let mut app_state = AppState::default();
    app_state.tasks = fixture();

    app_state.select_up();
    assert_eq!(app_state.selected, 0);

    app_state.select_down();
    assert_eq!(app_state.selected, 1);
    app_state.select_down();
    assert_eq!(app_state.selected, 1);

    app_state.handle_worker_event(Event::TasksRefreshed(vec![]));
    assert_eq!(app_state.selected, 0);
    assert!(app_state.selected_task().is_none());
}
