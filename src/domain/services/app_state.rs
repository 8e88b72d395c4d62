#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use crate::domain::models::AuthState;
use crate::domain::models::Event;
use crate::domain::models::LoginPrompt;
use crate::domain::models::Profile;
use crate::domain::models::Task;
use crate::domain::models::TaskCounts;
use crate::domain::models::TaskFilter;

/// Read model for the interface. Holds the latest snapshot published by the
/// actions worker; the filtered view and counts are recomputed from it on
/// every render, never cached.
pub struct AppState {
    pub auth_state: AuthState,
    pub profile: Option<Profile>,
    pub tasks: Vec<Task>,
    pub filter: TaskFilter,
    pub selected: usize,
    pub error: Option<String>,
    pub login_prompt: Option<LoginPrompt>,
    pub login_preview: Option<Profile>,
    pub syncing: bool,
}

impl Default for AppState {
    fn default() -> AppState {
        return AppState {
            auth_state: AuthState::Unknown,
            profile: None,
            tasks: vec![],
            filter: TaskFilter::All,
            selected: 0,
            error: None,
            login_prompt: None,
            login_preview: None,
            syncing: false,
        };
    }
}

impl AppState {
    pub fn handle_worker_event(&mut self, event: Event) {
        match event {
            Event::LoginStarted() => {
                self.auth_state = AuthState::Authenticating;
                self.error = None;
                self.login_prompt = None;
                self.login_preview = None;
            }
            Event::LoginPrompt(prompt) => {
                self.login_prompt = Some(prompt);
            }
            Event::LoginVerifying(profile) => {
                self.login_preview = Some(profile);
            }
            Event::LoginFailed(message) => {
                self.auth_state = AuthState::Unauthenticated;
                self.error = Some(message);
                self.login_prompt = None;
                self.login_preview = None;
            }
            Event::SessionActivated(profile) => {
                self.auth_state = AuthState::Authenticated;
                self.profile = Some(profile);
                self.error = None;
                self.login_prompt = None;
                self.login_preview = None;
                self.syncing = true;
            }
            Event::SessionEnded() => {
                self.auth_state = AuthState::Unauthenticated;
                self.profile = None;
                self.tasks.clear();
                self.selected = 0;
                self.syncing = false;
            }
            Event::TasksRefreshed(tasks) => {
                self.tasks = tasks;
                self.error = None;
                self.syncing = false;
                self.clamp_selection();
            }
            Event::StatusError(message) => {
                self.error = Some(message);
                self.syncing = false;
            }
            _ => {}
        }
    }

    pub fn visible(&self) -> Vec<Task> {
        return self.filter.apply(&self.tasks);
    }

    pub fn counts(&self) -> TaskCounts {
        return TaskCounts::tally(&self.tasks);
    }

    pub fn selected_task(&self) -> Option<Task> {
        return self.visible().get(self.selected).cloned();
    }

    pub fn select_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn select_down(&mut self) {
        let visible = self.visible().len();
        if visible > 0 && self.selected < visible - 1 {
            self.selected += 1;
        }
    }

    pub fn next_filter(&mut self) {
        self.filter = self.filter.next();
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible().len();
        if visible == 0 {
            self.selected = 0;
        } else if self.selected >= visible {
            self.selected = visible - 1;
        }
    }
}
