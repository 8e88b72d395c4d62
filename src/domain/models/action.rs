use super::Profile;
use super::Task;

pub enum Action {
    RefreshTasks(),
    CreateTask(String),
    ToggleTask(Task),
    RemoveTask(i64),
    BeginLogin(),
    // Internal follow-ups from the spawned login flow.
    CompleteLogin(String, Profile),
    FailLogin(String),
    Logout(),
}
