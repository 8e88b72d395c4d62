use tui_textarea::Input;

use super::LoginPrompt;
use super::Profile;
use super::Task;

#[derive(Debug)]
pub enum Event {
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardPaste(String),
    SelectionDown(),
    SelectionUp(),
    FilterNext(),
    ToggleSelected(),
    DeleteSelected(),
    RefreshRequested(),
    SignOutRequested(),
    UIResize(),
    UITick(),
    // Published by the actions worker.
    LoginStarted(),
    LoginPrompt(LoginPrompt),
    LoginVerifying(Profile),
    LoginFailed(String),
    SessionActivated(Profile),
    SessionEnded(),
    TasksRefreshed(Vec<Task>),
    StatusError(String),
}
