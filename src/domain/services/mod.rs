pub mod actions;
mod app_state;
pub mod events;
mod session;
mod storage;
mod tasks;

pub use app_state::*;
pub use session::*;
pub use storage::*;
pub use tasks::*;
