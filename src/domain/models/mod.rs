mod action;
mod api;
mod event;
mod identity;
mod loading;
mod profile;
mod session;
mod task;
mod textarea;

pub use action::*;
pub use api::*;
pub use event::*;
pub use identity::*;
pub use loading::*;
pub use profile::*;
pub use session::*;
pub use task::*;
pub use textarea::*;
