use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Display details for the signed-in user. Captured at login time and not
/// refreshed until the next login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: String,
}
