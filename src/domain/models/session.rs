use super::Profile;

/// Where the client currently stands with the task server. `Unknown` only
/// exists between process start and the first restore attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Unknown,
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// An active sign-in: the backend-issued bearer credential plus the profile
/// returned by the credential exchange. Exactly one session is active at a
/// time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub credential: String,
    pub profile: Profile,
}
