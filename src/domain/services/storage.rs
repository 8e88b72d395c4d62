#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Profile;

const CREDENTIAL_FILE: &str = "credential";
const PROFILE_FILE: &str = "profile.json";

/// Durable storage for the signed-in session: the bearer credential and the
/// serialized profile, each under a fixed file name in the data directory.
/// The two are written together and cleared together.
pub struct CredentialStore {
    pub data_dir: path::PathBuf,
}

impl Default for CredentialStore {
    fn default() -> CredentialStore {
        let dir = Config::get(ConfigKey::DataDir);
        if !dir.is_empty() {
            return CredentialStore::new(path::PathBuf::from(dir));
        }

        return CredentialStore::new(dirs::data_dir().unwrap().join("chores"));
    }
}

impl CredentialStore {
    pub fn new(data_dir: path::PathBuf) -> CredentialStore {
        return CredentialStore { data_dir };
    }

    fn credential_path(&self) -> path::PathBuf {
        return self.data_dir.join(CREDENTIAL_FILE);
    }

    fn profile_path(&self) -> path::PathBuf {
        return self.data_dir.join(PROFILE_FILE);
    }

    /// Returns the stored credential and profile, or nothing if either entry
    /// is missing or unreadable. A half-present session is as good as none.
    pub async fn load(&self) -> Result<Option<(String, Profile)>> {
        let credential_path = self.credential_path();
        let profile_path = self.profile_path();
        if !credential_path.exists() || !profile_path.exists() {
            return Ok(None);
        }

        let credential = fs::read_to_string(credential_path).await?.trim().to_string();
        if credential.is_empty() {
            return Ok(None);
        }

        let payload = fs::read_to_string(profile_path).await?;
        match serde_json::from_str::<Profile>(&payload) {
            Ok(profile) => return Ok(Some((credential, profile))),
            Err(err) => {
                tracing::warn!(error = ?err, "Stored profile is malformed, ignoring session");
                return Ok(None);
            }
        }
    }

    pub async fn save(&self, credential: &str, profile: &Profile) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir).await?;
        }

        let mut file = fs::File::create(self.credential_path()).await?;
        file.write_all(credential.as_bytes()).await?;

        let payload = serde_json::to_string(profile)?;
        let mut file = fs::File::create(self.profile_path()).await?;
        file.write_all(payload.as_bytes()).await?;

        return Ok(());
    }

    pub async fn clear(&self) -> Result<()> {
        for file_path in [self.credential_path(), self.profile_path()] {
            if file_path.exists() {
                fs::remove_file(file_path).await?;
            }
        }

        return Ok(());
    }
}
