#[cfg(test)]
#[path = "google_test.rs"]
mod tests;

use std::time::Duration;
use std::time::Instant;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Event;
use crate::domain::models::IdentityProvider;
use crate::domain::models::LoginPrompt;
use crate::domain::models::Profile;

const DEVICE_SCOPE: &str = "openid email profile";
const DEVICE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_url: String,
    expires_in: u64,
    interval: u64,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct TokenPollResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// Google's OAuth device authorization flow. The user approves the sign-in on
/// a second screen while this end polls the token endpoint until Google hands
/// over an access token.
pub struct GoogleAuth {
    auth_url: String,
    userinfo_url: String,
    client_id: String,
}

impl Default for GoogleAuth {
    fn default() -> GoogleAuth {
        return GoogleAuth {
            auth_url: Config::get(ConfigKey::GoogleAuthURL),
            userinfo_url: Config::get(ConfigKey::GoogleUserinfoURL),
            client_id: Config::get(ConfigKey::GoogleClientId),
        };
    }
}

#[async_trait]
impl IdentityProvider for GoogleAuth {
    #[allow(clippy::implicit_return)]
    async fn obtain_access_token<'a>(
        &self,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String> {
        let device = reqwest::Client::new()
            .post(format!("{url}/device/code", url = self.auth_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", DEVICE_SCOPE),
            ])
            .send()
            .await?
            .json::<DeviceCodeResponse>()
            .await?;

        tracing::info!(user_code = device.user_code, "device sign-in started");
        tx.send(Event::LoginPrompt(LoginPrompt {
            verification_url: device.verification_url.clone(),
            user_code: device.user_code.clone(),
        }))?;

        let deadline = Instant::now() + Duration::from_secs(device.expires_in);
        let mut interval = device.interval;

        loop {
            if Instant::now() >= deadline {
                bail!("the sign-in code expired before it was approved");
            }

            tokio::time::sleep(Duration::from_secs(interval)).await;

            let poll = reqwest::Client::new()
                .post(format!("{url}/token", url = self.auth_url))
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("device_code", device.device_code.as_str()),
                    ("grant_type", DEVICE_GRANT),
                ])
                .send()
                .await?
                .json::<TokenPollResponse>()
                .await?;

            if let Some(token) = poll.access_token {
                tracing::info!("device sign-in approved");
                return Ok(token);
            }

            match poll.error.as_deref() {
                Some("authorization_pending") => {
                    continue;
                }
                Some("slow_down") => {
                    interval += 5;
                }
                Some("access_denied") => {
                    bail!("the sign-in request was declined");
                }
                Some("expired_token") => {
                    bail!("the sign-in code expired before it was approved");
                }
                Some(other) => {
                    bail!("Google returned an unexpected error: {other}");
                }
                None => {
                    bail!("Google returned an unexpected response");
                }
            }
        }
    }

    #[allow(clippy::implicit_return)]
    async fn userinfo(&self, access_token: &str) -> Result<Profile> {
        let res = reqwest::Client::new()
            .get(&self.userinfo_url)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Google userinfo request failed"
            );
            bail!("could not fetch the Google profile");
        }

        return Ok(res.json::<Profile>().await?);
    }
}
