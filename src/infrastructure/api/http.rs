#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Api;
use crate::domain::models::ApiError;
use crate::domain::models::AuthExchange;
use crate::domain::models::Task;
use crate::domain::models::TaskDraft;

fn malformed(err: reqwest::Error) -> ApiError {
    tracing::error!(error = ?err, "Task server response could not be decoded");
    return ApiError::Malformed;
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
struct ExchangeRequest {
    token: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
struct UpdateRequest {
    title: String,
    completed: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct ErrorResponse {
    error: String,
}

pub struct HttpApi {
    url: String,
    timeout: String,
}

impl Default for HttpApi {
    fn default() -> HttpApi {
        return HttpApi {
            url: Config::get(ConfigKey::ApiURL),
            timeout: Config::get(ConfigKey::RequestTimeout),
        };
    }
}

impl HttpApi {
    fn timeout(&self) -> Duration {
        return Duration::from_millis(self.timeout.parse::<u64>().unwrap_or(10_000));
    }

    /// Maps transport failures and non-success statuses to the error
    /// taxonomy. A 401 is kept distinct so callers can route it to session
    /// teardown instead of the generic error slot.
    async fn check(
        res: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<reqwest::Response, ApiError> {
        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Task server is not reachable");
                return Err(ApiError::Unreachable);
            }
        };

        let status = res.status().as_u16();
        if status == 401 {
            tracing::info!("Task server rejected the credential");
            return Err(ApiError::Unauthorized);
        }

        if !res.status().is_success() {
            tracing::error!(status = status, "Task server rejected the request");
            if let Ok(body) = res.json::<ErrorResponse>().await {
                return Err(ApiError::Rejected(body.error));
            }

            return Err(ApiError::Rejected(format!(
                "request failed with status {status}"
            )));
        }

        return Ok(res);
    }
}

#[async_trait]
impl Api for HttpApi {
    #[allow(clippy::implicit_return)]
    async fn exchange_google_token(&self, provider_token: &str) -> Result<AuthExchange, ApiError> {
        let req = ExchangeRequest {
            token: provider_token.to_string(),
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/auth/google/", url = self.url))
            .timeout(self.timeout())
            .json(&req)
            .send()
            .await;

        return HttpApi::check(res)
            .await?
            .json::<AuthExchange>()
            .await
            .map_err(malformed);
    }

    #[allow(clippy::implicit_return)]
    async fn list_tasks(&self, credential: &str) -> Result<Vec<Task>, ApiError> {
        let res = reqwest::Client::new()
            .get(format!("{url}/todos/", url = self.url))
            .header("Authorization", format!("Bearer {credential}"))
            .timeout(self.timeout())
            .send()
            .await;

        return HttpApi::check(res)
            .await?
            .json::<Vec<Task>>()
            .await
            .map_err(malformed);
    }

    #[allow(clippy::implicit_return)]
    async fn create_task(&self, credential: &str, draft: &TaskDraft) -> Result<Task, ApiError> {
        let res = reqwest::Client::new()
            .post(format!("{url}/todos/", url = self.url))
            .header("Authorization", format!("Bearer {credential}"))
            .timeout(self.timeout())
            .json(draft)
            .send()
            .await;

        return HttpApi::check(res)
            .await?
            .json::<Task>()
            .await
            .map_err(malformed);
    }

    #[allow(clippy::implicit_return)]
    async fn update_task(&self, credential: &str, task: &Task) -> Result<Task, ApiError> {
        let req = UpdateRequest {
            title: task.title.to_string(),
            completed: task.completed,
        };

        let res = reqwest::Client::new()
            .put(format!("{url}/todos/{id}/", url = self.url, id = task.id))
            .header("Authorization", format!("Bearer {credential}"))
            .timeout(self.timeout())
            .json(&req)
            .send()
            .await;

        return HttpApi::check(res)
            .await?
            .json::<Task>()
            .await
            .map_err(malformed);
    }

    #[allow(clippy::implicit_return)]
    async fn delete_task(&self, credential: &str, id: i64) -> Result<(), ApiError> {
        let res = reqwest::Client::new()
            .delete(format!("{url}/todos/{id}/", url = self.url, id = id))
            .header("Authorization", format!("Bearer {credential}"))
            .timeout(self.timeout())
            .send()
            .await;

        HttpApi::check(res).await?;
        return Ok(());
    }
}
