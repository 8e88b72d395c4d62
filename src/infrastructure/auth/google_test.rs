use anyhow::Result;
use serde_json::json;
use tokio::sync::mpsc;

use super::GoogleAuth;
use crate::domain::models::Event;
use crate::domain::models::IdentityProvider;

impl GoogleAuth {
    fn with_urls(url: String) -> GoogleAuth {
        return GoogleAuth {
            auth_url: url.clone(),
            userinfo_url: format!("{url}/userinfo"),
            client_id: "test-client".to_string(),
        };
    }
}

#[tokio::test]
async fn it_obtains_a_token_once_approved() -> Result<()> {
    let mut server = mockito::Server::new();
    let device_mock = server
        .mock("POST", "/device/code")
        .with_status(200)
        .with_body(
            json!({
                "device_code": "dev-123",
                "user_code": "ABCD-EFGH",
                "verification_url": "https://www.google.com/device",
                "expires_in": 300,
                "interval": 0,
            })
            .to_string(),
        )
        .create();
    let token_mock = server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(json!({"access_token": "google-token"}).to_string())
        .create();

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let auth = GoogleAuth::with_urls(server.url());
    let token = auth.obtain_access_token(&tx).await?;

    device_mock.assert();
    token_mock.assert();
    assert_eq!(token, "google-token");

    match rx.recv().await.unwrap() {
        Event::LoginPrompt(prompt) => {
            assert_eq!(prompt.user_code, "ABCD-EFGH");
            assert_eq!(prompt.verification_url, "https://www.google.com/device");
        }
        event => panic!("unexpected event: {event:?}"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_fails_when_the_user_declines() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/device/code")
        .with_status(200)
        .with_body(
            json!({
                "device_code": "dev-123",
                "user_code": "ABCD-EFGH",
                "verification_url": "https://www.google.com/device",
                "expires_in": 300,
                "interval": 0,
            })
            .to_string(),
        )
        .create();
    server
        .mock("POST", "/token")
        .with_status(403)
        .with_body(json!({"error": "access_denied"}).to_string())
        .create();

    let (tx, _rx) = mpsc::unbounded_channel::<Event>();

    let auth = GoogleAuth::with_urls(server.url());
    let err = auth.obtain_access_token(&tx).await.unwrap_err();

    assert_eq!(err.to_string(), "the sign-in request was declined");
}

#[tokio::test]
async fn it_fails_when_the_code_expires() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/device/code")
        .with_status(200)
        .with_body(
            json!({
                "device_code": "dev-123",
                "user_code": "ABCD-EFGH",
                "verification_url": "https://www.google.com/device",
                "expires_in": 300,
                "interval": 0,
            })
            .to_string(),
        )
        .create();
    server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(json!({"error": "expired_token"}).to_string())
        .create();

    let (tx, _rx) = mpsc::unbounded_channel::<Event>();

    let auth = GoogleAuth::with_urls(server.url());
    let err = auth.obtain_access_token(&tx).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "the sign-in code expired before it was approved"
    );
}

#[tokio::test]
async fn it_fetches_the_userinfo_preview() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/userinfo")
        .match_header("Authorization", "Bearer google-token")
        .with_status(200)
        .with_body(
            json!({
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "picture": "https://example.com/ada.png",
            })
            .to_string(),
        )
        .create();

    let auth = GoogleAuth::with_urls(server.url());
    let profile = auth.userinfo("google-token").await?;
    mock.assert();

    assert_eq!(profile.name, "Ada Lovelace");
    assert_eq!(profile.email, "ada@example.com");

    return Ok(());
}
