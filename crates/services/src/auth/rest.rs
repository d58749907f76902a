use std::sync::Arc;

use async_trait::async_trait;
use course_core::model::{Account, UserId};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use storage::repository::LocalStore;
use storage::rest::{AccessToken, RestConfig};
use tokio::sync::watch;

use super::{AuthProvider, Session, SessionSlot, validate_credentials};
use crate::error::AuthError;

/// Hosted auth endpoint (`/auth/v1/...`). The access token of the active
/// session is shared with the data adapter through `AccessToken`.
pub struct RestAuthProvider {
    client: Client,
    config: RestConfig,
    token: AccessToken,
    slot: SessionSlot,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
}

impl From<TokenResponse> for Session {
    fn from(body: TokenResponse) -> Self {
        Session {
            account: Account {
                id: body.user.id,
                email: body.user.email,
            },
            access_token: body.access_token,
        }
    }
}

/// Pulls a human-readable message out of an auth error body.
fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}

async fn check(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = provider_message(&body).unwrap_or_else(|| format!("request failed ({status})"));
    Err(AuthError::Provider(message))
}

impl RestAuthProvider {
    #[must_use]
    pub fn new(config: RestConfig, token: AccessToken, local: Arc<dyn LocalStore>) -> Self {
        Self {
            client: Client::new(),
            config,
            token,
            slot: SessionSlot::new(local),
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.config.endpoint(path))
            .header("apikey", &self.config.anon_key)
    }
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let session = self.slot.load().await?;
        self.token
            .set(session.as_ref().map(|s| s.access_token.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = validate_credentials(email, password)?;
        let response = self
            .post("auth/v1/signup")
            .json(&Credentials {
                email: &email,
                password,
            })
            .send()
            .await?;
        check(response).await?;
        tracing::info!("sign-up accepted by backend");
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_lowercase();
        let response = self
            .post("auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&Credentials {
                email: &email,
                password,
            })
            .send()
            .await?;
        let body: TokenResponse = check(response).await?.json().await?;
        let session = Session::from(body);

        self.token.set(Some(session.access_token.clone()));
        self.slot.publish(Some(session.clone())).await?;
        tracing::info!(user_id = %session.account.id, "signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(token) = self.token.get() {
            let result = self.post("auth/v1/logout").bearer_auth(token).send().await;
            match result {
                Ok(response) => {
                    if let Err(err) = check(response).await {
                        tracing::warn!(error = %err, "backend logout failed");
                    }
                }
                Err(err) => tracing::warn!(error = %err, "backend logout failed"),
            }
        }
        self.token.set(None);
        self.slot.publish(None).await?;
        tracing::info!("signed out");
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.slot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    #[test]
    fn provider_message_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            provider_message(body).as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(
            provider_message(r#"{"code":422,"msg":"User already registered"}"#).as_deref(),
            Some("User already registered")
        );
        assert_eq!(provider_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn token_response_maps_to_session() {
        let id = UserId::generate();
        let body = format!(
            r#"{{"access_token":"jwt","token_type":"bearer","user":{{"id":"{id}","email":"ada@example.com"}}}}"#
        );
        let parsed: TokenResponse = serde_json::from_str(&body).unwrap();
        let session = Session::from(parsed);
        assert_eq!(session.account.id, id);
        assert_eq!(session.access_token, "jwt");
    }

    #[tokio::test]
    async fn restored_session_installs_access_token() {
        let local: Arc<dyn LocalStore> = Arc::new(InMemoryRepository::new());
        let session = Session {
            account: Account {
                id: UserId::generate(),
                email: None,
            },
            access_token: "saved-jwt".into(),
        };
        local
            .set(crate::auth::SESSION_KEY, &serde_json::to_string(&session).unwrap())
            .await
            .unwrap();

        let token = AccessToken::new();
        let auth = RestAuthProvider::new(
            RestConfig::new("http://127.0.0.1:9", "anon"),
            token.clone(),
            local,
        );
        assert_eq!(auth.current_session().await.unwrap(), Some(session));
        assert_eq!(token.get().as_deref(), Some("saved-jwt"));
    }

    #[tokio::test]
    async fn sign_up_validates_before_any_request() {
        let auth = RestAuthProvider::new(
            RestConfig::new("http://127.0.0.1:9", "anon"),
            AccessToken::new(),
            Arc::new(InMemoryRepository::new()),
        );
        assert!(matches!(
            auth.sign_up("ada@example.com", "123").await,
            Err(AuthError::PasswordTooShort { .. })
        ));
    }
}
