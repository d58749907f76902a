//! Sign-up, sign-in and session tracking.
//!
//! Two providers implement [`AuthProvider`]: [`LocalAuthProvider`] keeps
//! accounts in the local database, [`RestAuthProvider`] talks to a hosted
//! auth endpoint. Both persist the active session in the local store so a
//! restart restores it, and both publish session changes on a `watch`
//! channel.

use std::sync::Arc;

use async_trait::async_trait;
use course_core::model::Account;
use serde::{Deserialize, Serialize};
use storage::repository::LocalStore;
use tokio::sync::watch;

use crate::error::AuthError;

mod local;
mod rest;

pub use local::LocalAuthProvider;
pub use rest::RestAuthProvider;

/// Local store key holding the serialized active session.
pub const SESSION_KEY: &str = "auth_session";

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account: Account,
    pub access_token: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The session restored from the last run or established since.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the persisted session cannot be read.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Registers an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` for invalid input or a provider rejection.
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` or a provider rejection.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError` if the session cannot be dropped from storage.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Session change notifications: `Some` after sign-in, `None` after
    /// sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

/// Holds the active session, mirrors it into the local store and notifies
/// subscribers.
pub(crate) struct SessionSlot {
    local: Arc<dyn LocalStore>,
    sender: watch::Sender<Option<Session>>,
}

impl SessionSlot {
    pub(crate) fn new(local: Arc<dyn LocalStore>) -> Self {
        let (sender, _) = watch::channel(None);
        Self { local, sender }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    /// Reads the persisted session and syncs the channel with it.
    pub(crate) async fn load(&self) -> Result<Option<Session>, AuthError> {
        let session = match self.local.get(SESSION_KEY).await? {
            Some(raw) => Some(
                serde_json::from_str::<Session>(&raw)
                    .map_err(|e| AuthError::Session(e.to_string()))?,
            ),
            None => None,
        };
        self.sender.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                current.clone_from(&session);
                true
            }
        });
        Ok(session)
    }

    pub(crate) async fn publish(&self, session: Option<Session>) -> Result<(), AuthError> {
        match &session {
            Some(session) => {
                let raw = serde_json::to_string(session)
                    .map_err(|e| AuthError::Session(e.to_string()))?;
                self.local.set(SESSION_KEY, &raw).await?;
            }
            None => self.local.remove(SESSION_KEY).await?,
        }
        self.sender.send_replace(session);
        Ok(())
    }
}

/// Trims and lowercases the email and enforces the password minimum.
pub(crate) fn validate_credentials(email: &str, password: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(user, domain)| {
            !user.is_empty() && !domain.is_empty() && !domain.contains('@')
        })
        && !email.contains(char::is_whitespace);
    if !valid {
        return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(email)
}
