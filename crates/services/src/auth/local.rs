use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use course_core::Clock;
use course_core::model::{Account, UserId};
use rand::Rng;
use rand::distr::Alphanumeric;
use storage::repository::{AccountRecord, AccountRepository, LocalStore, StorageError};
use tokio::sync::watch;

use super::{AuthProvider, Session, SessionSlot, validate_credentials};
use crate::error::AuthError;

/// Accounts stored in the local database, passwords hashed with Argon2id.
pub struct LocalAuthProvider {
    clock: Clock,
    accounts: Arc<dyn AccountRepository>,
    hasher: Argon2<'static>,
    slot: SessionSlot,
}

impl LocalAuthProvider {
    #[must_use]
    pub fn new(
        clock: Clock,
        accounts: Arc<dyn AccountRepository>,
        local: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            clock,
            accounts,
            hasher: Argon2::default(),
            slot: SessionSlot::new(local),
        }
    }

    /// Swaps in cheap hashing parameters. For tests only; hashes produced
    /// this way still verify under the default hasher.
    #[must_use]
    pub fn with_low_cost_hashing(mut self) -> Self {
        if let Ok(params) = Params::new(Params::MIN_M_COST, 1, 1, None) {
            self.hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        }
        self
    }

    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(self
            .hasher
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

fn session_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        self.slot.load().await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = validate_credentials(email, password)?;
        let record = AccountRecord {
            id: UserId::generate(),
            email,
            password_hash: self.hash(password)?,
            created_at: self.clock.now(),
        };
        match self.accounts.insert_account(&record).await {
            Ok(()) => {
                tracing::info!(user_id = %record.id, "account created");
                Ok(())
            }
            Err(StorageError::Conflict) => Err(AuthError::EmailTaken),
            Err(err) => Err(err.into()),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_lowercase();
        let record = self
            .accounts
            .find_account_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.verify(password, &record.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            account: Account {
                id: record.id,
                email: Some(record.email),
            },
            access_token: session_token(),
        };
        self.slot.publish(Some(session.clone())).await?;
        tracing::info!(user_id = %session.account.id, "signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
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
    use course_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn provider(repo: &InMemoryRepository) -> LocalAuthProvider {
        LocalAuthProvider::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
        .with_low_cost_hashing()
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let repo = InMemoryRepository::new();
        let auth = provider(&repo);

        auth.sign_up("ada@example.com", "secret1").await.unwrap();
        assert_eq!(auth.current_session().await.unwrap(), None);

        let session = auth.sign_in("ADA@example.com ", "secret1").await.unwrap();
        assert_eq!(session.account.email.as_deref(), Some("ada@example.com"));
        assert_eq!(session.access_token.len(), 32);
        assert_eq!(auth.current_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_rejected() {
        let repo = InMemoryRepository::new();
        let auth = provider(&repo);
        auth.sign_up("ada@example.com", "secret1").await.unwrap();

        assert!(matches!(
            auth.sign_in("ada@example.com", "wrong-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("bob@example.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert_eq!(auth.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_sign_up_reports_email_taken() {
        let repo = InMemoryRepository::new();
        let auth = provider(&repo);
        auth.sign_up("ada@example.com", "secret1").await.unwrap();
        let err = auth.sign_up("Ada@example.com", "another1").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn session_survives_restart_until_sign_out() {
        let repo = InMemoryRepository::new();
        let auth = provider(&repo);
        auth.sign_up("ada@example.com", "secret1").await.unwrap();
        let session = auth.sign_in("ada@example.com", "secret1").await.unwrap();

        let restarted = provider(&repo);
        assert_eq!(restarted.current_session().await.unwrap(), Some(session));

        restarted.sign_out().await.unwrap();
        assert_eq!(auth.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn subscribers_see_sign_in_and_out() {
        let repo = InMemoryRepository::new();
        let auth = provider(&repo);
        let mut rx = auth.subscribe();
        auth.sign_up("ada@example.com", "secret1").await.unwrap();

        auth.sign_in("ada@example.com", "secret1").await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());

        auth.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}
