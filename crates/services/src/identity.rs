//! Picks the user id progress is recorded under: the signed-in account, or
//! an anonymous id kept in the local store.

use std::sync::{Arc, Mutex};

use course_core::model::{Identity, UserId};
use storage::repository::LocalStore;

use crate::auth::{AuthProvider, Session};

/// Local store key of the anonymous identifier.
pub const ANONYMOUS_ID_KEY: &str = "temp_user_id";

pub struct IdentityResolver {
    auth: Arc<dyn AuthProvider>,
    local: Arc<dyn LocalStore>,
    anonymous: Mutex<Option<UserId>>,
    current: Mutex<Option<Identity>>,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthProvider>, local: Arc<dyn LocalStore>) -> Self {
        Self {
            auth,
            local,
            anonymous: Mutex::new(None),
            current: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// Resolves the identity at launch. A failed session lookup counts as
    /// no session.
    pub async fn startup(&self) -> Identity {
        let session = match self.auth.current_session().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "session lookup failed, continuing anonymously");
                None
            }
        };
        self.resolve(session.as_ref()).await
    }

    /// Session present: the account. Absent: the anonymous id, created on
    /// first use.
    pub async fn resolve(&self, session: Option<&Session>) -> Identity {
        let identity = match session {
            Some(session) => Identity::Account(session.account.clone()),
            None => Identity::Anonymous(self.anonymous_id().await),
        };

        let previous = self
            .current
            .lock()
            .ok()
            .and_then(|mut current| current.replace(identity.clone()));
        if previous.as_ref().map(Identity::user_id) != Some(identity.user_id()) {
            tracing::info!(
                user_id = %identity.user_id(),
                anonymous = identity.is_anonymous(),
                "active identity changed"
            );
        }
        identity
    }

    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    /// The anonymous id, read from the local store or generated and
    /// persisted once. Kept in memory after the first lookup.
    pub async fn anonymous_id(&self) -> UserId {
        if let Some(id) = self.anonymous.lock().ok().and_then(|cached| *cached) {
            return id;
        }

        let stored = match self.local.get(ANONYMOUS_ID_KEY).await {
            Ok(raw) => raw.and_then(|raw| raw.parse::<UserId>().ok()),
            Err(err) => {
                tracing::warn!(error = %err, "reading anonymous id failed");
                None
            }
        };
        let id = match stored {
            Some(id) => id,
            None => {
                let id = UserId::generate();
                if let Err(err) = self.local.set(ANONYMOUS_ID_KEY, &id.to_string()).await {
                    tracing::warn!(error = %err, "persisting anonymous id failed");
                }
                tracing::debug!(user_id = %id, "generated anonymous id");
                id
            }
        };

        if let Ok(mut cached) = self.anonymous.lock() {
            *cached.get_or_insert(id)
        } else {
            id
        }
    }
}
