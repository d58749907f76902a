use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;

/// An authenticated account as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub email: Option<String>,
}

/// The key progress is recorded under.
///
/// Exactly one identity is active at a time. Progress never carries over
/// between identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Account(Account),
    Anonymous(UserId),
}

impl Identity {
    #[must_use]
    pub fn user_id(&self) -> UserId {
        match self {
            Identity::Account(account) => account.id,
            Identity::Anonymous(id) => *id,
        }
    }

    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        match self {
            Identity::Account(account) => Some(account),
            Identity::Anonymous(_) => None,
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous(_))
    }
}
