//! Shared error types for the services crate.

use thiserror::Error;

use course_core::navigation::NavigationError;
use storage::repository::StorageError;

/// Errors emitted by auth providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("auth provider rejected the request: {0}")]
    Provider(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("stored session is unreadable: {0}")]
    Session(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Text shown in the sign-in form. Provider text is passed through;
    /// transport and storage failures get a generic retry hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidEmail
            | AuthError::PasswordTooShort { .. }
            | AuthError::InvalidCredentials
            | AuthError::EmailTaken => self.to_string(),
            AuthError::Provider(message) if !message.trim().is_empty() => message.clone(),
            _ => "Something went wrong, please try again.".to_owned(),
        }
    }
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CourseController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("no lesson is open")]
    NoLessonOpen,
    #[error("unknown module")]
    UnknownModule,
    #[error("unknown lesson")]
    UnknownLesson,
    #[error("quizzes for the open lesson are still loading")]
    QuizzesLoading,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
