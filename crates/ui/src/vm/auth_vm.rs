use services::{AuthError, ControllerError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign in",
            AuthMode::SignUp => "Create account",
        }
    }

    #[must_use]
    pub fn subtitle(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Pick up where you left off",
            AuthMode::SignUp => "Keep your course progress",
        }
    }

    #[must_use]
    pub fn toggle_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "No account yet? Create one",
            AuthMode::SignUp => "Already have an account? Sign in",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

/// Message shown above the submit button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthNotice {
    Error(String),
    Success(String),
}

impl AuthNotice {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            AuthNotice::Error(text) | AuthNotice::Success(text) => text,
        }
    }

    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            AuthNotice::Error(_) => "auth-notice auth-notice--error",
            AuthNotice::Success(_) => "auth-notice auth-notice--success",
        }
    }
}

#[must_use]
pub fn sign_up_notice() -> AuthNotice {
    AuthNotice::Success("Account created! Sign in to continue.".to_owned())
}

#[must_use]
pub fn auth_failure_notice(err: &ControllerError) -> AuthNotice {
    let text = match err {
        ControllerError::Auth(err) => err.user_message(),
        _ => AuthError::Provider(String::new()).user_message(),
    };
    AuthNotice::Error(text)
}

/// Both fields are required before the form can be sent; the provider
/// checks the rest.
#[must_use]
pub fn can_submit_credentials(email: &str, password: &str) -> bool {
    !email.trim().is_empty() && !password.is_empty()
}
