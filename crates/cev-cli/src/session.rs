//! Session gate
//!
//! The gate is the only writer of the current identity. Everything else reads
//! it through [`SessionGate::state`] / [`SessionGate::user`].
//!
//! ```text
//! Checking ──check──▶ Authenticated(user) ──logout──▶ Unauthenticated
//!     └──────check──▶ Unauthenticated ──login/register──▶ Authenticated(user)
//! ```

use crate::api::{DatasetApi, LoginRequest, RegisterRequest};
use crate::error::{CliError, Result};
use cev_common::types::User;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registration passwords shorter than this are refused before sending.
pub const MIN_PASSWORD_LEN: usize = 8;

pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Checking,
    Authenticated(User),
    Unauthenticated,
}

pub struct SessionGate {
    api: Arc<dyn DatasetApi>,
    state: SessionState,
}

impl SessionGate {
    pub fn new(api: Arc<dyn DatasetApi>) -> Self {
        Self {
            api,
            state: SessionState::Checking,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// The one identity check. Any failure leaves the gate unauthenticated.
    pub async fn check(&mut self) -> Result<&SessionState> {
        if self.state != SessionState::Checking {
            return Err(CliError::InvalidTransition("Identity check has already run"));
        }

        self.state = match self.api.current_user().await {
            Ok(user) => {
                debug!(username = %user.username, "Session is valid");
                SessionState::Authenticated(user)
            },
            Err(e) => {
                debug!(error = %e, "No valid session");
                SessionState::Unauthenticated
            },
        };

        Ok(&self.state)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<User> {
        self.require_unauthenticated()?;
        if username.trim().is_empty() || password.is_empty() {
            return Err(CliError::validation("Please enter your username and password"));
        }

        let credentials = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let user = self.api.login(&credentials).await?;
        Ok(self.enter(user))
    }

    /// Register, then log in with the same credentials.
    ///
    /// If the automatic login fails its message is returned as
    /// [`CliError::Failed`] and the gate stays unauthenticated, even though
    /// the account now exists.
    pub async fn register(&mut self, profile: &RegisterRequest) -> Result<User> {
        self.require_unauthenticated()?;
        validate_registration(profile)?;

        self.api.register(profile).await?;
        info!(username = %profile.username, "Registration accepted, logging in");

        match self.api.login(&profile.credentials()).await {
            Ok(user) => Ok(self.enter(user)),
            Err(e) => {
                warn!(error = %e, username = %profile.username, "Login after registration failed");
                Err(CliError::Failed {
                    message: format!(
                        "Account created, but logging in failed: {}",
                        e.user_message(LOGIN_FAILED)
                    ),
                    source: Some(Box::new(e)),
                })
            },
        }
    }

    /// Always ends unauthenticated; a failed remote call is only logged.
    pub async fn logout(&mut self) {
        if self.is_authenticated() {
            if let Err(e) = self.api.logout().await {
                warn!(error = %e, "Logout request failed, clearing session locally");
            }
        }
        self.state = SessionState::Unauthenticated;
    }

    fn require_unauthenticated(&self) -> Result<()> {
        match self.state {
            SessionState::Unauthenticated => Ok(()),
            SessionState::Authenticated(_) => Err(CliError::InvalidTransition("Already logged in")),
            SessionState::Checking => Err(CliError::InvalidTransition("Identity check has not finished")),
        }
    }

    fn enter(&mut self, user: User) -> User {
        info!(username = %user.username, "Authenticated");
        self.state = SessionState::Authenticated(user.clone());
        user
    }
}

/// Checks made before a registration request is sent.
pub fn validate_registration(profile: &RegisterRequest) -> Result<()> {
    if profile.username.trim().is_empty() {
        return Err(CliError::validation("Username is required"));
    }
    if profile.email.trim().is_empty() {
        return Err(CliError::validation("Email is required"));
    }
    if profile.password != profile.password_confirm {
        return Err(CliError::validation("Passwords do not match"));
    }
    if profile.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CliError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
