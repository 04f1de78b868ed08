//! Admin sign-in and sessions

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AdminConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Admin login is not configured")]
    NotConfigured,

    #[error("session store unavailable")]
    Unavailable,
}

/// A signed-in admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Authentication provider
pub trait Authenticator: Send + Sync {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Session for a token, if it is still valid
    fn session(&self, token: &str) -> Option<Session>;

    fn sign_out(&self, token: &str);
}

/// Checks the configured admin credentials and keeps sessions in memory
pub struct LocalAuthenticator {
    email: String,
    password: String,
    sessions: RwLock<HashMap<String, Session>>,
}

impl LocalAuthenticator {
    pub fn new(config: &AdminConfig) -> Self {
        if config.email.is_empty() || config.password.is_empty() {
            tracing::warn!("Admin credentials are not configured; admin login is disabled");
        }
        Self {
            email: config.email.clone(),
            password: config.password.clone(),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Authenticator for LocalAuthenticator {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        if !email.trim().eq_ignore_ascii_case(&self.email) || password != self.password {
            tracing::info!("Rejected admin login for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            token: Uuid::new_v4().to_string(),
            email: self.email.clone(),
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .map_err(|_| AuthError::Unavailable)?
            .insert(session.token.clone(), session.clone());
        tracing::info!("Admin {} signed in", session.email);
        Ok(session)
    }

    fn session(&self, token: &str) -> Option<Session> {
        self.sessions.read().ok()?.get(token).cloned()
    }

    fn sign_out(&self, token: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(token);
        }
    }
}
