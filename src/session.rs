use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffUser {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl StaffUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no staff member is signed in")]
    NotSignedIn,
    #[error("sign-out failed: {0}")]
    SignOutFailed(String),
}

/// Authentication collaborator handed to the staff console.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<StaffUser>;

    async fn sign_out(&self) -> Result<(), SessionError>;
}

/// Session held in memory: starts with an optional user and forgets it on
/// sign-out.
#[derive(Debug, Default)]
pub struct StaticSession {
    user: Mutex<Option<StaffUser>>,
}

impl StaticSession {
    pub fn signed_in(user: StaffUser) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: StaffUser) {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<StaffUser> {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        let previous = self
            .user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match previous {
            Some(user) => {
                tracing::info!(target: "console", uid = %user.uid, "staff_signed_out");
                Ok(())
            }
            None => Err(SessionError::NotSignedIn),
        }
    }
}
