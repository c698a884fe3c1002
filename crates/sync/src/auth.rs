//! Session state and the authentication oracle.
//!
//! The engine never initiates authentication. It consults the oracle
//! before every remote call and stays fully local when the answer is no.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Answers "is there a signed-in customer right now?".
///
/// Must be cheap and non-blocking; the engine asks on every operation.
pub trait AuthOracle: Send + Sync {
    fn has_valid_session(&self) -> bool;
}

/// A customer session as handed over by the authentication layer.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct Session {
    /// Bearer token attached to every authenticated API request.
    pub access_token: SecretString,
    /// Expiry instant; `None` means the token does not expire client-side.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub fn new(access_token: SecretString, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token,
            expires_at,
        }
    }

    /// True while the token has not expired.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > Utc::now())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Holds the current session, if any.
///
/// Shared between the authentication layer (writes) and the engine and
/// API client (reads). An expired session reads as signed out without
/// anyone having to clear it.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: RwLock<Option<Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session. The caller then triggers the login merge.
    pub fn set_session(&self, session: Session) {
        if let Ok(mut guard) = self.session.write() {
            *guard = Some(session);
        }
    }

    /// Drop the session: back to guest mode.
    pub fn clear_session(&self) {
        if let Ok(mut guard) = self.session.write() {
            *guard = None;
        }
    }

    /// The bearer token of a currently valid session.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.session.read().ok().and_then(|guard| {
            guard
                .as_ref()
                .filter(|session| session.is_valid())
                .map(|session| session.access_token.expose_secret().to_owned())
        })
    }
}

impl AuthOracle for SessionStore {
    fn has_valid_session(&self) -> bool {
        self.session.read().ok().is_some_and(|guard| guard.as_ref().is_some_and(Session::is_valid))
    }
}
