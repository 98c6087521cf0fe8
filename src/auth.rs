use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use std::convert::Infallible;

use crate::{
    error::AppError,
    session::{CookieStorage, SessionProvider, SessionRecord},
};

/// Reads the session record out of the request's cookies. Read-only, so the
/// `Secure` flag is irrelevant here.
fn session_from_parts(parts: &Parts) -> Option<SessionRecord> {
    let jar = CookieJar::from_headers(&parts.headers);
    SessionProvider::new(CookieStorage::new(jar, false)).get_session()
}

/// CurrentSession
///
/// The visitor's session, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<SessionRecord>);

impl CurrentSession {
    pub fn token(&self) -> Option<&str> {
        self.0.as_ref().map(|s| s.access_token.as_str())
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(session_from_parts(parts)))
    }
}

/// AuthSession
///
/// A session that must exist. Routes behind the access gate never see the
/// rejection; it only fires when a handler is mounted without the gate.
///
/// Rejection: `AppError::Unauthorized` (401).
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionRecord);

impl AuthSession {
    pub fn token(&self) -> &str {
        &self.0.access_token
    }

    /// Conversation owner key for the chat store.
    pub fn owner(&self) -> &str {
        let info = &self.0.user_info;
        if info.email.is_empty() {
            &info.user_id
        } else {
            &info.email
        }
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_from_parts(parts)
            .map(AuthSession)
            .ok_or(AppError::Unauthorized)
    }
}
