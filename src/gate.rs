use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    roles::RoleSet,
    session::{CookieStorage, SessionProvider, SessionRecord},
    token,
};

/// Message attached to the home redirect when a signed-in user lacks the role.
pub const ACCESS_DENIED_MESSAGE: &str = "Bạn không có quyền truy cập trang này";

/// Cookie carrying a one-shot notice to the next page view.
pub const NOTICE_COOKIE: &str = "notice";

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// What a protected subtree demands of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    /// Any signed-in user.
    Authenticated,
    /// A signed-in user holding at least one of these roles.
    AnyRole(RoleSet),
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Render,
    RedirectToLogin { from: String },
    Deny { redirect_to: String, message: String },
}

/// AccessGate
///
/// Client-side route guard. Advisory only: it decides what to render, while the
/// backend re-checks every call it receives.
#[derive(Debug, Clone)]
pub struct AccessGate {
    prefix: String,
    requirement: Requirement,
    enforce_token_expiry: bool,
}

impl AccessGate {
    pub fn new(prefix: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            prefix: prefix.into(),
            requirement,
            enforce_token_expiry: false,
        }
    }

    /// Builds a role gate from configured role names. Names outside the closed role
    /// set are kept and match the same name case-insensitively; they are logged so
    /// a typo in the configuration is visible.
    pub fn for_roles<I, S>(prefix: impl Into<String>, role_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix = prefix.into();
        let (permitted, unknown) = RoleSet::from_names(role_names);
        for name in &unknown {
            tracing::warn!(role = %name, prefix = %prefix, "Unrecognized role in gate configuration; it only matches the same name");
        }
        Self::new(prefix, Requirement::AnyRole(permitted))
    }

    pub fn with_token_expiry(mut self, enforce: bool) -> Self {
        self.enforce_token_expiry = enforce;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Whether `path` (optionally carrying a query string) lies under this gate.
    pub fn guards(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or_default();
        if self.prefix == "/" {
            return true;
        }
        path == self.prefix
            || path
                .strip_prefix(self.prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn check(&self, path: &str, session: Option<&SessionRecord>) -> GateDecision {
        self.check_at(path, session, Utc::now())
    }

    pub fn check_at(
        &self,
        path: &str,
        session: Option<&SessionRecord>,
        now: DateTime<Utc>,
    ) -> GateDecision {
        if !self.guards(path) {
            return GateDecision::Render;
        }

        let session = session.filter(|s| {
            !(self.enforce_token_expiry && token::is_token_expired(&s.access_token, now))
        });

        let Some(session) = session else {
            return GateDecision::RedirectToLogin {
                from: path.to_string(),
            };
        };

        match &self.requirement {
            Requirement::Authenticated => GateDecision::Render,
            Requirement::AnyRole(permitted) => {
                let held = session.role_set();
                if !held.is_empty() && held.intersects(permitted) {
                    GateDecision::Render
                } else {
                    GateDecision::Deny {
                        redirect_to: HOME_PATH.to_string(),
                        message: ACCESS_DENIED_MESSAGE.to_string(),
                    }
                }
            }
        }
    }
}

/// `/login?redirect=<from>`, with `from` form-encoded.
pub fn login_location(from: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(from.as_bytes()).collect();
    format!("{LOGIN_PATH}?redirect={encoded}")
}

/// GateState
///
/// Middleware state: the gate plus the cookie flags the redirect responses need.
#[derive(Clone)]
pub struct GateState {
    pub gate: Arc<AccessGate>,
    pub secure_cookies: bool,
}

/// access_gate
///
/// Axum middleware running `AccessGate::check` for every request routed through it.
/// Redirects are `303 See Other`; a denial leaves its message in the `notice` cookie.
pub async fn access_gate(
    State(state): State<GateState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.clone())
        .unwrap_or_else(|| request.uri().clone());
    let path = path
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.path().to_string());

    let provider = SessionProvider::new(CookieStorage::new(jar.clone(), state.secure_cookies));
    let session = provider.get_session();

    match state.gate.check(&path, session.as_ref()) {
        GateDecision::Render => next.run(request).await,
        GateDecision::RedirectToLogin { from } => {
            tracing::info!(path = %from, "No session; redirecting to login");
            Redirect::to(&login_location(&from)).into_response()
        }
        GateDecision::Deny {
            redirect_to,
            message,
        } => {
            tracing::info!(
                path = %path,
                email = session.as_ref().map(|s| s.user_info.email.as_str()).unwrap_or_default(),
                "Role check failed; redirecting home"
            );
            let notice = Cookie::build((NOTICE_COOKIE, message))
                .path("/")
                .same_site(SameSite::Lax)
                .secure(state.secure_cookies)
                .build();
            (jar.add(notice), Redirect::to(&redirect_to)).into_response()
        }
    }
}
