//! Screen handlers, grouped by access tier.
//!
//! Every handler follows the same shape: read the session, call the backend,
//! wrap the result in a `PageView`. Backend failures surface as `AppError`.

use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::gate::NOTICE_COOKIE;

pub mod account;
pub mod admin;
pub mod auth;
pub mod storefront;

/// Reads and clears the one-shot notice left by a redirect.
pub(crate) fn take_notice(jar: CookieJar) -> (CookieJar, Option<String>) {
    match jar.get(NOTICE_COOKIE).map(|c| c.value().to_string()) {
        Some(notice) => {
            let removal = Cookie::build((NOTICE_COOKIE, "")).path("/").build();
            (jar.remove(removal), Some(notice).filter(|n| !n.is_empty()))
        }
        None => (jar, None),
    }
}
