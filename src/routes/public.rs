use crate::{AppState, handlers::{auth, storefront}};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Screens and auth endpoints open to every visitor. Handlers still read the
/// session when present, so signed-in users get their token forwarded.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Landing page; consumes the notice left by an access-gate denial.
        .route("/", get(storefront::home))
        // GET /shop?page=&size=&category=&status=&search=&sort=
        .route("/shop", get(storefront::shop))
        .route("/shop/{id}", get(storefront::product_detail))
        // GET /events?page=&size=&search=
        .route("/events", get(storefront::events))
        // GET /login?redirect=...
        // The access gate sends anonymous visitors here with the requested path.
        .route("/login", get(storefront::login_page))
        .route("/register", get(storefront::register_page))
        .route("/account/session", get(storefront::account_session))
        // --- Auth (forwarded to the backend after local validation) ---
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/resend-otp", post(auth::resend_otp))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
}
