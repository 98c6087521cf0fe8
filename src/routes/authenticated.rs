use crate::{AppState, handlers::account};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Screens for any signed-in user. `create_router` wraps this router in the
/// login-only access gate, so handlers can rely on `AuthSession`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /events/mine
        // The user's event registrations.
        .route("/events/mine", get(account::my_events))
        // --- Chat support ---
        .route("/chat", get(account::chat_list))
        .route("/chat/{id}", get(account::chat_detail))
        // POST /chat/{id}/messages
        // Responds after the typing delay with the canned support reply.
        .route("/chat/{id}/messages", post(account::chat_send))
}
