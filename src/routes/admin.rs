use crate::{AppState, handlers::admin};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// The back office, nested under `/admin`. `create_router` puts the role gate in
/// front of the whole router; the backend re-checks every call regardless.
///
/// `upload_limit` replaces axum's default body limit on the asset routes only.
pub fn admin_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        // --- Categories ---
        // POST /categories/{id} updates; the backend uses POST for edits.
        .route(
            "/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route("/categories/{id}", post(admin::update_category))
        .route(
            "/categories/{id}/active-status",
            put(admin::set_category_active),
        )
        // --- Products ---
        .route("/products", get(admin::list_products))
        .route("/products/{id}", get(admin::product_detail))
        // Multipart field `file`.
        .route(
            "/products/{id}/assets",
            post(admin::upload_asset).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/products/{id}/assets/{asset_id}",
            put(admin::replace_asset)
                .delete(admin::delete_asset)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
}
