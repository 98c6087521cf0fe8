use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session, roles and the access gate.
pub mod auth;
pub mod gate;
pub mod roles;
pub mod session;
pub mod token;

// Backend access and the data it returns.
pub mod api;
pub mod models;

// Screen state and helpers.
pub mod chat;
pub mod dates;
pub mod listing;
pub mod validation;
pub mod views;

pub mod config;
pub mod error;
pub mod handlers;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use gate::{AccessGate, GateState, Requirement};
use routes::{ADMIN_PREFIX, admin, authenticated, public};

// --- Public Re-exports ---

pub use api::{ApiState, HttpStorefrontApi, StorefrontApi};
pub use chat::{ChatState, ChatStore};
pub use config::AppConfig;

/// ApiDoc
///
/// OpenAPI description of the storefront's own routes, served at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::storefront::home, handlers::storefront::shop,
        handlers::storefront::product_detail, handlers::storefront::events,
        handlers::storefront::login_page, handlers::storefront::register_page,
        handlers::storefront::account_session,
        handlers::auth::login, handlers::auth::logout, handlers::auth::register,
        handlers::auth::verify_email, handlers::auth::resend_otp,
        handlers::auth::forgot_password, handlers::auth::reset_password,
        handlers::account::my_events, handlers::account::chat_list,
        handlers::account::chat_detail, handlers::account::chat_send,
        handlers::admin::dashboard, handlers::admin::list_categories,
        handlers::admin::create_category, handlers::admin::update_category,
        handlers::admin::set_category_active, handlers::admin::list_products,
        handlers::admin::product_detail, handlers::admin::upload_asset,
        handlers::admin::replace_asset, handlers::admin::delete_asset,
    ),
    components(
        schemas(
            models::Category, models::CategoryRequest, models::ActiveStatusRequest,
            models::Product, models::ProductAsset, models::Event, models::EventRegistration,
            models::LoginForm, models::RegisterRequest, models::VerifyEmailRequest,
            models::EmailRequest, models::ResetPasswordRequest, models::MessageResponse,
            views::LoginResult, views::SessionStatus,
            views::Layout, roles::Role, chat::ChatExchange, chat::ChatMessage,
            handlers::account::SendMessageRequest,
        )
    ),
    tags(
        (name = "greenloop-storefront", description = "GreenLoop storefront page and auth API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared state container: backend client, chat store, configuration.
#[derive(Clone)]
pub struct AppState {
    /// Backend access, swappable for a stub in tests.
    pub api: ApiState,
    /// Chat-support conversations.
    pub chat: ChatState,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state with a fresh chat store using the configured typing delay.
    pub fn new(api: ApiState, config: AppConfig) -> Self {
        Self {
            api,
            chat: Arc::new(ChatStore::new(config.chat_typing_delay)),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for ApiState {
    fn from_ref(app_state: &AppState) -> ApiState {
        app_state.api.clone()
    }
}

impl FromRef<AppState> for ChatState {
    fn from_ref(app_state: &AppState) -> ChatState {
        app_state.chat.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the three route tiers, puts the access gates in front of the
/// protected ones, and applies the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let secure_cookies = state.config.secure_cookies();
    let enforce_expiry = state.config.enforce_token_expiry;

    // Login-only gate for the authenticated tier.
    let login_gate = GateState {
        gate: Arc::new(
            AccessGate::new("/", Requirement::Authenticated).with_token_expiry(enforce_expiry),
        ),
        secure_cookies,
    };

    // Role gate for the back office.
    let admin_gate = GateState {
        gate: Arc::new(
            AccessGate::for_roles(ADMIN_PREFIX, &state.config.admin_roles)
                .with_token_expiry(enforce_expiry),
        ),
        secure_cookies,
    };

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(login_gate, gate::access_gate)),
        )
        .nest(
            ADMIN_PREFIX,
            admin::admin_routes(state.config.max_upload_bytes)
                .route_layer(middleware::from_fn_with_state(admin_gate, gate::access_gate)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, tagged with its `x-request-id` so every log line of the
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
