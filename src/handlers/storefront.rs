use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;

use crate::{
    AppState,
    auth::CurrentSession,
    error::AppResult,
    listing::{EventFilter, EventQuery, Pagination, ShopFilter, ShopQuery},
    models::Product,
    token,
    validation::{MIN_PASSWORD_LEN, OTP_LEN},
    views::{
        EventCard, EventsView, HomeView, LoginView, PageView, RegisterView, SessionStatus,
        ShopView,
    },
};

use super::{auth::local_redirect, take_notice};

const NEW_ARRIVALS: u32 = 8;

/// home
///
/// [Public Route] Landing page. Consumes the one-shot notice (for example the
/// access-denied message) and shows the newest listings. A backend failure here
/// only empties the listing; the page itself still renders.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Home page model"))
)]
pub async fn home(
    session: CurrentSession,
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<PageView<HomeView>>) {
    let (jar, notice) = take_notice(jar);

    let filter = ShopFilter {
        size: NEW_ARRIVALS,
        ..ShopFilter::default()
    };
    let new_arrivals = match state.api.list_products(session.token(), &filter).await {
        Ok(page) => page.content,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load new arrivals");
            Vec::<Product>::new()
        }
    };

    let view = HomeView {
        signed_in_as: session.0.map(|s| s.user_info.email),
        new_arrivals,
    };
    (
        jar,
        Json(PageView::for_path("/", "home", view).with_notice(notice)),
    )
}

/// shop
///
/// [Public Route] Product listing with category/status/search filters, sorting
/// and pagination. Only active categories are offered as filters.
#[utoipa::path(
    get,
    path = "/shop",
    params(ShopQuery),
    responses((status = 200, description = "Shop page model"))
)]
pub async fn shop(
    session: CurrentSession,
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> AppResult<Json<PageView<ShopView>>> {
    let filter = ShopFilter::from_query(query);
    let token = session.token();

    let page = state.api.list_products(token, &filter).await?;
    let categories = state
        .api
        .list_categories(token)
        .await?
        .into_iter()
        .filter(|c| c.active)
        .collect();

    let view = ShopView {
        pagination: Pagination::from_page(&page),
        products: page.content,
        categories,
        filter,
    };
    Ok(Json(PageView::for_path("/shop", "shop", view)))
}

/// product_detail
///
/// [Public Route] A single product.
#[utoipa::path(
    get,
    path = "/shop/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses((status = 200, description = "Product page model"))
)]
pub async fn product_detail(
    session: CurrentSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PageView<Product>>> {
    let product = state.api.get_product(session.token(), id).await?;
    Ok(Json(PageView::for_path(
        &format!("/shop/{id}"),
        "product_detail",
        product,
    )))
}

/// events
///
/// [Public Route] Community events, paginated, with schedule status per card.
#[utoipa::path(
    get,
    path = "/events",
    params(EventQuery),
    responses((status = 200, description = "Events page model"))
)]
pub async fn events(
    session: CurrentSession,
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<PageView<EventsView>>> {
    let filter = EventFilter::from_query(query);
    let page = state.api.list_events(session.token(), &filter).await?;
    let now = Utc::now();

    let view = EventsView {
        pagination: Pagination::from_page(&page),
        events: page
            .content
            .into_iter()
            .map(|e| EventCard::new(e, now))
            .collect(),
        filter,
    };
    Ok(Json(PageView::for_path("/events", "events", view)))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LoginPageQuery {
    /// Path recorded by the access gate.
    pub redirect: Option<String>,
}

/// login_page
///
/// [Public Route] Login screen. Echoes the gate-recorded path back so the form
/// can submit it, and consumes any pending notice.
#[utoipa::path(
    get,
    path = "/login",
    params(LoginPageQuery),
    responses((status = 200, description = "Login page model"))
)]
pub async fn login_page(
    Query(query): Query<LoginPageQuery>,
    jar: CookieJar,
) -> (CookieJar, Json<PageView<LoginView>>) {
    let (jar, notice) = take_notice(jar);
    let view = LoginView {
        redirect: local_redirect(query.redirect.as_deref()),
    };
    (
        jar,
        Json(PageView::for_path("/login", "login", view).with_notice(notice)),
    )
}

#[utoipa::path(
    get,
    path = "/register",
    responses((status = 200, description = "Registration page model"))
)]
pub async fn register_page() -> Json<PageView<RegisterView>> {
    Json(PageView::for_path(
        "/register",
        "register",
        RegisterView {
            min_password_length: MIN_PASSWORD_LEN,
            otp_length: OTP_LEN,
        },
    ))
}

/// account_session
///
/// [Public Route] The visitor's session as the header bar shows it, including
/// whether the cached token has already expired.
#[utoipa::path(
    get,
    path = "/account/session",
    responses((status = 200, description = "Session status", body = SessionStatus))
)]
pub async fn account_session(session: CurrentSession) -> Json<SessionStatus> {
    let status = match session.0 {
        Some(record) => SessionStatus {
            logged_in: true,
            roles: record.role_set().names(),
            token_expires_at: token::expires_at(&record.access_token),
            token_expired: token::is_token_expired(&record.access_token, Utc::now()),
            email: Some(record.user_info.email),
        },
        None => SessionStatus {
            logged_in: false,
            email: None,
            roles: Vec::new(),
            token_expires_at: None,
            token_expired: false,
        },
    };
    Json(status)
}
