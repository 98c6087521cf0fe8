use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        ForgotPasswordRequest, LoginForm, MessageResponse, RegisterRequest, ResendOtpRequest,
        ResetPasswordRequest, VerifyEmailRequest,
    },
    roles::RoleSet,
    session::{CookieStorage, SessionProvider, SessionRecord},
    validation,
    views::LoginResult,
};

/// Accepts only same-origin paths: must start with `/`, must not start with `//`
/// and must not contain a backslash.
pub fn local_redirect(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|r| r.starts_with('/') && !r.starts_with("//") && !r.contains('\\'))
        .map(str::to_string)
}

/// Where a freshly signed-in user lands: the gate-recorded path when there is
/// one, otherwise the back office for staff roles and the home page for the rest.
pub fn post_login_target(redirect: Option<&str>, roles: &RoleSet) -> String {
    local_redirect(redirect).unwrap_or_else(|| {
        if roles.known().any(|r| r.is_back_office()) {
            "/admin".to_string()
        } else {
            "/".to_string()
        }
    })
}

/// login
///
/// [Public Route] Validates the form, authenticates against the backend, and
/// writes the session record (all three keys) into the response cookies.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Signed in", body = LoginResult),
        (status = 422, description = "Invalid form"),
        (status = 401, description = "Rejected by the backend")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> AppResult<(CookieJar, Json<LoginResult>)> {
    let credentials = form.credentials();
    validation::validate_login(&credentials)?;

    let auth = state.api.login(&credentials).await?;
    let record = SessionRecord::from(auth);
    let roles = record.role_set();

    let mut provider =
        SessionProvider::new(CookieStorage::new(jar, state.config.secure_cookies()));
    provider
        .set_session(&record)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    tracing::info!(email = %record.user_info.email, "User signed in");

    let result = LoginResult {
        redirect_to: post_login_target(form.redirect.as_deref(), &roles),
        email: record.user_info.email,
        roles: roles.names(),
    };
    Ok((provider.into_storage().into_jar(), Json(result)))
}

/// logout
///
/// [Public Route] Deletes the session record. The very next gated navigation
/// redirects to the login page.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut provider =
        SessionProvider::new(CookieStorage::new(jar, state.config.secure_cookies()));
    provider.clear_session();
    (provider.into_storage().into_jar(), StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered, OTP sent", body = MessageResponse),
        (status = 422, description = "Invalid form")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterRequest>,
) -> AppResult<Json<MessageResponse>> {
    validation::validate_register(&form)?;
    let form = RegisterRequest {
        email: form.email.trim().to_string(),
        full_name: form.full_name.trim().to_string(),
        ..form
    };
    Ok(Json(state.api.register(&form).await?))
}

#[utoipa::path(
    post,
    path = "/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses((status = 200, description = "Email verified", body = MessageResponse))
)]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(form): Json<VerifyEmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    validation::validate_verify_email(&form)?;
    let form = VerifyEmailRequest {
        email: form.email.trim().to_string(),
        otp: form.otp.trim().to_string(),
    };
    Ok(Json(state.api.verify_email(&form).await?))
}

#[utoipa::path(
    post,
    path = "/auth/resend-otp",
    request_body = ResendOtpRequest,
    responses((status = 200, description = "OTP re-sent", body = MessageResponse))
)]
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(form): Json<ResendOtpRequest>,
) -> AppResult<Json<MessageResponse>> {
    validation::validate_email_request(&form)?;
    let form = ResendOtpRequest {
        email: form.email.trim().to_string(),
    };
    Ok(Json(state.api.resend_otp(&form).await?))
}

#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses((status = 200, description = "Reset code sent", body = MessageResponse))
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(form): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    validation::validate_email_request(&form)?;
    let form = ForgotPasswordRequest {
        email: form.email.trim().to_string(),
    };
    Ok(Json(state.api.forgot_password(&form).await?))
}

#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses((status = 200, description = "Password reset", body = MessageResponse))
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    validation::validate_reset_password(&form)?;
    let form = ResetPasswordRequest {
        email: form.email.trim().to_string(),
        otp: form.otp.trim().to_string(),
        ..form
    };
    Ok(Json(state.api.reset_password(&form).await?))
}
