//! Field-local form checks. A form that fails here never reaches the backend.

use crate::{
    error::{AppError, FieldErrors},
    models::{
        CategoryRequest, EmailRequest, LoginRequest, RegisterRequest,
        ResetPasswordRequest, VerifyEmailRequest,
    },
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_CATEGORY_NAME_LEN: usize = 100;
pub const MAX_CATEGORY_DESCRIPTION_LEN: usize = 500;
pub const OTP_LEN: usize = 6;

/// Loose structural check: one `@`, a non-empty local part, a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub fn is_valid_otp(otp: &str) -> bool {
    let otp = otp.trim();
    otp.len() == OTP_LEN && otp.chars().all(|c| c.is_ascii_digit())
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        errors.insert("email", "Vui lòng nhập email".to_string());
    } else if !is_valid_email(email) {
        errors.insert("email", "Email không hợp lệ".to_string());
    }
}

fn check_new_password(errors: &mut FieldErrors, field: &'static str, password: &str) {
    if password.is_empty() {
        errors.insert(field, "Vui lòng nhập mật khẩu".to_string());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            field,
            format!("Mật khẩu phải có ít nhất {MIN_PASSWORD_LEN} ký tự"),
        );
    }
}

fn check_otp(errors: &mut FieldErrors, otp: &str) {
    if !is_valid_otp(otp) {
        errors.insert("otp", format!("Mã OTP gồm {OTP_LEN} chữ số"));
    }
}

fn finish(errors: FieldErrors) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn validate_login(form: &LoginRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, &form.email);
    if form.password.is_empty() {
        errors.insert("password", "Vui lòng nhập mật khẩu".to_string());
    }
    finish(errors)
}

pub fn validate_register(form: &RegisterRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if form.full_name.trim().is_empty() {
        errors.insert("fullName", "Vui lòng nhập họ tên".to_string());
    }
    check_email(&mut errors, &form.email);
    check_new_password(&mut errors, "password", &form.password);
    if form.confirm_password != form.password {
        errors.insert("confirmPassword", "Mật khẩu xác nhận không khớp".to_string());
    }
    finish(errors)
}

pub fn validate_verify_email(form: &VerifyEmailRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, &form.email);
    check_otp(&mut errors, &form.otp);
    finish(errors)
}

pub fn validate_email_request(form: &EmailRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, &form.email);
    finish(errors)
}

pub fn validate_reset_password(form: &ResetPasswordRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, &form.email);
    check_otp(&mut errors, &form.otp);
    check_new_password(&mut errors, "newPassword", &form.new_password);
    if form.confirm_password != form.new_password {
        errors.insert("confirmPassword", "Mật khẩu xác nhận không khớp".to_string());
    }
    finish(errors)
}

pub fn validate_category(form: &CategoryRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    let name = form.name.trim();
    if name.is_empty() {
        errors.insert("name", "Vui lòng nhập tên danh mục".to_string());
    } else if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        errors.insert(
            "name",
            format!("Tên danh mục tối đa {MAX_CATEGORY_NAME_LEN} ký tự"),
        );
    }
    if form
        .description
        .as_deref()
        .is_some_and(|d| d.chars().count() > MAX_CATEGORY_DESCRIPTION_LEN)
    {
        errors.insert(
            "description",
            format!("Mô tả tối đa {MAX_CATEGORY_DESCRIPTION_LEN} ký tự"),
        );
    }
    finish(errors)
}
