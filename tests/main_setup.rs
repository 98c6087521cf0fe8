use greenloop_storefront::{
    AppConfig,
    config::{DEFAULT_ADMIN_ROLES, Env, split_roles},
};
use serial_test::serial;
use std::{env, panic, time::Duration};

// --- Setup/Teardown Utilities ---

const CONFIG_VARS: &[&str] = &[
    "APP_ENV",
    "GREENLOOP_API_URL",
    "ADMIN_ALLOWED_ROLES",
    "GATE_ENFORCE_TOKEN_EXPIRY",
    "CHAT_TYPING_DELAY_MS",
    "API_TIMEOUT_SECS",
    "BIND_ADDR",
    "MAX_UPLOAD_MB",
];

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables, then start from a clean slate
    let originals: Vec<(String, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();
    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    // GREENLOOP_API_URL is required once we run in production
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without a backend URL"
    );
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:8080/api");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.admin_roles, split_roles(DEFAULT_ADMIN_ROLES));
    assert!(!config.enforce_token_expiry);
    assert_eq!(config.chat_typing_delay, Duration::from_millis(1500));
    assert_eq!(config.api_timeout, Duration::from_secs(10));
    assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    assert!(!config.secure_cookies());
}

#[test]
#[serial]
fn test_app_config_production_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("GREENLOOP_API_URL", "https://api.greenloop.vn/api/");
            env::set_var("ADMIN_ALLOWED_ROLES", " admin , ,support_staff");
            env::set_var("GATE_ENFORCE_TOKEN_EXPIRY", "true");
            env::set_var("CHAT_TYPING_DELAY_MS", "0");
            env::set_var("MAX_UPLOAD_MB", "25");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    // Trailing slash is trimmed so paths can be appended directly
    assert_eq!(config.api_base_url, "https://api.greenloop.vn/api");
    assert_eq!(config.admin_roles, vec!["admin", "support_staff"]);
    assert!(config.enforce_token_expiry);
    assert_eq!(config.chat_typing_delay, Duration::ZERO);
    assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
    assert!(config.secure_cookies());
}

#[test]
#[serial]
fn test_app_config_rejects_garbage_numbers() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("API_TIMEOUT_SECS", "ten");
            }
            AppConfig::load()
        })
    });

    assert!(result.is_err(), "Unparsable timeout should fail fast");
}

#[test]
fn test_default_admin_roles_keep_configured_spelling() {
    let roles = split_roles(DEFAULT_ADMIN_ROLES);
    assert_eq!(
        roles,
        vec!["ADMIN", "STAFF", "SUPPORT_STAFF", "SUPPPORTS_STAFF"]
    );
}
