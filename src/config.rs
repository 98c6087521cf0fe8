use std::env;
use std::time::Duration;

/// AppConfig
///
/// Holds the storefront's entire configuration state. Immutable once loaded and
/// pulled into handlers through `FromRef`, like the rest of the shared state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls cookie security and log format.
    pub env: Env,
    // Base URL of the GreenLoop REST backend, without a trailing slash.
    pub api_base_url: String,
    // Address the HTTP server binds to.
    pub bind_addr: String,
    // Raw role names allowed into the `/admin` subtree, as configured.
    pub admin_roles: Vec<String>,
    // When true, the access gate treats an expired JWT as no session at all.
    pub enforce_token_expiry: bool,
    // Cosmetic pause before the canned chat-support reply is appended.
    pub chat_typing_delay: Duration,
    // Per-request timeout for calls to the REST backend.
    pub api_timeout: Duration,
    // Largest product asset accepted from the back office, in bytes.
    pub max_upload_bytes: usize,
}

/// Env
///
/// Defines the runtime context: local development or the hardened production deployment.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// Role list guarding the back office. The last entry is kept as it was
/// configured upstream; it is not a known role and only admits users whose
/// token carries the same spelling.
pub const DEFAULT_ADMIN_ROLES: &str = "ADMIN,STAFF,SUPPORT_STAFF,SUPPPORTS_STAFF";

const LOCAL_API_BASE_URL: &str = "http://localhost:8080/api";

const DEFAULT_MAX_UPLOAD_MB: u64 = 10;

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking configuration for test setup. The chat delay is zero so
    /// tests never sleep.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            admin_roles: split_roles(DEFAULT_ADMIN_ROLES),
            enforce_token_expiry: false,
            chat_typing_delay: Duration::ZERO,
            api_timeout: Duration::from_secs(10),
            max_upload_bytes: megabytes(DEFAULT_MAX_UPLOAD_MB),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, fail-fast.
    ///
    /// # Panics
    /// Panics in production when `GREENLOOP_API_URL` is missing, and whenever a numeric
    /// or boolean variable is present but unparsable.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => env::var("GREENLOOP_API_URL")
                .expect("FATAL: GREENLOOP_API_URL must be set in production."),
            Env::Local => env::var("GREENLOOP_API_URL")
                .unwrap_or_else(|_| LOCAL_API_BASE_URL.to_string()),
        };

        let admin_roles = split_roles(
            &env::var("ADMIN_ALLOWED_ROLES").unwrap_or_else(|_| DEFAULT_ADMIN_ROLES.to_string()),
        );

        let enforce_token_expiry = env::var("GATE_ENFORCE_TOKEN_EXPIRY")
            .map(|v| {
                v.parse::<bool>()
                    .expect("FATAL: GATE_ENFORCE_TOKEN_EXPIRY must be true or false")
            })
            .unwrap_or(false);

        let chat_typing_delay = Duration::from_millis(parse_u64("CHAT_TYPING_DELAY_MS", 1500));
        let api_timeout = Duration::from_secs(parse_u64("API_TIMEOUT_SECS", 10));
        let max_upload_bytes = megabytes(parse_u64("MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB));

        Self {
            env,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            admin_roles,
            enforce_token_expiry,
            chat_typing_delay,
            api_timeout,
            max_upload_bytes,
        }
    }

    /// Session cookies are only marked `Secure` when served over HTTPS in production.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}

fn parse_u64(var: &str, default: u64) -> u64 {
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {var} must be a non-negative integer")),
        Err(_) => default,
    }
}

fn megabytes(mb: u64) -> usize {
    usize::try_from(mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
}

/// Splits a comma-separated role list, dropping blanks. No canonicalization happens
/// here; see `roles::canonicalize`.
pub fn split_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
