use std::env;
use std::path::Path;
use std::time::Duration;

// Default configuration constants
pub const DEFAULT_API_URL: &str = "http://localhost:4000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_PAGE_POLL_MS: u64 = 500;

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

/// Base URL of the blueprint/compose API, without trailing slashes.
pub fn get_api_url() -> String {
    sanitize_base_url(&env::var("COMPOSER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()))
}

/// Upper bound for each step of the commit, reload and compose chain.
pub fn get_timeout() -> Duration {
    Duration::from_secs(parse_u64_var("COMPOSER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS))
}

/// How long page objects wait for an element before giving up.
pub fn get_page_timeout() -> Duration {
    Duration::from_millis(parse_u64_var("COMPOSER_PAGE_TIMEOUT_MS", DEFAULT_PAGE_TIMEOUT_MS))
}

pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_u64_var(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(v) if v > 0 => v,
            _ => {
                tracing::warn!(var = name, value = %raw, "Ignoring invalid value, using default {}", default);
                default
            }
        },
        Err(_) => default,
    }
}
