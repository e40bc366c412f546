use composer::config;
use std::env;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_sanitize_base_url_removes_trailing_slash() {
    assert_eq!(config::sanitize_base_url("http://composer.local:4000/"), "http://composer.local:4000");
}

#[test]
fn test_sanitize_base_url_multiple_trailing_slashes() {
    assert_eq!(config::sanitize_base_url("http://composer.local:4000///"), "http://composer.local:4000");
}

#[test]
fn test_sanitize_base_url_with_whitespace() {
    assert_eq!(config::sanitize_base_url("  http://composer.local:4000/  "), "http://composer.local:4000");
}

#[test]
fn test_sanitize_base_url_empty_string() {
    assert_eq!(config::sanitize_base_url(""), config::DEFAULT_API_URL);
    assert_eq!(config::sanitize_base_url("   "), config::DEFAULT_API_URL);
}

// The environment is process wide, so everything touching COMPOSER_* runs in one test.
#[test]
fn test_env_driven_settings() {
    env::set_var("COMPOSER_API_URL", "http://composer.local:4000/");
    assert_eq!(config::get_api_url(), "http://composer.local:4000");
    env::remove_var("COMPOSER_API_URL");
    assert_eq!(config::get_api_url(), "http://localhost:4000");

    env::remove_var("COMPOSER_TIMEOUT_SECS");
    assert_eq!(config::get_timeout(), Duration::from_secs(30));
    env::set_var("COMPOSER_TIMEOUT_SECS", "5");
    assert_eq!(config::get_timeout(), Duration::from_secs(5));
    env::set_var("COMPOSER_TIMEOUT_SECS", "soon");
    assert_eq!(config::get_timeout(), Duration::from_secs(30));
    env::set_var("COMPOSER_TIMEOUT_SECS", "0");
    assert_eq!(config::get_timeout(), Duration::from_secs(30));
    env::remove_var("COMPOSER_TIMEOUT_SECS");

    env::remove_var("COMPOSER_PAGE_TIMEOUT_MS");
    assert_eq!(config::get_page_timeout(), Duration::from_millis(120_000));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "COMPOSER_PAGE_TIMEOUT_MS=2500").unwrap();
    config::load_env_file(file.path().to_str());
    assert_eq!(config::get_page_timeout(), Duration::from_millis(2500));
    env::remove_var("COMPOSER_PAGE_TIMEOUT_MS");
}
