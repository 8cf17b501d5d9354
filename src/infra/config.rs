//! Centralized configuration (environment variables + defaults).

/// Database URL must be provided (no default) for safety.
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set")
}

/// Listen address for the API server.
pub fn bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

/// Default page size for paginated listings.
pub fn default_page_limit() -> u64 {
    std::env::var("PAGE_LIMIT")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10)
        .max(1)
}

/// Verification token lifetime in hours.
pub fn verification_token_ttl_hours() -> i64 {
    std::env::var("VERIFICATION_TOKEN_TTL_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1)
}
