pub mod profile;
pub mod server;

use std::env;

pub const DEFAULT_API_URL: &str = "https://codeforces.com/api";

/// Read the Codeforces API base URL from the environment, falling back to
/// the public endpoint.
pub fn api_url_from_env() -> String {
    env::var("CODEFORCES_API_URL").unwrap_or_else(|_| {
        tracing::warn!(
            "CODEFORCES_API_URL environment variable is not set. Default value `{}` will be used.",
            DEFAULT_API_URL
        );
        String::from(DEFAULT_API_URL)
    })
}

pub fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
