use once_cell::sync::Lazy;
use regex::Regex;

/// Handles may contain only Latin letters, digits, underscore, or dash.
static HANDLE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

pub fn is_valid_handle(handle: &str) -> bool {
    HANDLE_PATTERN.is_match(handle)
}
