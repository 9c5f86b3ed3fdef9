use url::Url;

/// Inline message shown under a non-blank URL that fails validation.
pub const URL_HINT: &str = "Please enter a valid URL starting with http:// or https://";

/// True only for well-formed absolute `http`/`https` URLs. Purely syntactic.
pub fn is_valid_url(candidate: &str) -> bool {
    if candidate.trim().is_empty() {
        return false;
    }
    match Url::parse(candidate) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

pub fn url_hint(candidate: &str) -> Option<&'static str> {
    if candidate.trim().is_empty() || is_valid_url(candidate) {
        None
    } else {
        Some(URL_HINT)
    }
}
