//! Concrete page objects for the authentication journey.

pub mod home;
pub mod login;

pub use home::HomePage;
pub use login::LoginPage;

use regex::Regex;
use std::sync::OnceLock;

fn auth_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Infallible, the pattern is a literal
        #[allow(clippy::expect_used)]
        Regex::new("code=(.*)$").expect("auth code pattern")
    })
}

/// Extract the authorization code from a post-login redirect URL.
///
/// The code is everything after the final `code=` marker, as handed back by
/// the identity provider.
#[must_use]
pub fn extract_auth_code(url: &str) -> Option<String> {
    auth_code_pattern()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|code| !code.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_auth_code_from_redirect() {
        let url = "https://app.example.test/cb?state=xyz&code=SplxlOBeZQQYbYS6WxSbIA";
        assert_eq!(
            extract_auth_code(url).as_deref(),
            Some("SplxlOBeZQQYbYS6WxSbIA")
        );
    }

    #[test]
    fn test_extract_auth_code_absent() {
        assert_eq!(extract_auth_code("https://app.example.test/cb?state=xyz"), None);
        assert_eq!(extract_auth_code("https://app.example.test/cb?code="), None);
    }
}
