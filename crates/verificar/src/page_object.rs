//! Page object support.
//!
//! A page object owns its locators and a [`Page`] to resolve them through.
//! [`PageObject`] gives every page a URL pattern, a load marker, and default
//! load-detection built on the wait machinery.

use crate::locator::Locator;
use crate::page::Page;
use crate::result::VerificarResult;
use crate::wait::{wait_until, WaitPolicy};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Trait for page objects representing a page or component in the UI.
///
/// Implementors supply the page handle, a URL pattern, and a marker locator
/// that only resolves once the page is usable; load detection comes for
/// free.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// The page handle this object resolves its locators through
    fn page(&self) -> &Page;

    /// URL pattern that matches this page (e.g., "/login", "/users/*")
    fn url_pattern(&self) -> &str;

    /// Locator that resolves only once the page is ready for interaction
    fn marker(&self) -> Locator;

    /// Budget for [`PageObject::wait_until_loaded`]
    fn load_timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether the marker currently resolves
    async fn is_loaded(&self) -> bool {
        self.page().exists(&self.marker()).await
    }

    /// Poll until the marker resolves or the load budget elapses.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::Timeout`](crate::VerificarError::Timeout)
    /// when the page never finishes loading.
    async fn wait_until_loaded(&self) -> VerificarResult<()> {
        tracing::debug!(page = self.page_name(), "waiting for page load");
        wait_until(WaitPolicy::with_timeout(self.load_timeout()), || async move {
            Ok(self.is_loaded().await.then_some(()))
        })
        .await
    }

    /// Whether the browser's current URL matches this page's pattern.
    ///
    /// # Errors
    ///
    /// Fails when the driver cannot report the current URL.
    async fn is_current(&self) -> VerificarResult<bool> {
        let url = self.page().current_url().await?;
        Ok(UrlMatcher::new(self.url_pattern()).matches_url(&url))
    }
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/users/*`
    /// - Named parameters: `/users/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL path matches the pattern
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        // Wildcards and parameters each consume exactly one segment
        if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments.iter().enumerate().all(|(i, segment)| match segment {
            UrlSegment::Literal(lit) => path_segments.get(i) == Some(&lit.as_str()),
            UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
        })
    }

    /// Check a full URL, ignoring scheme, host, query, and fragment
    #[must_use]
    pub fn matches_url(&self, url: &str) -> bool {
        self.matches(Self::path_of(url))
    }

    /// Extract named parameters from a URL path
    #[must_use]
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for (i, segment) in self.segments.iter().enumerate() {
            if let UrlSegment::Parameter(name) = segment {
                if let Some(value) = path_segments.get(i) {
                    let _ = params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        params
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn path_of(url: &str) -> &str {
        let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
        let path = after_scheme
            .find('/')
            .map_or("", |idx| &after_scheme[idx..]);
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        path.split_once('#').map_or(path, |(p, _)| p)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backend::{DomBackend, FakeDom, FakeElement};
    use std::sync::Arc;

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal_pattern() {
            let matcher = UrlMatcher::new("/login");
            assert!(matcher.matches("/login"));
            assert!(!matcher.matches("/logout"));
            assert!(!matcher.matches("/login/extra"));
        }

        #[test]
        fn test_wildcard_consumes_one_segment() {
            let matcher = UrlMatcher::new("/users/*");
            assert!(matcher.matches("/users/42"));
            assert!(!matcher.matches("/users"));
            assert!(!matcher.matches("/users/42/edit"));
        }

        #[test]
        fn test_parameter_extraction() {
            let matcher = UrlMatcher::new("/users/:id/orders/:order");
            assert!(matcher.matches("/users/42/orders/7"));

            let params = matcher.extract_params("/users/42/orders/7");
            assert_eq!(params.get("id").map(String::as_str), Some("42"));
            assert_eq!(params.get("order").map(String::as_str), Some("7"));
        }

        #[test]
        fn test_full_url_strips_host_query_and_fragment() {
            let matcher = UrlMatcher::new("/login");
            assert!(matcher.matches_url("https://app.example.test/login?next=%2Fhome#top"));
            assert!(!matcher.matches_url("https://app.example.test/home"));
        }
    }

    mod trait_defaults {
        use super::*;

        struct MarkerPage {
            page: Page,
        }

        impl PageObject for MarkerPage {
            fn page(&self) -> &Page {
                &self.page
            }

            fn url_pattern(&self) -> &str {
                "/home"
            }

            fn marker(&self) -> Locator {
                Locator::css("div.logo.logo")
            }

            fn load_timeout(&self) -> Duration {
                Duration::from_millis(200)
            }
        }

        fn page_over(dom: &Arc<FakeDom>) -> Page {
            let mut page = Page::new(Arc::clone(dom) as Arc<dyn DomBackend>);
            page.change_wait(WaitPolicy::with_timeout(Duration::from_millis(100)));
            page
        }

        #[tokio::test]
        async fn test_is_loaded_tracks_marker() {
            let dom = Arc::new(FakeDom::new());
            let object = MarkerPage {
                page: page_over(&dom),
            };

            assert!(!object.is_loaded().await);
            let _ = dom
                .insert_for(&object.marker(), FakeElement::visible())
                .unwrap();
            assert!(object.is_loaded().await);
        }

        #[tokio::test]
        async fn test_wait_until_loaded_times_out() {
            let dom = Arc::new(FakeDom::new());
            let object = MarkerPage {
                page: page_over(&dom),
            };

            assert!(object.wait_until_loaded().await.is_err());
        }

        #[tokio::test]
        async fn test_is_current_matches_pattern() {
            let dom = Arc::new(FakeDom::new());
            let mut page = page_over(&dom);
            assert!(page.navigate_to("https://app.example.test/home", None).await);

            let object = MarkerPage { page };
            assert!(object.is_current().await.unwrap());
        }
    }
}
