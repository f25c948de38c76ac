//! Landing page object.

use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::VerificarResult;

/// The application landing page reached after login.
#[derive(Debug)]
pub struct HomePage {
    page: Page,
    logo: Locator,
}

impl HomePage {
    /// Build the page object over an open page
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            logo: Locator::css("div.logo.logo"),
        }
    }

    /// Whether the application logo is showing, confirming a landed login
    pub async fn is_welcome_displayed(&self) -> bool {
        self.page.exists(&self.logo).await
    }

    /// Whether the page shows the given text anywhere in its source.
    ///
    /// # Errors
    ///
    /// Fails when the page source cannot be read.
    pub async fn shows_text(&self, text: &str) -> VerificarResult<bool> {
        self.page.is_text_present(text).await
    }
}

impl PageObject for HomePage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn url_pattern(&self) -> &str {
        "/home"
    }

    fn marker(&self) -> Locator {
        self.logo.clone()
    }

    fn page_name(&self) -> &str {
        "HomePage"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backend::{DomBackend, FakeDom, FakeElement};
    use crate::wait::WaitPolicy;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_logo_confirms_landing() {
        let dom = Arc::new(FakeDom::new());
        let mut page = Page::new(Arc::clone(&dom) as Arc<dyn DomBackend>);
        page.change_wait(WaitPolicy::with_timeout(Duration::from_millis(100)));

        let home = HomePage::new(page);
        assert!(!home.is_welcome_displayed().await);

        let _ = dom
            .insert_for(&Locator::css("div.logo.logo"), FakeElement::visible())
            .unwrap();
        assert!(home.is_welcome_displayed().await);
    }
}
