//! Login page object.

use super::HomePage;
use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::VerificarResult;
use crate::wait::pause;
use std::time::Duration;

/// Delay for the identity provider to finish its post-login redirects
const DEFAULT_REDIRECT_PAUSE: Duration = Duration::from_secs(8);

/// The identity provider's login form.
pub struct LoginPage {
    page: Page,
    username: Locator,
    password: Locator,
    login_button: Locator,
    continue_button: Locator,
    redirect_pause: Duration,
}

impl LoginPage {
    /// Build the page object over an open page
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            username: Locator::id("username"),
            password: Locator::id("password"),
            login_button: Locator::id("loginButton"),
            continue_button: Locator::id("icmfContinueButton"),
            redirect_pause: DEFAULT_REDIRECT_PAUSE,
        }
    }

    /// Override the post-submit redirect pause
    #[must_use]
    pub const fn with_redirect_pause(mut self, redirect_pause: Duration) -> Self {
        self.redirect_pause = redirect_pause;
        self
    }

    /// Navigate to the login form
    pub async fn open(&mut self, url: &str) -> bool {
        self.page.navigate_to(url, None).await
    }

    /// Fill the credentials, submit, and ride out the redirect chain.
    ///
    /// The interstitial continue button is clicked through the scripting
    /// bridge when present; some environments skip it.
    ///
    /// # Errors
    ///
    /// Fails when the form fields cannot be resolved or the submit click
    /// is rejected.
    pub async fn login(&self, username: &str, password: &str) -> VerificarResult<HomePage> {
        tracing::info!(username, "logging in");
        self.page.type_text(&self.username, username).await?;
        self.page.type_text(&self.password, password).await?;
        // Submit through the scripting bridge; consent overlays routinely
        // cover the button on this form.
        self.page.force_click(&self.login_button).await?;
        pause("identity provider redirects", self.redirect_pause).await;

        if self.page.exists_present(&self.continue_button).await {
            self.page.force_click_present(&self.continue_button).await?;
        }

        Ok(HomePage::new(self.page.clone()))
    }

    /// Submit and return the authorization code from the landing URL.
    ///
    /// # Errors
    ///
    /// Fails like [`LoginPage::login`], or with a navigation error when no
    /// code appears in the landed URL.
    pub async fn login_for_auth_code(
        &self,
        username: &str,
        password: &str,
    ) -> VerificarResult<String> {
        let _ = self.login(username, password).await?;
        let landed = self.page.current_url().await?;
        super::extract_auth_code(&landed).ok_or_else(|| {
            crate::result::VerificarError::navigation(
                landed.clone(),
                "landing URL carries no authorization code",
            )
        })
    }
}

impl PageObject for LoginPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn url_pattern(&self) -> &str {
        "/login"
    }

    fn marker(&self) -> Locator {
        self.username.clone()
    }

    fn page_name(&self) -> &str {
        "LoginPage"
    }
}
