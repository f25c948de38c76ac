//! Core page interaction layer.
//!
//! [`Page`] owns the tiered wait discipline over a [`DomBackend`]: every
//! lookup first waits for presence, then for visibility, inside one shared
//! deadline. Interactions resolve their element through that discipline and
//! return explicit results instead of panicking mid-suite.

use crate::backend::{DomBackend, ElementHandle, ElementId};
use crate::locator::{DomQuery, Locator};
use crate::result::{VerificarError, VerificarResult};
use crate::wait::{pause, wait_until, WaitPolicy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Settle delay applied before typing into a field
const TYPE_SETTLE: Duration = Duration::from_millis(500);

/// Outcome of the post-type value confirmation poll
enum ValueCheck {
    Confirmed,
    Unreadable,
}

/// Restores the not-found log suppression flag when dropped
struct SuppressGuard<'a> {
    flag: &'a AtomicBool,
    previous: bool,
}

impl<'a> SuppressGuard<'a> {
    fn engage(flag: &'a AtomicBool) -> Self {
        let previous = flag.swap(true, Ordering::SeqCst);
        Self { flag, previous }
    }
}

impl Drop for SuppressGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(self.previous, Ordering::SeqCst);
    }
}

/// Handle to one browser page, with the wait discipline built in.
///
/// Cloning yields an independent view over the same backend; the wait
/// policy and suppression state are per-clone.
#[derive(Debug)]
pub struct Page {
    dom: Arc<dyn DomBackend>,
    wait: WaitPolicy,
    page_url: String,
    suppress_not_found: AtomicBool,
}

impl Clone for Page {
    fn clone(&self) -> Self {
        Self {
            dom: Arc::clone(&self.dom),
            wait: self.wait,
            page_url: self.page_url.clone(),
            suppress_not_found: AtomicBool::new(self.suppress_not_found.load(Ordering::SeqCst)),
        }
    }
}

impl Page {
    /// Create a page over a backend with the default (long) wait policy
    #[must_use]
    pub fn new(dom: Arc<dyn DomBackend>) -> Self {
        Self {
            dom,
            wait: WaitPolicy::LONG,
            page_url: String::new(),
            suppress_not_found: AtomicBool::new(false),
        }
    }

    /// The backend this page talks to
    #[must_use]
    pub fn dom(&self) -> Arc<dyn DomBackend> {
        Arc::clone(&self.dom)
    }

    /// URL of the last successful navigation through this page
    #[must_use]
    pub fn url(&self) -> &str {
        &self.page_url
    }

    /// Replace the wait policy used by subsequent lookups
    pub fn change_wait(&mut self, wait: WaitPolicy) {
        self.wait = wait;
    }

    /// Restore the default long wait policy
    pub fn reset_wait(&mut self) {
        self.wait = WaitPolicy::LONG;
    }

    /// Current wait policy
    #[must_use]
    pub const fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Resolve a single element with the page's current wait policy.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::ElementNotFound`] when the element never
    /// becomes present and visible within the wait budget, and
    /// [`VerificarError::UnsupportedLocator`] for non-web locator kinds.
    pub async fn locate(&self, locator: &Locator) -> VerificarResult<ElementHandle> {
        self.locate_with(locator, self.wait).await
    }

    /// Resolve a single element with an explicit wait policy.
    ///
    /// Presence and visibility are waited for in turn, both phases sharing
    /// one deadline derived from the policy.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Page::locate`].
    pub async fn locate_with(
        &self,
        locator: &Locator,
        policy: WaitPolicy,
    ) -> VerificarResult<ElementHandle> {
        let query = locator.resolution_query()?;
        match self.resolve_visible(&query, policy).await {
            Ok(id) => Ok(ElementHandle::new(id, locator)),
            Err(err) => {
                if !self.suppress_not_found.load(Ordering::SeqCst) {
                    tracing::error!(
                        locator = %locator,
                        error = %err,
                        "element did not become visible"
                    );
                }
                Err(VerificarError::not_found(locator.pattern(), locator.kind()))
            }
        }
    }

    async fn resolve_visible(
        &self,
        query: &DomQuery,
        policy: WaitPolicy,
    ) -> VerificarResult<ElementId> {
        let started = Instant::now();
        let dom = &*self.dom;

        // Presence first
        let _: () = wait_until(policy, || async move {
            let snapshots = dom.find_all(query).await?;
            Ok((!snapshots.is_empty()).then_some(()))
        })
        .await?;

        // Then visibility, within whatever budget remains
        let visibility_policy = WaitPolicy {
            timeout: policy.timeout.saturating_sub(started.elapsed()),
            poll_interval: policy.poll_interval,
        };
        wait_until(visibility_policy, || async move {
            let snapshots = dom.find_all(query).await?;
            Ok(snapshots.iter().find(|s| s.displayed).map(|s| s.id))
        })
        .await
    }

    /// Resolve a single element waiting only for presence, not visibility.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::ElementNotFound`] when nothing matches
    /// within the wait budget.
    pub async fn locate_present(&self, locator: &Locator) -> VerificarResult<ElementHandle> {
        let query = locator.resolution_query()?;
        let dom = &*self.dom;
        let query_ref = &query;
        let resolved = wait_until(self.wait, || async move {
            let snapshots = dom.find_all(query_ref).await?;
            Ok(snapshots.first().map(|s| s.id))
        })
        .await;
        match resolved {
            Ok(id) => Ok(ElementHandle::new(id, locator)),
            Err(err) => {
                if !self.suppress_not_found.load(Ordering::SeqCst) {
                    tracing::error!(locator = %locator, error = %err, "element never appeared");
                }
                Err(VerificarError::not_found(locator.pattern(), locator.kind()))
            }
        }
    }

    /// Resolve every visible element matching the locator.
    ///
    /// Uses the short collection wait. The set is complete only once all
    /// matched elements report visible.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::ElementNotFound`] when no fully visible
    /// set materializes within the short wait.
    pub async fn locate_all(&self, locator: &Locator) -> VerificarResult<Vec<ElementHandle>> {
        let query = locator.resolution_query()?;
        let dom = &*self.dom;
        let query_ref = &query;
        // Collections get the short budget, unless the page was tuned lower.
        let policy = if self.wait.timeout < WaitPolicy::SHORT.timeout {
            self.wait
        } else {
            WaitPolicy::SHORT
        };
        let resolved = wait_until(policy, || async move {
            let snapshots = dom.find_all(query_ref).await?;
            if !snapshots.is_empty() && snapshots.iter().all(|s| s.displayed) {
                Ok(Some(snapshots.iter().map(|s| s.id).collect::<Vec<_>>()))
            } else {
                Ok(None)
            }
        })
        .await;
        match resolved {
            Ok(ids) => Ok(ids
                .into_iter()
                .map(|id| ElementHandle::new(id, locator))
                .collect()),
            Err(err) => {
                if !self.suppress_not_found.load(Ordering::SeqCst) {
                    tracing::error!(locator = %locator, error = %err, "no visible elements");
                }
                Err(VerificarError::not_found(locator.pattern(), locator.kind()))
            }
        }
    }

    /// Whether an element currently resolves, without failing the caller.
    ///
    /// Not-found logging is suppressed for the duration of the probe and
    /// the previous suppression state restored afterwards.
    pub async fn exists(&self, locator: &Locator) -> bool {
        let _guard = SuppressGuard::engage(&self.suppress_not_found);
        self.locate(locator).await.is_ok()
    }

    /// Whether an element is present in the DOM, visible or not, without
    /// failing the caller.
    pub async fn exists_present(&self, locator: &Locator) -> bool {
        let _guard = SuppressGuard::engage(&self.suppress_not_found);
        self.locate_present(locator).await.is_ok()
    }

    // ------------------------------------------------------------------
    // Interactions
    // ------------------------------------------------------------------

    /// Scroll the element into view and click it.
    ///
    /// # Errors
    ///
    /// Fails when the element cannot be resolved or the click is rejected
    /// by the driver.
    pub async fn click(&self, locator: &Locator) -> VerificarResult<()> {
        let handle = self.locate(locator).await?;
        self.dom.scroll_into_view(handle.id()).await?;
        self.dom.click(handle.id()).await
    }

    /// Double click the element.
    ///
    /// # Errors
    ///
    /// Fails when the element cannot be resolved or the driver rejects the
    /// gesture.
    pub async fn double_click(&self, locator: &Locator) -> VerificarResult<()> {
        let handle = self.locate(locator).await?;
        self.dom.double_click(handle.id()).await
    }

    /// Context-click the element.
    ///
    /// # Errors
    ///
    /// Fails when the element cannot be resolved or the driver rejects the
    /// gesture.
    pub async fn right_click(&self, locator: &Locator) -> VerificarResult<()> {
        let handle = self.locate(locator).await?;
        self.dom.right_click(handle.id()).await
    }

    /// Move the pointer over the element.
    ///
    /// # Errors
    ///
    /// Fails when the element cannot be resolved or the pointer move fails.
    pub async fn hover(&self, locator: &Locator) -> VerificarResult<()> {
        let handle = self.locate(locator).await?;
        self.dom.hover(handle.id()).await
    }

    /// Drag the source element onto the target element.
    ///
    /// # Errors
    ///
    /// Fails when either element cannot be resolved or the drag fails.
    pub async fn drag_and_drop(
        &self,
        source: &Locator,
        target: &Locator,
    ) -> VerificarResult<()> {
        let from = self.locate(source).await?;
        let to = self.locate(target).await?;
        self.dom.drag_and_drop(from.id(), to.id()).await
    }

    /// Click through the scripting bridge, bypassing native hit testing.
    ///
    /// For elements that are resolvable but obscured by overlays.
    ///
    /// # Errors
    ///
    /// Fails when the element cannot be resolved or the script fails.
    pub async fn force_click(&self, locator: &Locator) -> VerificarResult<()> {
        let handle = self.locate(locator).await?;
        self.dom.js_click(handle.id()).await
    }

    /// Script-click an element that only needs to be present, not visible.
    ///
    /// # Errors
    ///
    /// Fails when the element never appears or the script fails.
    pub async fn force_click_present(&self, locator: &Locator) -> VerificarResult<()> {
        let handle = self.locate_present(locator).await?;
        self.dom.js_click(handle.id()).await
    }

    /// Clear a text field and type into it, then confirm the value landed.
    ///
    /// The field must be visible, enabled, and the text non-empty; anything
    /// else skips the write with a warning. After typing, the field's value
    /// length is polled until it matches the input. A field whose value
    /// property is unreadable is logged and treated as filled.
    ///
    /// # Errors
    ///
    /// Fails when the field cannot be resolved, the write is rejected, or
    /// the value never reaches the expected length.
    pub async fn type_text(&self, locator: &Locator, text: &str) -> VerificarResult<()> {
        pause("field settle before typing", TYPE_SETTLE).await;

        let handle = self.locate(locator).await?;
        let id = handle.id();

        if text.is_empty() {
            tracing::warn!(locator = %locator, "skipping type of empty text");
            return Ok(());
        }
        if !self.dom.is_displayed(id).await? || !self.dom.is_enabled(id).await? {
            tracing::warn!(locator = %locator, "field not interactable, skipping type");
            return Ok(());
        }

        self.dom.clear(id).await?;
        self.dom.send_keys(id, text).await?;

        let dom = &*self.dom;
        let expected = text.len();
        let outcome = wait_until(self.wait, || async move {
            match dom.attribute(id, "value").await? {
                None => Ok(Some(ValueCheck::Unreadable)),
                Some(value) if value.len() == expected => Ok(Some(ValueCheck::Confirmed)),
                Some(_) => Ok(None),
            }
        })
        .await?;

        if matches!(outcome, ValueCheck::Unreadable) {
            tracing::warn!(locator = %locator, "value attribute unreadable after typing");
        }
        Ok(())
    }

    /// Bring a checkbox to the requested state, clicking only on mismatch.
    ///
    /// # Errors
    ///
    /// Fails when the checkbox cannot be resolved or the click fails.
    pub async fn select_checkbox(&self, locator: &Locator, checked: bool) -> VerificarResult<()> {
        let handle = self.locate(locator).await?;
        if self.dom.is_selected(handle.id()).await? != checked {
            self.dom.click(handle.id()).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Rendered text of the element, falling back to its inner HTML when
    /// the text is empty.
    ///
    /// # Errors
    ///
    /// Fails when the element cannot be resolved.
    pub async fn text_of(&self, locator: &Locator) -> VerificarResult<String> {
        let handle = self.locate(locator).await?;
        let text = self.dom.text(handle.id()).await?;
        if !text.is_empty() {
            return Ok(text);
        }
        Ok(self
            .dom
            .attribute(handle.id(), "innerHTML")
            .await?
            .unwrap_or_default())
    }

    /// Read an attribute of the element.
    ///
    /// # Errors
    ///
    /// Fails when the element cannot be resolved.
    pub async fn attribute_of(
        &self,
        locator: &Locator,
        name: &str,
    ) -> VerificarResult<Option<String>> {
        let handle = self.locate(locator).await?;
        self.dom.attribute(handle.id(), name).await
    }

    /// Whether the current page source contains the text.
    ///
    /// # Errors
    ///
    /// Fails when the page source cannot be read.
    pub async fn is_text_present(&self, text: &str) -> VerificarResult<bool> {
        Ok(self.dom.page_source().await?.contains(text))
    }

    // ------------------------------------------------------------------
    // Navigation and scrolling
    // ------------------------------------------------------------------

    /// Navigate to a URL, optionally waiting for a marker fragment in the
    /// landed URL. Never fails the caller; failures are logged and reported
    /// as `false`.
    pub async fn navigate_to(&mut self, url: &str, expected_fragment: Option<&str>) -> bool {
        if let Err(err) = self.dom.navigate(url).await {
            tracing::error!(url, error = %err, "navigation failed");
            return false;
        }
        self.page_url = url.to_string();

        let Some(fragment) = expected_fragment else {
            return true;
        };
        let dom = &*self.dom;
        let landed = wait_until(self.wait, || async move {
            let current = dom.current_url().await?;
            Ok(current.contains(fragment).then_some(()))
        })
        .await;
        match landed {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(url, fragment, error = %err, "landing URL never matched");
                false
            }
        }
    }

    /// Browser back.
    ///
    /// # Errors
    ///
    /// Fails when the driver rejects the history move.
    pub async fn navigate_back(&self) -> VerificarResult<()> {
        self.dom.back().await
    }

    /// URL the browser currently reports.
    ///
    /// # Errors
    ///
    /// Fails when the driver cannot be queried.
    pub async fn current_url(&self) -> VerificarResult<String> {
        self.dom.current_url().await
    }

    /// Scroll the element into the viewport.
    ///
    /// # Errors
    ///
    /// Fails when the element cannot be resolved.
    pub async fn scroll_into_view(&self, locator: &Locator) -> VerificarResult<()> {
        let handle = self.locate(locator).await?;
        self.dom.scroll_into_view(handle.id()).await
    }

    /// Scroll the page to the top.
    ///
    /// # Errors
    ///
    /// Fails when the driver rejects the scroll.
    pub async fn scroll_to_top(&self) -> VerificarResult<()> {
        self.dom.scroll_to_top().await
    }

    /// Scroll the page to the bottom.
    ///
    /// # Errors
    ///
    /// Fails when the driver rejects the scroll.
    pub async fn scroll_to_bottom(&self) -> VerificarResult<()> {
        self.dom.scroll_to_bottom().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backend::{FakeAction, FakeDom, FakeElement};

    fn page_over(dom: &Arc<FakeDom>) -> Page {
        let mut page = Page::new(Arc::clone(dom) as Arc<dyn DomBackend>);
        // Short budgets keep the failure-path tests fast.
        page.change_wait(WaitPolicy::with_timeout(Duration::from_millis(200)));
        page
    }

    mod resolution {
        use super::*;

        #[tokio::test]
        async fn test_locate_waits_for_presence_then_visibility() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::id("slow");
            let id = dom
                .insert_for(
                    &locator,
                    FakeElement::visible()
                        .appears_in(Duration::from_millis(30))
                        .visible_in(Duration::from_millis(60)),
                )
                .unwrap();

            let handle = page_over(&dom).locate(&locator).await.unwrap();
            assert_eq!(handle.id(), id);
        }

        #[tokio::test]
        async fn test_locate_maps_timeout_to_element_not_found() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::id("absent");

            let err = page_over(&dom).locate(&locator).await.unwrap_err();
            match err {
                VerificarError::ElementNotFound { ref selector, .. } => {
                    assert!(selector.contains("absent"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_locate_rejects_mobile_only_kinds() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::new("launcher", crate::locator::LocatorKind::AccessibilityId);

            let err = page_over(&dom).locate(&locator).await.unwrap_err();
            assert!(matches!(err, VerificarError::UnsupportedLocator { .. }));
        }

        #[tokio::test]
        async fn test_hidden_element_never_resolves() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::css("div.veil");
            let _ = dom.insert_for(&locator, FakeElement::hidden()).unwrap();

            let err = page_over(&dom).locate(&locator).await.unwrap_err();
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn test_locate_all_requires_every_match_visible() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::css("li.row");
            let _ = dom.insert_for(&locator, FakeElement::visible()).unwrap();
            let _ = dom.insert_for(&locator, FakeElement::hidden()).unwrap();

            let err = page_over(&dom).locate_all(&locator).await.unwrap_err();
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn test_locate_all_returns_every_handle() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::css("li.row");
            let _ = dom.insert_for(&locator, FakeElement::visible()).unwrap();
            let _ = dom.insert_for(&locator, FakeElement::visible()).unwrap();

            let handles = page_over(&dom).locate_all(&locator).await.unwrap();
            assert_eq!(handles.len(), 2);
        }

        #[tokio::test]
        async fn test_exists_restores_suppression_state() {
            let dom = Arc::new(FakeDom::new());
            let page = page_over(&dom);
            let locator = Locator::id("ghost");

            assert!(!page.exists(&locator).await);
            assert!(!page.suppress_not_found.load(Ordering::SeqCst));

            let _ = dom.insert_for(&locator, FakeElement::visible()).unwrap();
            assert!(page.exists(&locator).await);
        }
    }

    mod interactions {
        use super::*;

        #[tokio::test]
        async fn test_click_scrolls_into_view_first() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::id("loginButton");
            let id = dom.insert_for(&locator, FakeElement::visible()).unwrap();

            page_over(&dom).click(&locator).await.unwrap();
            assert_eq!(
                dom.actions(),
                vec![FakeAction::ScrollIntoView(id), FakeAction::Click(id)]
            );
        }

        #[tokio::test]
        async fn test_force_click_present_skips_visibility() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::id("icmfContinueButton");
            let id = dom.insert_for(&locator, FakeElement::hidden()).unwrap();

            page_over(&dom).force_click_present(&locator).await.unwrap();
            assert_eq!(dom.actions(), vec![FakeAction::JsClick(id)]);
        }

        #[tokio::test]
        async fn test_type_text_clears_then_confirms_value() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::id("username");
            let id = dom
                .insert_for(
                    &locator,
                    FakeElement::visible().with_attribute("value", "stale"),
                )
                .unwrap();

            page_over(&dom).type_text(&locator, "alice").await.unwrap();
            assert_eq!(dom.value_of(id), Some("alice".to_string()));
            assert_eq!(
                dom.actions(),
                vec![
                    FakeAction::Clear(id),
                    FakeAction::Keys(id, "alice".to_string())
                ]
            );
        }

        #[tokio::test]
        async fn test_type_text_skips_disabled_field() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::id("frozen");
            let id = dom
                .insert_for(&locator, FakeElement::visible().disabled())
                .unwrap();

            page_over(&dom).type_text(&locator, "ignored").await.unwrap();
            assert_eq!(dom.value_of(id), None);
            assert!(dom.actions().is_empty());
        }

        #[tokio::test]
        async fn test_type_text_tolerates_unreadable_value() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::id("rich-editor");
            let _ = dom
                .insert_for(&locator, FakeElement::visible().ignoring_value_writes())
                .unwrap();

            page_over(&dom).type_text(&locator, "draft").await.unwrap();
        }

        #[tokio::test]
        async fn test_select_checkbox_clicks_only_on_mismatch() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::id("terms");
            let id = dom
                .insert_for(&locator, FakeElement::visible().selected(true))
                .unwrap();

            let page = page_over(&dom);
            page.select_checkbox(&locator, true).await.unwrap();
            assert!(dom.actions().is_empty());

            page.select_checkbox(&locator, false).await.unwrap();
            assert_eq!(dom.actions(), vec![FakeAction::Click(id)]);
        }
    }

    mod navigation {
        use super::*;

        #[tokio::test]
        async fn test_navigate_to_reports_failure_without_erroring() {
            let dom = Arc::new(FakeDom::new());
            dom.fail_navigation(true);

            let mut page = page_over(&dom);
            assert!(!page.navigate_to("https://example.test", None).await);
            assert!(page.url().is_empty());
        }

        #[tokio::test]
        async fn test_navigate_to_waits_for_landing_fragment() {
            let dom = Arc::new(FakeDom::new());
            dom.stub_redirect(
                "https://example.test/login",
                "https://example.test/cb?code=xyz",
            );

            let mut page = page_over(&dom);
            assert!(
                page.navigate_to("https://example.test/login", Some("code="))
                    .await
            );
            assert!(!page.navigate_to("https://example.test/other", Some("code=")).await);
        }

        #[tokio::test]
        async fn test_is_text_present_scans_page_source() {
            let dom = Arc::new(FakeDom::new());
            dom.set_page_source("<html><body>Welcome back</body></html>");

            let page = page_over(&dom);
            assert!(page.is_text_present("Welcome back").await.unwrap());
            assert!(!page.is_text_present("Goodbye").await.unwrap());
        }
    }

    mod reads {
        use super::*;

        #[tokio::test]
        async fn test_text_of_falls_back_to_inner_html() {
            let dom = Arc::new(FakeDom::new());
            let locator = Locator::css("span.badge");
            let _ = dom
                .insert_for(
                    &locator,
                    FakeElement::visible().with_attribute("innerHTML", "<b>3</b>"),
                )
                .unwrap();

            let text = page_over(&dom).text_of(&locator).await.unwrap();
            assert_eq!(text, "<b>3</b>");
        }
    }
}
