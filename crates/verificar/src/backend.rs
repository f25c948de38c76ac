//! DOM backend seam between page-object logic and the driver.
//!
//! [`DomBackend`] is the async boundary the page layer talks to. The real
//! CDP implementation lives behind the `browser` feature ([`cdp`]); the
//! scriptable in-memory [`FakeDom`] is always compiled and backs mock
//! sessions and unit tests.

use crate::locator::{DomQuery, Locator};
use crate::result::{VerificarError, VerificarResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[cfg(feature = "browser")]
pub mod cdp;

/// Opaque element identity within one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Backend view of one matched element at poll time
#[derive(Debug, Clone, Copy)]
pub struct ElementSnapshot {
    /// Element identity
    pub id: ElementId,
    /// Whether the element is currently visible
    pub displayed: bool,
}

/// Opaque reference to a resolved element.
///
/// Valid only for the current page state; navigation invalidates it. The
/// page layer mediates lookup and hands the handle back to the caller.
#[derive(Debug, Clone)]
pub struct ElementHandle {
    id: ElementId,
    selector: String,
}

impl ElementHandle {
    pub(crate) fn new(id: ElementId, locator: &Locator) -> Self {
        Self {
            id,
            selector: locator.to_string(),
        }
    }

    /// Backend identity of the element
    #[must_use]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// The locator this handle was resolved from, for diagnostics
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl PartialEq for ElementHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Async boundary between page objects and the underlying driver.
///
/// Every method performs exactly one primitive operation; retries and waits
/// live in the page layer.
#[async_trait]
pub trait DomBackend: Send + Sync + std::fmt::Debug {
    /// All elements currently matching the query, with visibility state
    async fn find_all(&self, query: &DomQuery) -> VerificarResult<Vec<ElementSnapshot>>;

    /// Native click
    async fn click(&self, id: ElementId) -> VerificarResult<()>;
    /// Scripting-bridge click, bypassing native dispatch
    async fn js_click(&self, id: ElementId) -> VerificarResult<()>;
    /// Native double click
    async fn double_click(&self, id: ElementId) -> VerificarResult<()>;
    /// Native context click
    async fn right_click(&self, id: ElementId) -> VerificarResult<()>;
    /// Move the pointer over the element
    async fn hover(&self, id: ElementId) -> VerificarResult<()>;
    /// Drag `source` onto `target`
    async fn drag_and_drop(&self, source: ElementId, target: ElementId) -> VerificarResult<()>;

    /// Clear an input field
    async fn clear(&self, id: ElementId) -> VerificarResult<()>;
    /// Send text to an input field
    async fn send_keys(&self, id: ElementId, text: &str) -> VerificarResult<()>;

    /// Read an attribute/property, `None` when absent
    async fn attribute(&self, id: ElementId, name: &str) -> VerificarResult<Option<String>>;
    /// Rendered text content
    async fn text(&self, id: ElementId) -> VerificarResult<String>;
    /// Whether the element is visible
    async fn is_displayed(&self, id: ElementId) -> VerificarResult<bool>;
    /// Whether the element is enabled
    async fn is_enabled(&self, id: ElementId) -> VerificarResult<bool>;
    /// Whether the element (checkbox/option) is selected
    async fn is_selected(&self, id: ElementId) -> VerificarResult<bool>;

    /// Scroll the element into the viewport
    async fn scroll_into_view(&self, id: ElementId) -> VerificarResult<()>;
    /// Scroll the page to the top
    async fn scroll_to_top(&self) -> VerificarResult<()>;
    /// Scroll the page to the bottom
    async fn scroll_to_bottom(&self) -> VerificarResult<()>;

    /// Load a URL
    async fn navigate(&self, url: &str) -> VerificarResult<()>;
    /// Browser back
    async fn back(&self) -> VerificarResult<()>;
    /// Current URL
    async fn current_url(&self) -> VerificarResult<String>;
    /// Full page source
    async fn page_source(&self) -> VerificarResult<String>;

    /// Delete all cookies for the session
    async fn delete_all_cookies(&self) -> VerificarResult<()>;
    /// Maximize the window
    async fn maximize_window(&self) -> VerificarResult<()>;
    /// Tear the session down
    async fn close(&self) -> VerificarResult<()>;
}

// ============================================================================
// FakeDom: scriptable in-memory backend
// ============================================================================

/// One primitive action observed by the fake backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeAction {
    /// Native click
    Click(ElementId),
    /// Scripting-bridge click
    JsClick(ElementId),
    /// Double click
    DoubleClick(ElementId),
    /// Context click
    RightClick(ElementId),
    /// Pointer hover
    Hover(ElementId),
    /// Drag source onto target
    DragAndDrop(ElementId, ElementId),
    /// Field cleared
    Clear(ElementId),
    /// Text sent to a field
    Keys(ElementId, String),
    /// Element scrolled into view
    ScrollIntoView(ElementId),
    /// Page scrolled to top
    ScrollTop,
    /// Page scrolled to bottom
    ScrollBottom,
    /// Browser back
    Back,
}

/// Scripted state for one fake element
#[derive(Debug, Clone)]
pub struct FakeElement {
    displayed: bool,
    enabled: bool,
    selected: bool,
    text: String,
    attributes: HashMap<String, String>,
    appear_delay: Option<Duration>,
    visible_delay: Option<Duration>,
    ignore_value_writes: bool,
}

impl FakeElement {
    /// A present, visible, enabled element
    #[must_use]
    pub fn visible() -> Self {
        Self {
            displayed: true,
            enabled: true,
            selected: false,
            text: String::new(),
            attributes: HashMap::new(),
            appear_delay: None,
            visible_delay: None,
            ignore_value_writes: false,
        }
    }

    /// A present but invisible element
    #[must_use]
    pub fn hidden() -> Self {
        let mut el = Self::visible();
        el.displayed = false;
        el
    }

    /// Set the rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark the element disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Mark the element selected (checkbox/option state)
    #[must_use]
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Element enters the DOM only after `delay`
    #[must_use]
    pub const fn appears_in(mut self, delay: Duration) -> Self {
        self.appear_delay = Some(delay);
        self
    }

    /// Element is present immediately but visible only after `delay`
    #[must_use]
    pub const fn visible_in(mut self, delay: Duration) -> Self {
        let mut el = self;
        el.displayed = true;
        el.visible_delay = Some(delay);
        el
    }

    /// Field drops all value writes and reports no `value` attribute
    #[must_use]
    pub const fn ignoring_value_writes(mut self) -> Self {
        self.ignore_value_writes = true;
        self
    }
}

#[derive(Debug)]
struct FakeEntry {
    id: ElementId,
    query_key: String,
    element: FakeElement,
    inserted_at: Instant,
}

#[derive(Debug, Default)]
struct FakeState {
    entries: Vec<FakeEntry>,
    next_id: u64,
    url: String,
    history: Vec<String>,
    redirects: HashMap<String, String>,
    page_source: String,
    actions: Vec<FakeAction>,
    cookies_cleared: bool,
    maximized: bool,
    closed: bool,
    fail_close: bool,
    fail_navigation: bool,
}

/// Scriptable in-memory DOM used by mock sessions and unit tests.
///
/// Elements are registered against the exact query string their locator
/// translates to; appearance and visibility can be delayed to exercise the
/// wait machinery.
#[derive(Debug, Default)]
pub struct FakeDom {
    state: Mutex<FakeState>,
}

impl FakeDom {
    /// Create an empty fake DOM
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an element under an explicit query key
    pub fn insert(&self, query_key: impl Into<String>, element: FakeElement) -> ElementId {
        let mut state = self.state();
        state.next_id += 1;
        let id = ElementId(state.next_id);
        state.entries.push(FakeEntry {
            id,
            query_key: query_key.into(),
            element,
            inserted_at: Instant::now(),
        });
        id
    }

    /// Register an element under the query a locator resolves to.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::UnsupportedLocator`] for non-web kinds.
    pub fn insert_for(&self, locator: &Locator, element: FakeElement) -> VerificarResult<ElementId> {
        let query = locator.resolution_query()?;
        Ok(self.insert(query.as_str().to_string(), element))
    }

    /// Drop every element a locator resolves to
    pub fn remove_for(&self, locator: &Locator) {
        if let Ok(query) = locator.resolution_query() {
            self.state()
                .entries
                .retain(|entry| entry.query_key != query.as_str());
        }
    }

    /// Script a navigation to land on a different URL
    pub fn stub_redirect(&self, from: impl Into<String>, to: impl Into<String>) {
        let _ = self.state().redirects.insert(from.into(), to.into());
    }

    /// Make subsequent navigations fail
    pub fn fail_navigation(&self, fail: bool) {
        self.state().fail_navigation = fail;
    }

    /// Make `close` fail, for teardown-path tests
    pub fn fail_close(&self, fail: bool) {
        self.state().fail_close = fail;
    }

    /// Set the page source returned by the backend
    pub fn set_page_source(&self, source: impl Into<String>) {
        self.state().page_source = source.into();
    }

    /// Recorded primitive actions, in order
    #[must_use]
    pub fn actions(&self) -> Vec<FakeAction> {
        self.state().actions.clone()
    }

    /// Whether cookies were cleared
    #[must_use]
    pub fn cookies_cleared(&self) -> bool {
        self.state().cookies_cleared
    }

    /// Whether the window was maximized
    #[must_use]
    pub fn maximized(&self) -> bool {
        self.state().maximized
    }

    /// Whether the session was closed
    #[must_use]
    pub fn was_closed(&self) -> bool {
        self.state().closed
    }

    /// Current value attribute of an element, for assertions
    #[must_use]
    pub fn value_of(&self, id: ElementId) -> Option<String> {
        let state = self.state();
        state
            .entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.element.attributes.get("value").cloned())
    }

    fn with_element<T>(
        &self,
        id: ElementId,
        f: impl FnOnce(&mut FakeEntry, &mut Vec<FakeAction>) -> T,
    ) -> VerificarResult<T> {
        let mut state = self.state();
        let state = &mut *state;
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| VerificarError::driver(format!("stale element id {}", id.0)))?;
        Ok(f(entry, &mut state.actions))
    }

    fn is_present(entry: &FakeEntry) -> bool {
        entry
            .element
            .appear_delay
            .map_or(true, |d| entry.inserted_at.elapsed() >= d)
    }

    fn is_visible(entry: &FakeEntry) -> bool {
        entry.element.displayed
            && entry
                .element
                .visible_delay
                .map_or(true, |d| entry.inserted_at.elapsed() >= d)
    }
}

#[async_trait]
impl DomBackend for FakeDom {
    async fn find_all(&self, query: &DomQuery) -> VerificarResult<Vec<ElementSnapshot>> {
        let state = self.state();
        Ok(state
            .entries
            .iter()
            .filter(|e| e.query_key == query.as_str() && Self::is_present(e))
            .map(|e| ElementSnapshot {
                id: e.id,
                displayed: Self::is_visible(e),
            })
            .collect())
    }

    async fn click(&self, id: ElementId) -> VerificarResult<()> {
        self.with_element(id, |_, actions| actions.push(FakeAction::Click(id)))
    }

    async fn js_click(&self, id: ElementId) -> VerificarResult<()> {
        self.with_element(id, |_, actions| actions.push(FakeAction::JsClick(id)))
    }

    async fn double_click(&self, id: ElementId) -> VerificarResult<()> {
        self.with_element(id, |_, actions| actions.push(FakeAction::DoubleClick(id)))
    }

    async fn right_click(&self, id: ElementId) -> VerificarResult<()> {
        self.with_element(id, |_, actions| actions.push(FakeAction::RightClick(id)))
    }

    async fn hover(&self, id: ElementId) -> VerificarResult<()> {
        self.with_element(id, |_, actions| actions.push(FakeAction::Hover(id)))
    }

    async fn drag_and_drop(&self, source: ElementId, target: ElementId) -> VerificarResult<()> {
        self.with_element(source, |_, actions| {
            actions.push(FakeAction::DragAndDrop(source, target));
        })
    }

    async fn clear(&self, id: ElementId) -> VerificarResult<()> {
        self.with_element(id, |entry, actions| {
            if !entry.element.ignore_value_writes {
                let _ = entry
                    .element
                    .attributes
                    .insert("value".to_string(), String::new());
            }
            actions.push(FakeAction::Clear(id));
        })
    }

    async fn send_keys(&self, id: ElementId, text: &str) -> VerificarResult<()> {
        self.with_element(id, |entry, actions| {
            if !entry.element.ignore_value_writes {
                let value = entry
                    .element
                    .attributes
                    .entry("value".to_string())
                    .or_default();
                value.push_str(text);
            }
            actions.push(FakeAction::Keys(id, text.to_string()));
        })
    }

    async fn attribute(&self, id: ElementId, name: &str) -> VerificarResult<Option<String>> {
        self.with_element(id, |entry, _| entry.element.attributes.get(name).cloned())
    }

    async fn text(&self, id: ElementId) -> VerificarResult<String> {
        self.with_element(id, |entry, _| entry.element.text.clone())
    }

    async fn is_displayed(&self, id: ElementId) -> VerificarResult<bool> {
        self.with_element(id, |entry, _| FakeDom::is_visible(entry))
    }

    async fn is_enabled(&self, id: ElementId) -> VerificarResult<bool> {
        self.with_element(id, |entry, _| entry.element.enabled)
    }

    async fn is_selected(&self, id: ElementId) -> VerificarResult<bool> {
        self.with_element(id, |entry, _| entry.element.selected)
    }

    async fn scroll_into_view(&self, id: ElementId) -> VerificarResult<()> {
        self.with_element(id, |_, actions| actions.push(FakeAction::ScrollIntoView(id)))
    }

    async fn scroll_to_top(&self) -> VerificarResult<()> {
        self.state().actions.push(FakeAction::ScrollTop);
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> VerificarResult<()> {
        self.state().actions.push(FakeAction::ScrollBottom);
        Ok(())
    }

    async fn navigate(&self, url: &str) -> VerificarResult<()> {
        let mut state = self.state();
        if state.fail_navigation {
            return Err(VerificarError::navigation(url, "connection refused"));
        }
        let landed = state
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        let previous = std::mem::replace(&mut state.url, landed);
        if !previous.is_empty() {
            state.history.push(previous);
        }
        Ok(())
    }

    async fn back(&self) -> VerificarResult<()> {
        let mut state = self.state();
        if let Some(previous) = state.history.pop() {
            state.url = previous;
        }
        state.actions.push(FakeAction::Back);
        Ok(())
    }

    async fn current_url(&self) -> VerificarResult<String> {
        Ok(self.state().url.clone())
    }

    async fn page_source(&self) -> VerificarResult<String> {
        Ok(self.state().page_source.clone())
    }

    async fn delete_all_cookies(&self) -> VerificarResult<()> {
        self.state().cookies_cleared = true;
        Ok(())
    }

    async fn maximize_window(&self) -> VerificarResult<()> {
        self.state().maximized = true;
        Ok(())
    }

    async fn close(&self) -> VerificarResult<()> {
        let mut state = self.state();
        if state.fail_close {
            return Err(VerificarError::teardown("browser process already gone"));
        }
        state.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::Locator;

    #[tokio::test]
    async fn test_find_all_matches_by_resolved_query() {
        let dom = FakeDom::new();
        let id = dom.insert_for(&Locator::id("username"), FakeElement::visible()).unwrap();

        let query = Locator::id("username").resolution_query().unwrap();
        let snaps = dom.find_all(&query).await.unwrap();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].id, id);
        assert!(snaps[0].displayed);

        let other = Locator::id("missing").resolution_query().unwrap();
        assert!(dom.find_all(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_appear_delay_hides_element_initially() {
        let dom = FakeDom::new();
        let _ = dom
            .insert_for(
                &Locator::css("div.late"),
                FakeElement::visible().appears_in(Duration::from_millis(40)),
            )
            .unwrap();

        let query = Locator::css("div.late").resolution_query().unwrap();
        assert!(dom.find_all(&query).await.unwrap().is_empty());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(dom.find_all(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_keys_tracks_value_after_clear() {
        let dom = FakeDom::new();
        let id = dom
            .insert_for(
                &Locator::id("field"),
                FakeElement::visible().with_attribute("value", "old"),
            )
            .unwrap();

        dom.clear(id).await.unwrap();
        dom.send_keys(id, "hello").await.unwrap();
        assert_eq!(dom.value_of(id), Some("hello".to_string()));
        assert_eq!(
            dom.actions(),
            vec![FakeAction::Clear(id), FakeAction::Keys(id, "hello".to_string())]
        );
    }

    #[tokio::test]
    async fn test_ignored_value_writes_report_no_attribute() {
        let dom = FakeDom::new();
        let id = dom
            .insert_for(
                &Locator::id("rich-editor"),
                FakeElement::visible().ignoring_value_writes(),
            )
            .unwrap();

        dom.send_keys(id, "hello").await.unwrap();
        assert_eq!(dom.attribute(id, "value").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stale_element_id_is_a_driver_fault() {
        let dom = FakeDom::new();
        let err = dom.click(ElementId(99)).await.unwrap_err();
        assert!(matches!(err, VerificarError::Driver { .. }));
    }

    #[tokio::test]
    async fn test_navigate_follows_stubbed_redirect_and_back() {
        let dom = FakeDom::new();
        dom.stub_redirect("https://example.test/login", "https://example.test/home?code=abc");

        dom.navigate("https://example.test/start").await.unwrap();
        dom.navigate("https://example.test/login").await.unwrap();
        assert_eq!(
            dom.current_url().await.unwrap(),
            "https://example.test/home?code=abc"
        );

        dom.back().await.unwrap();
        assert_eq!(dom.current_url().await.unwrap(), "https://example.test/start");
    }

    #[tokio::test]
    async fn test_close_failure_is_a_teardown_fault() {
        let dom = FakeDom::new();
        dom.fail_close(true);
        let err = dom.close().await.unwrap_err();
        assert!(matches!(err, VerificarError::Teardown { .. }));
        assert!(!dom.was_closed());
    }
}
