//! Real browser backend over the Chrome DevTools Protocol.
//!
//! Wraps a chromiumoxide [`Page`](chromiumoxide::page::Page) and keeps a
//! registry of resolved elements so the page layer can address them by
//! [`ElementId`]. Element state that CDP does not expose directly
//! (visibility, enablement, property reads) goes through a small JS bridge.

use super::{DomBackend, ElementId, ElementSnapshot};
use crate::locator::DomQuery;
use crate::result::{VerificarError, VerificarResult};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{
    Bounds, GetWindowForTargetParams, SetWindowBoundsParams, WindowState,
};
use chromiumoxide::cdp::browser_protocol::dom::BackendNodeId;
use chromiumoxide::cdp::browser_protocol::page::CloseParams;
use chromiumoxide::cdp::browser_protocol::storage::ClearCookiesParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CdpPage;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

const IS_DISPLAYED_FN: &str = "function() { \
    const r = this.getBoundingClientRect(); \
    const s = window.getComputedStyle(this); \
    return r.width > 0 && r.height > 0 \
        && s.visibility !== 'hidden' && s.display !== 'none'; \
}";

/// One registration per DOM node; re-polling a selector refreshes the
/// stored handle instead of growing the map for the life of a wait loop.
#[derive(Debug)]
struct ElementRegistry<N, H> {
    by_id: HashMap<ElementId, H>,
    by_node: HashMap<N, ElementId>,
    next_id: u64,
}

impl<N: Hash + Eq, H> ElementRegistry<N, H> {
    fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_node: HashMap::new(),
            next_id: 0,
        }
    }

    fn register(&mut self, node: N, handle: H) -> ElementId {
        if let Some(&id) = self.by_node.get(&node) {
            let _ = self.by_id.insert(id, handle);
            return id;
        }
        self.next_id += 1;
        let id = ElementId(self.next_id);
        let _ = self.by_node.insert(node, id);
        let _ = self.by_id.insert(id, handle);
        id
    }

    fn get(&self, id: ElementId) -> Option<&H> {
        self.by_id.get(&id)
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }

    fn clear(&mut self) {
        self.by_id.clear();
        self.by_node.clear();
    }
}

/// CDP-backed DOM implementation
#[derive(Debug)]
pub struct CdpDom {
    page: CdpPage,
    elements: Mutex<ElementRegistry<BackendNodeId, Arc<Element>>>,
}

impl CdpDom {
    /// Wrap an open CDP page
    #[must_use]
    pub fn new(page: CdpPage) -> Self {
        Self {
            page,
            elements: Mutex::new(ElementRegistry::new()),
        }
    }

    fn driver_err(e: impl std::fmt::Display) -> VerificarError {
        VerificarError::driver(e.to_string())
    }

    async fn register(&self, element: Element) -> ElementId {
        let node = element.backend_node_id.clone();
        self.elements.lock().await.register(node, Arc::new(element))
    }

    async fn element(&self, id: ElementId) -> VerificarResult<Arc<Element>> {
        self.elements
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| VerificarError::driver(format!("stale element id {}", id.0)))
    }

    async fn call_bool(&self, id: ElementId, function: &str) -> VerificarResult<bool> {
        let element = self.element(id).await?;
        let result = element
            .call_js_fn(function, false)
            .await
            .map_err(Self::driver_err)?;
        Ok(result
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn call_void(&self, id: ElementId, function: &str) -> VerificarResult<()> {
        let element = self.element(id).await?;
        let _ = element
            .call_js_fn(function, false)
            .await
            .map_err(Self::driver_err)?;
        Ok(())
    }

    async fn synthetic_mouse_event(&self, id: ElementId, event: &str) -> VerificarResult<()> {
        let function = format!(
            "function() {{ this.dispatchEvent(new MouseEvent('{event}', \
             {{ bubbles: true, cancelable: true, view: window }})); }}"
        );
        self.call_void(id, &function).await
    }
}

#[async_trait]
impl DomBackend for CdpDom {
    async fn find_all(&self, query: &DomQuery) -> VerificarResult<Vec<ElementSnapshot>> {
        let found = match query {
            DomQuery::Css(selector) => self.page.find_elements(selector.as_str()).await,
            DomQuery::XPath(expression) => self.page.find_xpaths(expression.as_str()).await,
        };
        // No match surfaces as an error in chromiumoxide; the wait layer
        // expects an empty poll instead.
        let elements = match found {
            Ok(elements) => elements,
            Err(_) => return Ok(Vec::new()),
        };

        let mut snapshots = Vec::with_capacity(elements.len());
        for element in elements {
            let id = self.register(element).await;
            let displayed = self.call_bool(id, IS_DISPLAYED_FN).await.unwrap_or(false);
            snapshots.push(ElementSnapshot { id, displayed });
        }
        Ok(snapshots)
    }

    async fn click(&self, id: ElementId) -> VerificarResult<()> {
        let element = self.element(id).await?;
        let _ = element.click().await.map_err(Self::driver_err)?;
        Ok(())
    }

    async fn js_click(&self, id: ElementId) -> VerificarResult<()> {
        self.call_void(id, "function() { this.click(); }").await
    }

    async fn double_click(&self, id: ElementId) -> VerificarResult<()> {
        self.synthetic_mouse_event(id, "dblclick").await
    }

    async fn right_click(&self, id: ElementId) -> VerificarResult<()> {
        self.synthetic_mouse_event(id, "contextmenu").await
    }

    async fn hover(&self, id: ElementId) -> VerificarResult<()> {
        let element = self.element(id).await?;
        let point = element.clickable_point().await.map_err(Self::driver_err)?;
        let _ = self.page.move_mouse(point).await.map_err(Self::driver_err)?;
        Ok(())
    }

    async fn drag_and_drop(&self, source: ElementId, target: ElementId) -> VerificarResult<()> {
        let from = self.element(source).await?;
        let to = self.element(target).await?;
        let start = from.clickable_point().await.map_err(Self::driver_err)?;
        let end = to.clickable_point().await.map_err(Self::driver_err)?;

        let _ = self.page.move_mouse(start).await.map_err(Self::driver_err)?;
        let _ = self.page.click(start).await.map_err(Self::driver_err)?;
        let _ = self.page.move_mouse(end).await.map_err(Self::driver_err)?;
        let _ = self.page.click(end).await.map_err(Self::driver_err)?;
        Ok(())
    }

    async fn clear(&self, id: ElementId) -> VerificarResult<()> {
        self.call_void(
            id,
            "function() { this.value = ''; \
             this.dispatchEvent(new Event('input', { bubbles: true })); }",
        )
        .await
    }

    async fn send_keys(&self, id: ElementId, text: &str) -> VerificarResult<()> {
        let element = self.element(id).await?;
        let _ = element.click().await.map_err(Self::driver_err)?;
        let _ = element.type_str(text).await.map_err(Self::driver_err)?;
        Ok(())
    }

    async fn attribute(&self, id: ElementId, name: &str) -> VerificarResult<Option<String>> {
        // Property first, attribute as fallback, matching WebDriver reads.
        // Attribute names come from library code, not user input.
        let element = self.element(id).await?;
        let function = format!(
            "function() {{ \
             const v = this['{name}'] !== undefined ? this['{name}'] : this.getAttribute('{name}'); \
             return v === null || v === undefined ? null : String(v); }}"
        );
        let result = element
            .call_js_fn(&function, false)
            .await
            .map_err(Self::driver_err)?;
        Ok(result
            .result
            .value
            .and_then(|v| v.as_str().map(String::from)))
    }

    async fn text(&self, id: ElementId) -> VerificarResult<String> {
        let element = self.element(id).await?;
        let text = element.inner_text().await.map_err(Self::driver_err)?;
        Ok(text.unwrap_or_default())
    }

    async fn is_displayed(&self, id: ElementId) -> VerificarResult<bool> {
        self.call_bool(id, IS_DISPLAYED_FN).await
    }

    async fn is_enabled(&self, id: ElementId) -> VerificarResult<bool> {
        self.call_bool(id, "function() { return !this.disabled; }")
            .await
    }

    async fn is_selected(&self, id: ElementId) -> VerificarResult<bool> {
        self.call_bool(id, "function() { return !!(this.checked || this.selected); }")
            .await
    }

    async fn scroll_into_view(&self, id: ElementId) -> VerificarResult<()> {
        let element = self.element(id).await?;
        let _ = element.scroll_into_view().await.map_err(Self::driver_err)?;
        Ok(())
    }

    async fn scroll_to_top(&self) -> VerificarResult<()> {
        let _ = self
            .page
            .evaluate("window.scrollTo(0, 0)")
            .await
            .map_err(Self::driver_err)?;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> VerificarResult<()> {
        let _ = self
            .page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map_err(Self::driver_err)?;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> VerificarResult<()> {
        // Handles resolved on the previous document are gone after this.
        self.elements.lock().await.clear();
        let _ = self
            .page
            .goto(url)
            .await
            .map_err(|e| VerificarError::navigation(url, e.to_string()))?;
        let _ = self
            .page
            .wait_for_navigation()
            .await
            .map_err(|e| VerificarError::navigation(url, e.to_string()))?;
        Ok(())
    }

    async fn back(&self) -> VerificarResult<()> {
        self.elements.lock().await.clear();
        let _ = self
            .page
            .evaluate("history.back()")
            .await
            .map_err(Self::driver_err)?;
        Ok(())
    }

    async fn current_url(&self) -> VerificarResult<String> {
        let url = self.page.url().await.map_err(Self::driver_err)?;
        Ok(url.unwrap_or_default())
    }

    async fn page_source(&self) -> VerificarResult<String> {
        self.page.content().await.map_err(Self::driver_err)
    }

    async fn delete_all_cookies(&self) -> VerificarResult<()> {
        let _ = self
            .page
            .execute(ClearCookiesParams::default())
            .await
            .map_err(Self::driver_err)?;
        Ok(())
    }

    async fn maximize_window(&self) -> VerificarResult<()> {
        let window = self
            .page
            .execute(GetWindowForTargetParams::default())
            .await
            .map_err(Self::driver_err)?;
        let bounds = Bounds {
            left: None,
            top: None,
            width: None,
            height: None,
            window_state: Some(WindowState::Maximized),
        };
        let params = SetWindowBoundsParams::builder()
            .window_id(window.window_id.clone())
            .bounds(bounds)
            .build()
            .map_err(VerificarError::driver)?;
        let _ = self.page.execute(params).await.map_err(Self::driver_err)?;
        Ok(())
    }

    async fn close(&self) -> VerificarResult<()> {
        self.elements.lock().await.clear();
        let _ = self
            .page
            .execute(CloseParams::default())
            .await
            .map_err(|e| VerificarError::teardown(e.to_string()))?;
        Ok(())
    }
}
