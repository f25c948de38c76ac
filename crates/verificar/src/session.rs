//! Session lifecycle: driver services, session creation, teardown.
//!
//! [`DriverRegistry`] replaces any notion of a global driver singleton:
//! callers create a registry, ask it for sessions, and shut it down when the
//! suite ends. With the `browser` feature a Chrome service is launched
//! lazily and reused across sessions; without it sessions run over the
//! in-memory [`FakeDom`](crate::backend::FakeDom).

use crate::backend::DomBackend;
use crate::capabilities::{BrowserFamily, CapabilityDescriptor};
use crate::page::Page;
use crate::result::{VerificarError, VerificarResult};
use std::sync::Arc;

#[cfg(not(feature = "browser"))]
use crate::backend::FakeDom;

/// One live browser session.
///
/// Holds the backend and the capabilities it was created with. Dropping the
/// handle does not close the browser; call [`SessionHandle::quit`].
#[derive(Debug)]
pub struct SessionHandle {
    dom: Arc<dyn DomBackend>,
    descriptor: CapabilityDescriptor,
}

impl SessionHandle {
    /// Assemble a session over an existing backend
    #[must_use]
    pub fn from_parts(dom: Arc<dyn DomBackend>, descriptor: CapabilityDescriptor) -> Self {
        Self { dom, descriptor }
    }

    /// The backend this session runs over
    #[must_use]
    pub fn dom(&self) -> Arc<dyn DomBackend> {
        Arc::clone(&self.dom)
    }

    /// Capabilities the session was created with
    #[must_use]
    pub const fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    /// A fresh page view over this session
    #[must_use]
    pub fn page(&self) -> Page {
        Page::new(Arc::clone(&self.dom))
    }

    /// Open a URL and hand back a page already pointed at it
    pub async fn open(&self, url: &str) -> Page {
        let mut page = self.page();
        let _ = page.navigate_to(url, None).await;
        page
    }

    /// Close the session.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::Teardown`] when the browser cannot be
    /// closed cleanly.
    pub async fn quit(self) -> VerificarResult<()> {
        self.dom.close().await
    }
}

/// Explicit owner of driver services and session creation.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    #[cfg(feature = "browser")]
    chrome: tokio::sync::Mutex<Option<browser::ChromeService>>,
}

impl DriverRegistry {
    /// Create an empty registry; no service is launched until the first
    /// session asks for one
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for the requested capabilities.
    ///
    /// Every new session starts from a clean slate: cookies are cleared and
    /// the window maximized before the handle is returned.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::SessionCreation`] for browsers the
    /// registry has no service for, or when the service fails to launch.
    pub async fn create_session(
        &self,
        descriptor: &CapabilityDescriptor,
    ) -> VerificarResult<SessionHandle> {
        let family = descriptor.browser_family().ok_or_else(|| {
            VerificarError::session_creation(format!(
                "unsupported browser '{}'",
                descriptor.browser
            ))
        })?;

        tracing::info!(
            browser = %descriptor.browser,
            version = %descriptor.browser_version,
            platform = %descriptor.platform_name,
            headless = descriptor.headless,
            "creating session"
        );

        let dom = self.backend_for(family, descriptor).await?;
        dom.delete_all_cookies().await?;
        dom.maximize_window().await?;

        Ok(SessionHandle::from_parts(dom, descriptor.clone()))
    }

    #[cfg(feature = "browser")]
    async fn backend_for(
        &self,
        family: BrowserFamily,
        descriptor: &CapabilityDescriptor,
    ) -> VerificarResult<Arc<dyn DomBackend>> {
        match family {
            BrowserFamily::Chrome => {
                let mut guard = self.chrome.lock().await;
                if guard.is_none() {
                    *guard = Some(browser::ChromeService::launch(descriptor).await?);
                }
                let service = guard
                    .as_ref()
                    .ok_or_else(|| VerificarError::session_creation("chrome service vanished"))?;
                service.new_session().await
            }
            BrowserFamily::Firefox | BrowserFamily::Safari => Err(
                VerificarError::session_creation(format!("no local service for {family:?}")),
            ),
        }
    }

    #[cfg(not(feature = "browser"))]
    #[allow(clippy::unused_async)]
    async fn backend_for(
        &self,
        family: BrowserFamily,
        _descriptor: &CapabilityDescriptor,
    ) -> VerificarResult<Arc<dyn DomBackend>> {
        tracing::debug!(?family, "browser feature disabled, using in-memory backend");
        Ok(Arc::new(FakeDom::new()))
    }

    /// Shut down every service the registry launched.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::Teardown`] when a service refuses to die.
    pub async fn shutdown(&self) -> VerificarResult<()> {
        #[cfg(feature = "browser")]
        {
            if let Some(service) = self.chrome.lock().await.take() {
                service.shutdown().await?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "browser")]
mod browser {
    use super::{Arc, CapabilityDescriptor, DomBackend, VerificarError, VerificarResult};
    use crate::backend::cdp::CdpDom;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use futures::StreamExt;
    use tokio::sync::Mutex;

    /// Locally launched Chrome, reused across sessions
    #[derive(Debug)]
    pub(super) struct ChromeService {
        inner: Mutex<CdpBrowser>,
        #[allow(dead_code)]
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromeService {
        pub(super) async fn launch(
            descriptor: &CapabilityDescriptor,
        ) -> VerificarResult<Self> {
            let mut builder = CdpConfig::builder().args(descriptor.chrome_args());

            if !descriptor.headless {
                builder = builder.with_head();
            }
            if let Some((width, height)) = descriptor.window_size() {
                builder = builder.window_size(width, height);
            }

            let config = builder
                .build()
                .map_err(VerificarError::session_creation)?;

            let (browser, mut handler) = CdpBrowser::launch(config)
                .await
                .map_err(|e| VerificarError::session_creation(e.to_string()))?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            Ok(Self {
                inner: Mutex::new(browser),
                handle,
            })
        }

        pub(super) async fn new_session(&self) -> VerificarResult<Arc<dyn DomBackend>> {
            let browser = self.inner.lock().await;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| VerificarError::session_creation(e.to_string()))?;
            Ok(Arc::new(CdpDom::new(page)))
        }

        pub(super) async fn shutdown(self) -> VerificarResult<()> {
            let mut browser = self.inner.into_inner();
            browser
                .close()
                .await
                .map_err(|e| VerificarError::teardown(e.to_string()))?;
            Ok(())
        }
    }
}

#[cfg(all(test, not(feature = "browser")))]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backend::FakeDom;

    #[tokio::test]
    async fn test_create_session_starts_from_clean_state() {
        let registry = DriverRegistry::new();
        let descriptor = CapabilityDescriptor::headless_chrome(true);

        let session = registry.create_session(&descriptor).await.unwrap();
        assert_eq!(session.descriptor().browser, "Chrome");
        session.quit().await.unwrap();
        registry.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_browser_is_rejected() {
        let registry = DriverRegistry::new();
        let descriptor =
            CapabilityDescriptor::new("Netscape", "4.8", "Windows", "98");

        let err = registry.create_session(&descriptor).await.unwrap_err();
        assert!(matches!(err, VerificarError::SessionCreation { .. }));
    }

    #[tokio::test]
    async fn test_session_over_explicit_backend() {
        let dom = Arc::new(FakeDom::new());
        let session = SessionHandle::from_parts(
            Arc::clone(&dom) as Arc<dyn DomBackend>,
            CapabilityDescriptor::headless_chrome(true),
        );

        let page = session.open("https://example.test").await;
        assert_eq!(page.url(), "https://example.test");
        session.quit().await.unwrap();
        assert!(dom.was_closed());
    }
}
