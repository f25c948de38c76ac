//! Declarative session capability descriptors.
//!
//! A descriptor is constructed once per session, is immutable after
//! construction, and is consumed by the driver registry, which translates it
//! into browser-specific launch arguments.

/// Browser families the driver registry knows how to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFamily {
    /// Chromium/Chrome
    Chrome,
    /// Firefox
    Firefox,
    /// Safari
    Safari,
}

/// Declarative parameters describing the desired browser/session environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    /// Browser name (e.g., "chrome")
    pub browser: String,
    /// Browser version ("latest" accepted)
    pub browser_version: String,
    /// Platform name (e.g., "Windows")
    pub platform_name: String,
    /// Platform version
    pub platform_version: String,
    /// Device name, for device-cloud runs
    pub device_name: Option<String>,
    /// Device manufacturer
    pub manufacturer: Option<String>,
    /// Device model
    pub model: Option<String>,
    /// Device location
    pub location: Option<String>,
    /// Window resolution, `WIDTHxHEIGHT`
    pub resolution: Option<String>,
    /// Launch in incognito/private mode
    pub incognito: bool,
    /// Launch headless
    pub headless: bool,
}

impl CapabilityDescriptor {
    /// Create a descriptor for the given browser/platform pair
    #[must_use]
    pub fn new(
        browser: impl Into<String>,
        browser_version: impl Into<String>,
        platform_name: impl Into<String>,
        platform_version: impl Into<String>,
    ) -> Self {
        Self {
            browser: browser.into(),
            browser_version: browser_version.into(),
            platform_name: platform_name.into(),
            platform_version: platform_version.into(),
            device_name: None,
            manufacturer: None,
            model: None,
            location: None,
            resolution: None,
            incognito: false,
            headless: false,
        }
    }

    /// Incognito Chrome, headless on demand, as CI runs it
    #[must_use]
    pub fn headless_chrome(headless: bool) -> Self {
        let mut caps = Self::new("chrome", "latest", "", "");
        caps.incognito = true;
        caps.headless = headless;
        caps
    }

    /// Set incognito mode
    #[must_use]
    pub const fn with_incognito(mut self, incognito: bool) -> Self {
        self.incognito = incognito;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the window resolution (`WIDTHxHEIGHT`)
    #[must_use]
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    /// Set the device location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set device identity (name, manufacturer, model)
    #[must_use]
    pub fn with_device(
        mut self,
        name: impl Into<String>,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        self.device_name = Some(name.into());
        self.manufacturer = Some(manufacturer.into());
        self.model = Some(model.into());
        self
    }

    /// The browser family this descriptor maps to, if recognized
    #[must_use]
    pub fn browser_family(&self) -> Option<BrowserFamily> {
        match self.browser.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Some(BrowserFamily::Chrome),
            "firefox" => Some(BrowserFamily::Firefox),
            "safari" => Some(BrowserFamily::Safari),
            _ => None,
        }
    }

    /// Chromium launch arguments implied by the descriptor flags
    #[must_use]
    pub fn chrome_args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();
        if self.incognito {
            args.push("--incognito");
        }
        if self.headless {
            args.push("--headless");
            args.push("--disable-gpu");
            args.push("--no-sandbox");
            args.push("--disable-dev-shm-usage");
        }
        args
    }

    /// Parse the resolution into a `(width, height)` pair
    #[must_use]
    pub fn window_size(&self) -> Option<(u32, u32)> {
        let resolution = self.resolution.as_deref()?;
        let (w, h) = resolution.split_once('x')?;
        Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_chrome_is_incognito() {
        let caps = CapabilityDescriptor::headless_chrome(true);
        assert!(caps.incognito);
        assert!(caps.headless);
        assert_eq!(caps.browser_family(), Some(BrowserFamily::Chrome));
    }

    #[test]
    fn test_chrome_args_translation() {
        let caps = CapabilityDescriptor::headless_chrome(true);
        let args = caps.chrome_args();
        assert!(args.contains(&"--incognito"));
        assert!(args.contains(&"--headless"));
        assert!(args.contains(&"--disable-gpu"));
        assert!(args.contains(&"--no-sandbox"));
        assert!(args.contains(&"--disable-dev-shm-usage"));
    }

    #[test]
    fn test_headed_non_incognito_has_no_args() {
        let caps = CapabilityDescriptor::new("chrome", "latest", "Windows", "10");
        assert!(caps.chrome_args().is_empty());
    }

    #[test]
    fn test_browser_family_is_case_insensitive() {
        assert_eq!(
            CapabilityDescriptor::new("Chrome", "latest", "", "").browser_family(),
            Some(BrowserFamily::Chrome)
        );
        assert_eq!(
            CapabilityDescriptor::new("FIREFOX", "latest", "", "").browser_family(),
            Some(BrowserFamily::Firefox)
        );
        assert_eq!(
            CapabilityDescriptor::new("netscape", "latest", "", "").browser_family(),
            None
        );
    }

    #[test]
    fn test_window_size_parsing() {
        let caps = CapabilityDescriptor::new("chrome", "latest", "Windows", "10")
            .with_resolution("1280x1024");
        assert_eq!(caps.window_size(), Some((1280, 1024)));

        let bad = CapabilityDescriptor::new("chrome", "latest", "Windows", "10")
            .with_resolution("fullscreen");
        assert_eq!(bad.window_size(), None);
    }
}
