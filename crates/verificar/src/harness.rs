//! Suite lifecycle: parameters, per-suite session, result accounting.

use crate::capabilities::CapabilityDescriptor;
use crate::config::ConfigResolver;
use crate::page::Page;
use crate::result::VerificarResult;
use crate::session::{DriverRegistry, SessionHandle};
use std::time::{Duration, Instant};

/// Suite-level parameters with their conventional defaults.
///
/// Every field can be overlaid from configuration before the suite starts.
#[derive(Debug, Clone)]
pub struct SuiteParams {
    /// Browser to run against
    pub browser: String,
    /// Requested browser version
    pub browser_version: String,
    /// Operating system name
    pub platform: String,
    /// Operating system version
    pub platform_version: String,
    /// Where the driver runs, `local` or `remote`
    pub run_location: String,
    /// Application base URL
    pub base_url: String,
    /// Requested window resolution
    pub resolution: String,
    /// Run the browser headless
    pub headless: bool,
    /// Run the browser incognito
    pub incognito: bool,
}

impl Default for SuiteParams {
    fn default() -> Self {
        Self {
            browser: "Chrome".to_string(),
            browser_version: "latest".to_string(),
            platform: "Windows".to_string(),
            platform_version: "10".to_string(),
            run_location: "local".to_string(),
            base_url: String::new(),
            resolution: "1280x1024".to_string(),
            headless: false,
            incognito: false,
        }
    }
}

impl SuiteParams {
    /// Overlay values from configuration onto the defaults.
    ///
    /// Recognized keys: `testPlatform` replaces the run location, `headless`
    /// and `incognito` parse as booleans, `baseUrl` replaces the base URL.
    /// Blank values leave the field untouched.
    pub fn overlay_config(&mut self, config: &ConfigResolver) {
        let run_location = config.resolve("testPlatform");
        if !run_location.is_empty() {
            self.run_location = run_location;
        }
        let base_url = config.resolve("baseUrl");
        if !base_url.is_empty() {
            self.base_url = base_url;
        }
        if let Ok(headless) = config.resolve("headless").parse() {
            self.headless = headless;
        }
        if let Ok(incognito) = config.resolve("incognito").parse() {
            self.incognito = incognito;
        }
    }

    /// Capabilities for a session matching these parameters
    #[must_use]
    pub fn to_descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            &self.browser,
            &self.browser_version,
            &self.platform,
            &self.platform_version,
        )
        .with_headless(self.headless)
        .with_incognito(self.incognito)
        .with_resolution(&self.resolution)
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Scenario duration
    pub duration: Duration,
}

impl TestResult {
    /// A passing result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// A failing result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Accumulated results for one suite run
#[derive(Debug, Clone)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual scenario results
    pub results: Vec<TestResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResults {
    /// Whether every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Number of passing scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Number of failing scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// The failing scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

/// Owner of the per-suite session and result accounting.
///
/// The harness creates one session at setup, hands out pages during the
/// run, and tears the session down at the end regardless of outcome.
#[derive(Debug)]
pub struct Harness {
    registry: DriverRegistry,
    session: Option<SessionHandle>,
    params: SuiteParams,
    suite_name: String,
    results: Vec<TestResult>,
    started: Instant,
}

impl Harness {
    /// Harness for a named suite
    #[must_use]
    pub fn new(suite_name: impl Into<String>, params: SuiteParams) -> Self {
        Self {
            registry: DriverRegistry::new(),
            session: None,
            params,
            suite_name: suite_name.into(),
            results: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Harness over a pre-built session, for scripted backends
    #[must_use]
    pub fn over_session(
        suite_name: impl Into<String>,
        params: SuiteParams,
        session: SessionHandle,
    ) -> Self {
        Self {
            registry: DriverRegistry::new(),
            session: Some(session),
            params,
            suite_name: suite_name.into(),
            results: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Suite parameters
    #[must_use]
    pub const fn params(&self) -> &SuiteParams {
        &self.params
    }

    /// Create the suite session.
    ///
    /// On failure the harness stays usable with no session; the error is
    /// logged and returned so the caller can abort or skip.
    ///
    /// # Errors
    ///
    /// Propagates session creation failures.
    pub async fn setup(&mut self) -> VerificarResult<()> {
        self.started = Instant::now();
        let descriptor = self.params.to_descriptor();
        match self.registry.create_session(&descriptor).await {
            Ok(session) => {
                self.session = Some(session);
                Ok(())
            }
            Err(err) => {
                tracing::error!(suite = %self.suite_name, error = %err, "suite setup failed");
                Err(err)
            }
        }
    }

    /// The live session, if setup succeeded
    #[must_use]
    pub const fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    /// A fresh page over the suite session
    #[must_use]
    pub fn page(&self) -> Option<Page> {
        self.session.as_ref().map(SessionHandle::page)
    }

    /// Record a scenario outcome
    pub fn record(&mut self, result: TestResult) {
        if result.passed {
            tracing::info!(scenario = %result.name, "scenario passed");
        } else {
            tracing::error!(
                scenario = %result.name,
                error = result.error.as_deref().unwrap_or(""),
                "scenario failed"
            );
        }
        self.results.push(result);
    }

    /// Close the session and the services behind it.
    ///
    /// Teardown never fails the suite; close errors are logged and
    /// swallowed so result reporting still happens.
    pub async fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(err) = session.quit().await {
                tracing::warn!(suite = %self.suite_name, error = %err, "session close failed");
            }
        }
        if let Err(err) = self.registry.shutdown().await {
            tracing::warn!(suite = %self.suite_name, error = %err, "driver shutdown failed");
        }
    }

    /// Consume the harness and produce the suite results
    #[must_use]
    pub fn finish(self) -> SuiteResults {
        SuiteResults {
            suite_name: self.suite_name,
            results: self.results,
            duration: self.started.elapsed(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod params {
        use super::*;

        #[test]
        fn test_defaults_match_suite_conventions() {
            let params = SuiteParams::default();
            assert_eq!(params.browser, "Chrome");
            assert_eq!(params.browser_version, "latest");
            assert_eq!(params.platform, "Windows");
            assert_eq!(params.platform_version, "10");
            assert_eq!(params.run_location, "local");
            assert_eq!(params.resolution, "1280x1024");
            assert!(!params.headless);
            assert!(!params.incognito);
        }

        #[test]
        fn test_overlay_config_replaces_only_provided_keys() {
            let dir = tempfile::tempdir().unwrap();
            let config = crate::config::ConfigResolver::load_env(dir.path(), "unit")
                .with_override("testPlatform", "remote")
                .with_override("headless", "true");

            let mut params = SuiteParams::default();
            params.overlay_config(&config);

            assert_eq!(params.run_location, "remote");
            assert!(params.headless);
            // Untouched by blank config values
            assert_eq!(params.browser, "Chrome");
            assert!(!params.incognito);
        }

        #[test]
        fn test_to_descriptor_carries_flags() {
            let mut params = SuiteParams::default();
            params.headless = true;
            params.incognito = true;

            let descriptor = params.to_descriptor();
            assert!(descriptor.headless);
            assert!(descriptor.incognito);
            assert_eq!(descriptor.resolution.as_deref(), Some("1280x1024"));
        }
    }

    mod results {
        use super::*;

        #[test]
        fn test_suite_results_counting() {
            let results = SuiteResults {
                suite_name: "login".to_string(),
                results: vec![
                    TestResult::pass("opens form"),
                    TestResult::fail("submits", "button missing"),
                    TestResult::pass("logo shows"),
                ],
                duration: Duration::from_secs(3),
            };

            assert!(!results.all_passed());
            assert_eq!(results.passed_count(), 2);
            assert_eq!(results.failed_count(), 1);
            assert_eq!(results.total(), 3);
            assert_eq!(results.failures()[0].name, "submits");
        }
    }

    #[cfg(not(feature = "browser"))]
    mod lifecycle {
        use super::*;

        #[tokio::test]
        async fn test_setup_run_teardown_cycle() {
            let mut harness = Harness::new("smoke", SuiteParams::default());
            assert!(harness.page().is_none());

            harness.setup().await.unwrap();
            assert!(harness.session().is_some());
            assert!(harness.page().is_some());

            harness.record(TestResult::pass("noop"));
            harness.teardown().await;
            assert!(harness.session().is_none());

            let results = harness.finish();
            assert!(results.all_passed());
            assert_eq!(results.total(), 1);
        }

        #[tokio::test]
        async fn test_teardown_swallows_close_failure() {
            use crate::backend::{DomBackend, FakeDom};
            use std::sync::Arc;

            let dom = Arc::new(FakeDom::new());
            dom.fail_close(true);
            let session = SessionHandle::from_parts(
                Arc::clone(&dom) as Arc<dyn DomBackend>,
                CapabilityDescriptor::headless_chrome(true),
            );

            let mut harness = Harness::over_session("smoke", SuiteParams::default(), session);
            harness.record(TestResult::pass("noop"));

            harness.teardown().await;
            assert!(harness.session().is_none());

            let results = harness.finish();
            assert!(results.all_passed());
            assert_eq!(results.total(), 1);
        }

        #[tokio::test]
        async fn test_setup_failure_leaves_no_session() {
            let mut params = SuiteParams::default();
            params.browser = "Netscape".to_string();

            let mut harness = Harness::new("smoke", params);
            assert!(harness.setup().await.is_err());
            assert!(harness.session().is_none());
            // Teardown after failed setup is a no-op, not a panic
            harness.teardown().await;
        }
    }
}
