//! Full login journey over the in-memory backend.
//!
//! Exercises the same path a real suite takes: registry, session, page
//! objects, waits, and auth-code capture, with the DOM scripted instead of
//! driven by chromium.

#![cfg(not(feature = "browser"))]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;
use verificar::{
    CapabilityDescriptor, DomBackend, FakeDom, FakeElement, Harness, HomePage, Locator, LoginPage,
    Page, PageObject, SessionHandle, SuiteParams, TestResult, WaitPolicy,
};

fn scripted_idp() -> Arc<FakeDom> {
    let dom = Arc::new(FakeDom::new());
    let _ = dom
        .insert_for(&Locator::id("username"), FakeElement::visible())
        .unwrap();
    let _ = dom
        .insert_for(&Locator::id("password"), FakeElement::visible())
        .unwrap();
    let _ = dom
        .insert_for(&Locator::id("loginButton"), FakeElement::visible())
        .unwrap();
    let _ = dom
        .insert_for(&Locator::id("icmfContinueButton"), FakeElement::hidden())
        .unwrap();
    // Landing page renders late, like the real redirect chain
    let _ = dom
        .insert_for(
            &Locator::css("div.logo.logo"),
            FakeElement::visible().appears_in(Duration::from_millis(80)),
        )
        .unwrap();
    dom.stub_redirect(
        "https://idp.example.test/login",
        "https://app.example.test/cb?code=j0urn3y",
    );
    dom
}

fn fast_page(dom: &Arc<FakeDom>) -> Page {
    let mut page = Page::new(Arc::clone(dom) as Arc<dyn DomBackend>);
    page.change_wait(WaitPolicy::with_timeout(Duration::from_millis(400)));
    page
}

#[tokio::test]
async fn login_journey_lands_on_home() {
    let dom = scripted_idp();
    let login = LoginPage::new(fast_page(&dom)).with_redirect_pause(Duration::ZERO);

    let mut page = fast_page(&dom);
    assert!(page.navigate_to("https://idp.example.test/login", None).await);

    let home = login.login("alice", "s3cret").await.unwrap();
    assert!(home.is_welcome_displayed().await);
}

#[tokio::test]
async fn rejected_credentials_leave_the_home_marker_absent() {
    let dom = scripted_idp();
    // The identity provider bounces a bad password back to the form, so
    // the landing marker never renders.
    dom.remove_for(&Locator::css("div.logo.logo"));
    let login = LoginPage::new(fast_page(&dom)).with_redirect_pause(Duration::ZERO);

    let home = login.login("alice", "wrong").await.unwrap();
    assert!(!home.is_welcome_displayed().await);
}

#[tokio::test]
async fn login_journey_captures_auth_code() {
    let dom = scripted_idp();
    let mut login = LoginPage::new(fast_page(&dom)).with_redirect_pause(Duration::ZERO);

    assert!(login.open("https://idp.example.test/login").await);
    let code = login.login_for_auth_code("alice", "s3cret").await.unwrap();
    assert_eq!(code, "j0urn3y");
}

#[tokio::test]
async fn harness_runs_the_journey_over_a_registry_session() {
    let mut harness = Harness::new("login-smoke", SuiteParams::default());
    harness.setup().await.unwrap();

    // Sessions from the registry start clean; nothing is scripted in the
    // mock DOM, so the journey fails fast and the failure is recorded.
    let mut page = harness.page().unwrap();
    page.change_wait(WaitPolicy::with_timeout(Duration::from_millis(100)));
    let login = LoginPage::new(page).with_redirect_pause(Duration::ZERO);

    match login.login("alice", "s3cret").await {
        Ok(_) => harness.record(TestResult::pass("login")),
        Err(err) => harness.record(TestResult::fail("login", err.to_string())),
    }

    harness.teardown().await;
    let results = harness.finish();
    assert_eq!(results.failed_count(), 1);
    assert!(results.failures()[0]
        .error
        .as_deref()
        .unwrap()
        .contains("username"));
}

#[tokio::test]
async fn session_over_scripted_backend_reaches_home_page() {
    let dom = scripted_idp();
    let session = SessionHandle::from_parts(
        Arc::clone(&dom) as Arc<dyn DomBackend>,
        CapabilityDescriptor::headless_chrome(true),
    );

    let mut page = session.open("https://idp.example.test/login").await;
    page.change_wait(WaitPolicy::with_timeout(Duration::from_millis(400)));

    let login = LoginPage::new(page.clone()).with_redirect_pause(Duration::ZERO);
    let _ = login.login("alice", "s3cret").await.unwrap();

    let home = HomePage::new(page);
    assert!(home.is_welcome_displayed().await);
    assert_eq!(
        home.page().current_url().await.unwrap(),
        "https://app.example.test/cb?code=j0urn3y"
    );

    session.quit().await.unwrap();
    assert!(dom.was_closed());
}
