//! Journey execution behind the CLI commands

use crate::commands::{ConfigArgs, LoginArgs, TokenArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use std::time::Duration;
use verificar::{
    ClientCredentials, ConfigResolver, Harness, LoginPage, SuiteParams, TestResult, TokenBroker,
};

fn required(value: Option<&str>, resolver: &ConfigResolver, key: &str) -> CliResult<String> {
    if let Some(value) = value {
        return Ok(value.to_string());
    }
    let resolved = resolver.resolve(key);
    if resolved.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "no value given and configuration key '{key}' is unset"
        )));
    }
    Ok(resolved)
}

/// Run the login journey end to end.
///
/// # Errors
///
/// Fails when required inputs are missing, the session cannot be created,
/// or any journey step fails.
pub async fn run_login(
    config: &CliConfig,
    args: &LoginArgs,
    reporter: &Reporter,
) -> CliResult<()> {
    let resolver = config.resolver();
    tracing::debug!(environment = resolver.environment(), "starting login journey");
    let url = required(args.url.as_deref(), &resolver, "LOGIN_URL")?;
    let username = required(args.username.as_deref(), &resolver, "USERNAME")?;
    let password = required(args.password.as_deref(), &resolver, "PASSWORD")?;

    let mut params = SuiteParams::default();
    params.overlay_config(&resolver);
    params.browser = args.browser.clone();
    params.browser_version = args.browser_version.clone();
    params.platform = args.platform.clone();
    params.platform_version = args.platform_version.clone();
    params.run_location = args.run_location.clone();
    params.resolution = args.resolution.clone();
    if args.headless {
        params.headless = true;
    }
    if args.incognito {
        params.incognito = true;
    }

    let mut harness = Harness::new("login", params);
    harness.setup().await?;

    let outcome = login_journey(&harness, args, &url, &username, &password).await;
    match outcome {
        Ok(code) => {
            harness.record(TestResult::pass("login journey"));
            if let Some(code) = code {
                reporter.info(&format!("authorization code: {code}"));
            }
        }
        Err(ref err) => {
            harness.record(TestResult::fail("login journey", err.to_string()));
        }
    }

    harness.teardown().await;
    let results = harness.finish();
    reporter.summary(&results);

    if results.all_passed() {
        Ok(())
    } else {
        Err(CliError::journey("login journey did not pass"))
    }
}

async fn login_journey(
    harness: &Harness,
    args: &LoginArgs,
    url: &str,
    username: &str,
    password: &str,
) -> CliResult<Option<String>> {
    let page = harness
        .page()
        .ok_or_else(|| CliError::journey("no session available"))?;
    let mut login = LoginPage::new(page)
        .with_redirect_pause(Duration::from_millis(args.redirect_pause_ms));

    if !login.open(url).await {
        return Err(CliError::journey(format!("could not open {url}")));
    }

    if args.capture_code {
        let code = login.login_for_auth_code(username, password).await?;
        return Ok(Some(code));
    }

    let home = login.login(username, password).await?;
    if home.is_welcome_displayed().await {
        Ok(None)
    } else {
        Err(CliError::journey("landing logo never appeared"))
    }
}

/// Fetch a bearer token from the auth broker.
///
/// # Errors
///
/// Fails when the broker URL or credentials are missing, or the broker
/// rejects the exchange.
pub async fn run_token(
    config: &CliConfig,
    args: &TokenArgs,
    reporter: &Reporter,
) -> CliResult<()> {
    let resolver = config.resolver();
    let base_url = if let Some(url) = args.base_url.as_deref() {
        url.to_string()
    } else {
        let mut resolved = resolver.resolve("ID_BROKER_URL");
        if resolved.is_empty() {
            resolved = resolver.resolve("BASE_URL");
        }
        if resolved.is_empty() {
            return Err(CliError::invalid_argument(
                "no broker URL given and neither ID_BROKER_URL nor BASE_URL is set",
            ));
        }
        resolved
    };

    let mut credentials = ClientCredentials::from_config(&resolver);
    if let Some(client_id) = &args.client_id {
        credentials.client_id = client_id.clone();
    }
    if let Some(client_secret) = &args.client_secret {
        credentials.client_secret = client_secret.clone();
    }
    if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
        return Err(CliError::invalid_argument(
            "client id and secret are required, via flags or CLIENT_ID/CLIENT_SECRET keys",
        ));
    }

    tracing::debug!(%base_url, client_id = %credentials.client_id, "requesting bearer token");
    let bearer = TokenBroker::new(base_url).bearer_token(&credentials).await?;
    if args.raw {
        println!("{bearer}");
    } else {
        reporter.success("token acquired");
        reporter.info(&bearer);
    }
    Ok(())
}

/// Show resolved configuration values.
///
/// # Errors
///
/// Currently infallible; the signature matches the other runners.
pub fn run_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    let resolver = config.resolver();
    if args.keys.is_empty() {
        println!("environment={}", resolver.environment());
        println!("config_dir={}", resolver.config_dir().display());
        return Ok(());
    }
    for key in &args.keys {
        println!("{key}={}", resolver.resolve(key));
    }
    Ok(())
}
