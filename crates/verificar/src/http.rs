//! Traced HTTP client for API-side checks.
//!
//! Every request and response is logged before the caller sees it, so a
//! failed assertion always has the wire traffic next to it in the log.

use crate::result::VerificarResult;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// API calls get a generous budget; slow staging backends are the norm
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Buffered response with the parts assertions care about.
#[derive(Debug, Clone)]
pub struct TracedResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl TracedResponse {
    /// HTTP status code
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Canonical reason phrase for the status
    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Response headers in arrival order
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Raw response body
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Fails when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> VerificarResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client that logs both directions of every exchange.
#[derive(Debug, Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TracedClient {
    /// Build a client with the standard request timeout
    #[must_use]
    pub fn new() -> Self {
        let inner = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { inner }
    }

    /// GET a URL.
    ///
    /// # Errors
    ///
    /// Fails on connection or protocol errors; non-2xx statuses are
    /// returned to the caller, not treated as errors.
    pub async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> VerificarResult<TracedResponse> {
        let request = self.apply_headers(self.inner.get(url), headers);
        self.send("GET", url, headers, "", request).await
    }

    /// POST a form-encoded body.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TracedClient::get`].
    pub async fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> VerificarResult<TracedResponse> {
        let request = self.apply_headers(self.inner.post(url), headers).form(form);
        let summary = form
            .iter()
            .map(|(k, _)| *k)
            .collect::<Vec<_>>()
            .join(",");
        self.send("POST", url, headers, &summary, request).await
    }

    /// POST a JSON body.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TracedClient::get`].
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> VerificarResult<TracedResponse> {
        let request = self.apply_headers(self.inner.post(url), headers).json(body);
        self.send("POST", url, headers, &body.to_string(), request).await
    }

    /// PUT a JSON body.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TracedClient::get`].
    pub async fn put_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> VerificarResult<TracedResponse> {
        let request = self.apply_headers(self.inner.put(url), headers).json(body);
        self.send("PUT", url, headers, &body.to_string(), request).await
    }

    /// PATCH a JSON body.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TracedClient::get`].
    pub async fn patch_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> VerificarResult<TracedResponse> {
        let request = self.apply_headers(self.inner.patch(url), headers).json(body);
        self.send("PATCH", url, headers, &body.to_string(), request).await
    }

    /// DELETE a URL.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TracedClient::get`].
    pub async fn delete(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> VerificarResult<TracedResponse> {
        let request = self.apply_headers(self.inner.delete(url), headers);
        self.send("DELETE", url, headers, "", request).await
    }

    fn apply_headers(
        &self,
        mut request: reqwest::RequestBuilder,
        headers: &[(&str, &str)],
    ) -> reqwest::RequestBuilder {
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        request_headers: &[(&str, &str)],
        body_summary: &str,
        request: reqwest::RequestBuilder,
    ) -> VerificarResult<TracedResponse> {
        tracing::info!(
            method,
            url,
            headers = %format_headers(request_headers),
            body = body_summary,
            "sending request"
        );

        let response = request.send().await?;
        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or("<binary>").to_string(),
                )
            })
            .collect();
        let body = response.text().await?;

        tracing::info!(
            method,
            url,
            status = status.as_u16(),
            body_len = body.len(),
            "received response"
        );
        tracing::debug!(headers = ?headers, body, "response body");

        Ok(TracedResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}

fn format_headers(headers: &[(&str, &str)]) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
