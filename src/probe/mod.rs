//! HTTP probing.
//!
//! A probe is exactly one GET request with a spoofed country header (and
//! optionally a user agent), sent through a client that never follows
//! redirects. The response is reduced to a [`ProbeOutcome`].
//!
//! Transport failures never escape as errors: a timeout or refused connection
//! is reported as status 0 with `Connection failed`, and a request that cannot
//! be built (bad URL, bad header value) as status 0 with `Request failed`.

mod classify;

use std::time::Duration;

use log::debug;
use reqwest::header::{LOCATION, USER_AGENT};

use crate::config::{COUNTRY_HEADER, CONNECTION_FAILED, ERROR_STATUS_TEXT, REQUEST_FAILED};
use crate::error_handling::InitializationError;
use crate::initialization::init_probe_client;

pub use classify::{classify_response, classify_special_response, is_redirect_status};

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// HTTP status, or 0 when no response was received
    pub status: u16,
    /// Status line text, e.g. `302 Found`, or `Error`
    pub status_text: String,
    /// Classification: `No redirect`, the redirect target, or a failure marker
    pub result: String,
}

impl ProbeOutcome {
    /// Outcome for a timeout or any other transport failure.
    pub fn connection_failed() -> Self {
        Self {
            status: 0,
            status_text: ERROR_STATUS_TEXT.to_string(),
            result: CONNECTION_FAILED.to_string(),
        }
    }

    /// Outcome for a request that could not be constructed.
    pub fn request_failed() -> Self {
        Self {
            status: 0,
            status_text: ERROR_STATUS_TEXT.to_string(),
            result: REQUEST_FAILED.to_string(),
        }
    }
}

/// Normalizes a country code for the `X-Test-Country` header.
///
/// Uppercases the code and maps `UK` to `GB`, the ISO code the server side
/// expects.
pub fn normalize_country(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    if upper == "UK" {
        "GB".to_string()
    } else {
        upper
    }
}

/// Issues probes through a shared, redirect-disabled HTTP client.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    /// Creates a prober whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, InitializationError> {
        Ok(Self {
            client: init_probe_client(timeout)?,
        })
    }

    /// Wraps an existing client. The client must have redirects disabled.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Probes `url` as a visitor from `country`.
    ///
    /// `X-Test-Country` is always set to the uppercased country code. The
    /// `User-Agent` header is only set when a non-empty override is given.
    pub async fn probe(&self, url: &str, country: &str, user_agent: Option<&str>) -> ProbeOutcome {
        let mut builder = self
            .client
            .get(url)
            .header(COUNTRY_HEADER, country.to_uppercase());
        if let Some(agent) = user_agent.filter(|agent| !agent.is_empty()) {
            builder = builder.header(USER_AGENT, agent);
        }

        let outcome = match self.execute(builder).await {
            Ok((status, status_text, location)) => ProbeOutcome {
                result: classify_response(status, location.as_deref()),
                status,
                status_text,
            },
            Err(failure) => failure,
        };
        debug!(
            "Probed {url} as {country} (agent: {}): {} {}",
            user_agent.unwrap_or("default"),
            outcome.status,
            outcome.result
        );
        outcome
    }

    /// Probes `url` with exactly the given headers.
    ///
    /// Used for bot and SEO special cases. On a 200 response the result is
    /// refined by the requested path (see [`classify_special_response`]).
    pub async fn probe_with_headers(&self, url: &str, headers: &[(String, String)]) -> ProbeOutcome {
        let builder = headers
            .iter()
            .fold(self.client.get(url), |builder, (name, value)| {
                builder.header(name.as_str(), value.as_str())
            });

        let outcome = match self.execute(builder).await {
            Ok((status, status_text, location)) => ProbeOutcome {
                result: classify_special_response(url, status, location.as_deref()),
                status,
                status_text,
            },
            Err(failure) => failure,
        };
        debug!(
            "Probed {url} with {} custom headers: {} {}",
            headers.len(),
            outcome.status,
            outcome.result
        );
        outcome
    }

    /// Sends the request and returns `(status, status_text, location)`.
    ///
    /// The body is always drained so the connection can be reused; a failure
    /// while draining does not change the outcome.
    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(u16, String, Option<String>), ProbeOutcome> {
        let request = builder.build().map_err(|e| {
            debug!("Failed to build request: {e}");
            ProbeOutcome::request_failed()
        })?;
        let url = request.url().to_string();

        let response = self.client.execute(request).await.map_err(|e| {
            debug!("Request to {url} failed: {e}");
            ProbeOutcome::connection_failed()
        })?;

        let status = response.status();
        let status_text = match status.canonical_reason() {
            Some(reason) => format!("{} {reason}", status.as_u16()),
            None => status.as_u16().to_string(),
        };
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        if let Err(e) = response.bytes().await {
            debug!("Failed to drain response body from {url}: {e}");
        }

        Ok((status.as_u16(), status_text, location))
    }
}
