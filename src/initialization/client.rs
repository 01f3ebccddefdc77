//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

/// Initializes the HTTP client used for probing.
///
/// Creates a `reqwest::Client` configured with:
/// - Redirects disabled, so the first response (even a 3xx) is returned and its
///   `Location` header can be observed directly
/// - A single timeout covering connect, request, and response
/// - A connect timeout of the same length, so unreachable hosts fail within it
///
/// No default User-Agent is set here; probes add one only when the test case
/// asks for it.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_probe_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    #[tokio::test]
    async fn test_probe_client_does_not_follow_redirects() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/"))
                .times(1)
                .respond_with(status_code(302).insert_header("Location", "/uk/")),
        );
        // No expectation for /uk/: following the redirect would fail the test.

        let client = init_probe_client(Duration::from_secs(5)).expect("client");
        let response = client
            .get(server.url("/").to_string())
            .send()
            .await
            .expect("response");
        assert_eq!(response.status().as_u16(), 302);
    }
}
