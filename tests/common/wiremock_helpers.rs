use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a mock site that serves the given HTML at `/` with response
/// headers typical of a well-configured host.
///
/// Probes against any other path come back 404, so page-existence checks
/// stay deterministic.
pub async fn mock_site(html: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8")
                .insert_header("strict-transport-security", "max-age=31536000")
                .insert_header("x-frame-options", "DENY")
                .insert_header("x-content-type-options", "nosniff"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    server
}

/// Serves the HTML at `/` and answers existence probes (HEAD or GET) with
/// 200 for each listed path.
pub async fn mock_site_with_pages(html: &str, existing_paths: &[&str]) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    for existing in existing_paths {
        Mock::given(method("HEAD"))
            .and(path(*existing))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(*existing))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;
    }

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    server
}

/// Creates a mock server that rejects HEAD with 405 but serves GET with
/// 200 on the given path. Mirrors hosts that disallow HEAD probing.
pub async fn mock_head_rejecting_server(url_path: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    server
}

/// Creates a mock server that delays every response by `delay_ms`.
pub async fn mock_timeout_server(delay_ms: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("delayed response")
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(&server)
        .await;

    server
}

/// Creates a mock server that returns the given status for every request.
pub async fn mock_error_server(status_code: u16) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status_code))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(status_code))
        .mount(&server)
        .await;

    server
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_site_serves_html_with_headers() {
        let server = mock_site("<html><body><h1>Acme</h1></body></html>").await;

        let client = reqwest::Client::new();
        let response = client.get(server.uri()).send().await.unwrap();

        assert_eq!(response.status(), 200);
        assert!(response.headers().contains_key("strict-transport-security"));
        let body = response.text().await.unwrap();
        assert!(body.contains("Acme"));
    }

    #[tokio::test]
    async fn test_mock_site_with_pages_answers_probes() {
        let server = mock_site_with_pages("<html></html>", &["/contact"]).await;

        let client = reqwest::Client::new();
        let found = client
            .head(format!("{}/contact", server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(found.status(), 200);

        let missing = client
            .head(format!("{}/pricing", server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), 404);
    }

    #[tokio::test]
    async fn test_mock_error_server_returns_status_code() {
        let server = mock_error_server(503).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/any-path", server.uri()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 503);
    }
}
