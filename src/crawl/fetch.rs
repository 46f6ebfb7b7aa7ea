// src/crawl/fetch.rs
// =============================================================================
// This module downloads one page and decides whether it is usable HTML.
//
// Key functionality:
// - One GET per page, no retry
// - Identifies itself with a fixed User-Agent
// - Classifies the response by status code and content type
//
// HTTP status codes, as the crawler sees them:
// - 200-300: usable, as long as the body is HTML
// - 301-499: client error (redirects are followed by reqwest, so a 3xx that
//            still reaches us is treated like a 4xx)
// - 500-599: server error
//
// None of these errors stop the crawl, the crawler logs them and moves on.
// =============================================================================

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};

use super::canonical::CanonicalUrl;
use crate::error::CrawlError;

/// Sent with every request
pub const USER_AGENT: &str = "WebCrawler/1.0";

#[derive(Debug, Clone)]
pub struct Fetcher {
    // Client is cheap to clone (it's an Arc internally) and pools connections
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, CrawlError> {
        // No timeout: a hung request stalls only its own branch of the crawl
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the HTML body
    pub async fn fetch(&self, url: &CanonicalUrl) -> Result<String, CrawlError> {
        let response = self.client.get(url.as_str()).send().await?;
        let response = check_response(url, response)?;
        Ok(response.text().await?)
    }
}

// Rejects error statuses and non-HTML bodies, hands the response back otherwise
fn check_response(url: &CanonicalUrl, response: Response) -> Result<Response, CrawlError> {
    let status = response.status();

    if status.as_u16() > 300 && status.as_u16() < 500 {
        return Err(CrawlError::ClientHttp {
            url: url.to_string(),
            status,
        });
    }
    if status.is_server_error() || status.as_u16() >= 600 {
        return Err(CrawlError::ServerHttp {
            url: url.to_string(),
            status,
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    match content_type {
        Some(value) if value.contains("text/html") => Ok(response),
        other => Err(CrawlError::InvalidContentType {
            url: url.to_string(),
            content_type: other.map(str::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use rstest::rstest;

    fn page_url(server: &MockServer, path: &str) -> CanonicalUrl {
        CanonicalUrl::parse(&server.url(path)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/page")
                    .header("user-agent", USER_AGENT);
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body("<h1>Hello</h1>");
            })
            .await;

        let fetcher = Fetcher::new().unwrap();
        let body = fetcher.fetch(&page_url(&server, "/page")).await.unwrap();

        assert_eq!(body, "<h1>Hello</h1>");
        mock.assert_async().await;
    }

    #[rstest]
    #[case(301, "client")]
    #[case(404, "client")]
    #[case(410, "client")]
    #[case(499, "client")]
    #[case(500, "server")]
    #[case(503, "server")]
    #[tokio::test]
    async fn test_error_status_classes(#[case] status: u16, #[case] class: &str) {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/broken");
                then.status(status)
                    .header("content-type", "text/html")
                    .body("<p>nope</p>");
            })
            .await;

        let fetcher = Fetcher::new().unwrap();
        let err = fetcher
            .fetch(&page_url(&server, "/broken"))
            .await
            .unwrap_err();

        match class {
            "client" => assert!(matches!(err, CrawlError::ClientHttp { .. }), "{:?}", err),
            _ => assert!(matches!(err, CrawlError::ServerHttp { .. }), "{:?}", err),
        }
    }

    #[rstest]
    #[case(Some("application/json"))]
    #[case(Some("image/png"))]
    #[case(None)]
    #[tokio::test]
    async fn test_rejects_non_html(#[case] content_type: Option<&'static str>) {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data");
                let then = then.status(200).body("{}");
                if let Some(content_type) = content_type {
                    then.header("content-type", content_type);
                }
            })
            .await;

        let fetcher = Fetcher::new().unwrap();
        let err = fetcher.fetch(&page_url(&server, "/data")).await.unwrap_err();
        assert!(matches!(err, CrawlError::InvalidContentType { .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn test_connection_failure_is_unexpected() {
        // Nothing listens on port 9 of the loopback interface
        let url = CanonicalUrl::parse("http://127.0.0.1:9/").unwrap();
        let fetcher = Fetcher::new().unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, CrawlError::Unexpected(_)), "{:?}", err);
    }
}
