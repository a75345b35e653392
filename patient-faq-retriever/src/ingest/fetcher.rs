//! Network access for URL sources.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use super::SourceError;
use crate::config::FetchConfig;

pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const ACCEPT_PDF: &str = "application/pdf,application/octet-stream,text/html;q=0.9,*/*;q=0.8";

/// A fetched response body and the URL it was served from after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    pub final_url: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        accept: &str,
        allow_insecure_tls: bool,
    ) -> Result<FetchedBody, SourceError>;
}

/// Fetches over HTTP(S) with a timeout and a streaming size cap.
///
/// Proxy settings come from `HTTP_PROXY`/`HTTPS_PROXY` through reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    insecure_client: Client,
    max_response_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(config, false)?,
            insecure_client: build_client(config, true)?,
            max_response_bytes: config.max_response_bytes,
        })
    }
}

fn build_client(config: &FetchConfig, accept_invalid_certs: bool) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .default_headers(headers)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
}

fn classify(error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Network {
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        accept: &str,
        allow_insecure_tls: bool,
    ) -> Result<FetchedBody, SourceError> {
        let client = if allow_insecure_tls {
            &self.insecure_client
        } else {
            &self.client
        };

        let mut response = client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let limit = self.max_response_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(SourceError::TooLarge { limit });
        }

        let final_url = response.url().to_string();
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            if (bytes.len() + chunk.len()) as u64 > limit {
                return Err(SourceError::TooLarge { limit });
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!("Fetched {} bytes from {}", bytes.len(), final_url);
        Ok(FetchedBody { final_url, bytes })
    }
}

/// In-memory fetcher for tests and offline runs.
///
/// Records every requested URL. Unknown URLs fail with HTTP 404.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, MockPage>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
enum MockPage {
    Body(FetchedBody),
    Status(u16),
    Timeout,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with_redirect(url, url, body)
    }

    /// Serve `body` for `url` as if redirected to `final_url`.
    pub fn with_redirect(self, url: &str, final_url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.insert(
            url,
            MockPage::Body(FetchedBody {
                final_url: final_url.to_string(),
                bytes: body.into(),
            }),
        )
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.insert(url, MockPage::Status(status))
    }

    pub fn with_timeout(self, url: &str) -> Self {
        self.insert(url, MockPage::Timeout)
    }

    fn insert(self, url: &str, page: MockPage) -> Self {
        if let Ok(mut pages) = self.pages.lock() {
            pages.insert(url.to_string(), page);
        }
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SourceFetcher for MockFetcher {
    async fn fetch(
        &self,
        url: &str,
        _accept: &str,
        _allow_insecure_tls: bool,
    ) -> Result<FetchedBody, SourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        let page = self
            .pages
            .lock()
            .ok()
            .and_then(|pages| pages.get(url).cloned());

        match page {
            Some(MockPage::Body(body)) => Ok(body),
            Some(MockPage::Status(status)) => Err(SourceError::HttpStatus { status }),
            Some(MockPage::Timeout) => Err(SourceError::Timeout),
            None => Err(SourceError::HttpStatus { status: 404 }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a loopback port and return its URL.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/page")
    }

    fn capped_fetcher(max_response_bytes: u64) -> HttpFetcher {
        HttpFetcher::new(&FetchConfig {
            max_response_bytes,
            ..FetchConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn http_fetcher_returns_body_within_limit() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello".to_string(),
        )
        .await;

        let body = capped_fetcher(50).fetch(&url, ACCEPT_HTML, false).await.unwrap();
        assert_eq!(body.bytes, b"hello");
        assert_eq!(body.final_url, url);
    }

    #[tokio::test]
    async fn http_fetcher_rejects_declared_length_over_limit() {
        let url = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{}",
            "x".repeat(100)
        ))
        .await;

        let err = capped_fetcher(50).fetch(&url, ACCEPT_HTML, false).await.unwrap_err();
        assert_eq!(err.code(), "RESPONSE_TOO_LARGE");
    }

    #[tokio::test]
    async fn http_fetcher_caps_streamed_body() {
        let url = serve_once(format!(
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n64\r\n{}\r\n0\r\n\r\n",
            "y".repeat(100)
        ))
        .await;

        let err = capped_fetcher(50).fetch(&url, ACCEPT_HTML, false).await.unwrap_err();
        assert_eq!(err.code(), "RESPONSE_TOO_LARGE");
    }

    #[tokio::test]
    async fn http_fetcher_maps_error_status() {
        let url = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string(),
        )
        .await;

        let err = capped_fetcher(50).fetch(&url, ACCEPT_HTML, false).await.unwrap_err();
        assert_eq!(err.code(), "HTTP 503");
    }

    #[tokio::test]
    async fn mock_serves_registered_pages_and_records_calls() {
        let fetcher = MockFetcher::new()
            .with_redirect("http://a.test/x", "https://a.test/x/", "<p>hi</p>")
            .with_timeout("http://slow.test");

        let body = fetcher.fetch("http://a.test/x", ACCEPT_HTML, false).await.unwrap();
        assert_eq!(body.final_url, "https://a.test/x/");
        assert_eq!(body.bytes, b"<p>hi</p>");

        let err = fetcher.fetch("http://slow.test", ACCEPT_HTML, false).await.unwrap_err();
        assert_eq!(err.code(), "TIMEOUT");

        let err = fetcher.fetch("http://nowhere.test", ACCEPT_HTML, false).await.unwrap_err();
        assert_eq!(err.code(), "HTTP 404");

        assert_eq!(fetcher.call_count(), 3);
    }

    #[test]
    fn http_fetcher_builds_from_defaults() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        assert_eq!(fetcher.max_response_bytes, 200 * 1024 * 1024);
    }
}
