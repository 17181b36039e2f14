use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{LoadError, StatusLoader};
use crate::status::LiveStatusResponse;

/// HTTP-based status loader. Issues a single GET per call.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self::with_client(Self::build_client(timeout)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &crate::config::PollerConfig) -> reqwest::Result<Self> {
        Self::new(config.request_timeout)
    }

    pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("livestream-monitor/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
    }
}

#[async_trait]
impl StatusLoader for HttpLoader {
    async fn load(&self, url: &str) -> Result<LiveStatusResponse, LoadError> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(url, "Status query timed out");
                return Err(LoadError::Timeout {
                    url: url.to_string(),
                });
            }
            Err(e) => {
                warn!(url, error = %e, "Status query network error");
                return Err(LoadError::Network {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .status()
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string();
            warn!(url, status, "Status query returned error status");
            return Err(LoadError::Http {
                url: url.to_string(),
                status,
                message,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Timeout {
                    url: url.to_string(),
                }
            } else {
                LoadError::Network {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let parsed = LiveStatusResponse::from_json(&body).map_err(|e| LoadError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!(url, channels = parsed.len(), "Status query succeeded");
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ChannelEntry;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn loader() -> HttpLoader {
        HttpLoader::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn load_parses_body_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/live/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"mainhall": {"status_code": 200, "result": {"items": [{"id": {"videoId": "abc"}}]}}}"#,
            ))
            .mount(&server)
            .await;

        let result = loader()
            .load(&format!("{}/youtube/live/", server.uri()))
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert!(matches!(result.get("mainhall"), Some(ChannelEntry::Valid(_))));
    }

    #[tokio::test]
    async fn load_returns_http_error_on_502() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/live/"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let err = loader()
            .load(&format!("{}/youtube/live/", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(502));
    }

    #[tokio::test]
    async fn load_returns_parse_error_on_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/live/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = loader()
            .load(&format!("{}/youtube/live/", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }), "{err}");
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn load_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let loader = HttpLoader::new(Duration::from_millis(50)).unwrap();
        let err = loader
            .load(&format!("{}/youtube/live/", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Timeout { .. }), "{err}");
    }

    #[tokio::test]
    async fn load_reports_network_error() {
        let err = loader()
            .load("http://127.0.0.1:9/youtube/live/")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Network { .. } | LoadError::Timeout { .. }));
        assert_eq!(err.url(), "http://127.0.0.1:9/youtube/live/");
    }
}
