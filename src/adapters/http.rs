use crate::domain::model::{FetchedDocument, RuleSource};
use crate::domain::ports::SourceFetcher;
use crate::utils::error::{RulesetError, Result};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("ruleset-merge/", env!("CARGO_PKG_VERSION"));

/// 透過 HTTP GET 取得遠端規則；非 http(s) 的來源視為本地檔案
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_seconds: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// 取得 URL 的文字內容，非 2xx 回應視為失敗
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(RulesetError::HttpStatusError {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }

    async fn read_local(&self, source: &RuleSource) -> Result<String> {
        tokio::fs::read_to_string(&source.url)
            .await
            .map_err(|e| RulesetError::FetchError {
                source_name: source.name.clone(),
                url: source.url.clone(),
                message: format!("Local source unreadable: {}", e),
            })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &RuleSource) -> Result<FetchedDocument> {
        let text = if source.is_remote() {
            self.get_text(&source.url)
                .await
                .map_err(|e| RulesetError::FetchError {
                    source_name: source.name.clone(),
                    url: source.url.clone(),
                    message: e.to_string(),
                })?
        } else {
            self.read_local(source).await?
        };

        tracing::debug!("Fetched '{}' ({} bytes)", source.name, text.len());

        Ok(FetchedDocument {
            source: source.clone(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_fetch_remote_source() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/List/non_ip/cdn.conf");
            then.status(200).body("DOMAIN-SUFFIX,cdn.example.com\n");
        });

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT).unwrap();
        let source = RuleSource::new("cdn", server.url("/List/non_ip/cdn.conf"));
        let document = fetcher.fetch(&source).await.unwrap();

        mock.assert();
        assert_eq!(document.text, "DOMAIN-SUFFIX,cdn.example.com\n");
        assert_eq!(document.source, source);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_fetch_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing.list");
            then.status(404);
        });

        let fetcher = HttpFetcher::default();
        let source = RuleSource::new("missing", server.url("/missing.list"));

        match fetcher.fetch(&source).await {
            Err(RulesetError::FetchError {
                source_name,
                message,
                ..
            }) => {
                assert_eq!(source_name, "missing");
                assert!(message.contains("404"));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
        mock.assert();
    }

    #[tokio::test]
    async fn test_get_text_non_success_status_is_typed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone.conf");
            then.status(410);
        });

        let fetcher = HttpFetcher::default();
        match fetcher.get_text(&server.url("/gone.conf")).await {
            Err(RulesetError::HttpStatusError { url, status }) => {
                assert!(url.ends_with("/gone.conf"));
                assert_eq!(status, reqwest::StatusCode::GONE);
            }
            other => panic!("expected HTTP status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_text_connection_failure_is_http_error() {
        let fetcher = HttpFetcher::default();
        let err = fetcher.get_text("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, RulesetError::HttpError(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_fetch_local_source() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"DOMAIN,local.example.com\n").unwrap();

        let fetcher = HttpFetcher::default();
        let source = RuleSource::new("local", file.path().to_str().unwrap());
        let document = fetcher.fetch(&source).await.unwrap();

        assert_eq!(document.text, "DOMAIN,local.example.com\n");
    }

    #[tokio::test]
    async fn test_fetch_missing_local_source_is_fetch_error() {
        let fetcher = HttpFetcher::default();
        let source = RuleSource::new("gone", "definitely/not/here.conf");

        let err = fetcher.fetch(&source).await.unwrap_err();
        assert!(matches!(err, RulesetError::FetchError { .. }));
    }
}
