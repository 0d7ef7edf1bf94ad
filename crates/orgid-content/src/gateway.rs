use std::time::Duration;

use async_trait::async_trait;
use orgid_types::ContentId;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::fetcher::ContentFetcher;

/// Settings for fetching documents through an IPFS HTTP gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway base URL; documents are read from `<url>/ipfs/<cid>`.
    pub url: String,
    pub timeout_secs: u64,
    pub max_document_bytes: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".into(),
            timeout_secs: 30,
            max_document_bytes: 1024 * 1024,
        }
    }
}

/// Fetches documents from an IPFS HTTP gateway.
pub struct IpfsGatewayFetcher {
    config: GatewayConfig,
    client: Client,
}

impl IpfsGatewayFetcher {
    pub fn new(config: GatewayConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Gateway URL for a content id.
    pub fn document_url(&self, cid: &ContentId) -> String {
        format!("{}/ipfs/{}", self.config.url.trim_end_matches('/'), cid)
    }

    fn check_size(&self, cid: &ContentId, size: u64) -> FetchResult<()> {
        if size > self.config.max_document_bytes {
            return Err(FetchError::TooLarge {
                cid: cid.clone(),
                size,
                limit: self.config.max_document_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentFetcher for IpfsGatewayFetcher {
    async fn fetch(&self, cid: &ContentId) -> FetchResult<Vec<u8>> {
        let url = self.document_url(cid);
        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(cid, e))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                return Err(FetchError::NotFound(cid.clone()))
            }
            status if !status.is_success() => {
                return Err(FetchError::Transport(format!("gateway returned {status}")))
            }
            _ => {}
        }

        if let Some(len) = response.content_length() {
            self.check_size(cid, len)?;
        }

        // Chunked responses carry no length up front.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| request_error(cid, e))? {
            self.check_size(cid, (body.len() + chunk.len()) as u64)?;
            body.extend_from_slice(&chunk);
        }

        debug!(cid = %cid, bytes = body.len(), "document fetched from gateway");
        Ok(body)
    }
}

fn request_error(cid: &ContentId, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(cid.clone())
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use orgid_types::JsonHash;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn cid() -> ContentId {
        ContentId::from_hash(&JsonHash::zero())
    }

    /// Serve one HTTP response with the given head and chunked body parts.
    async fn serve_once(head: &'static str, chunks: Vec<Vec<u8>>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            // The client may hang up early; write errors are expected then.
            let _ = socket.write_all(head.as_bytes()).await;
            for chunk in chunks {
                let _ = socket
                    .write_all(format!("{:x}\r\n", chunk.len()).as_bytes())
                    .await;
                let _ = socket.write_all(&chunk).await;
                let _ = socket.write_all(b"\r\n").await;
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
        });
        format!("http://{addr}")
    }

    const CHUNKED_OK: &str =
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";

    fn fetcher(url: String, max_document_bytes: u64) -> IpfsGatewayFetcher {
        IpfsGatewayFetcher::new(GatewayConfig {
            url,
            timeout_secs: 5,
            max_document_bytes,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn chunked_oversize_body_is_cut_off() {
        let url = serve_once(CHUNKED_OK, vec![vec![b'x'; 64]; 16]).await;
        let err = fetcher(url, 100).fetch(&cid()).await.unwrap_err();
        match err {
            FetchError::TooLarge { size, limit, .. } => {
                assert_eq!(limit, 100);
                assert!(size > 100);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chunked_body_within_limit_is_assembled() {
        let chunks = vec![b"{\"id\":".to_vec(), b"\"did:x\"}".to_vec()];
        let url = serve_once(CHUNKED_OK, chunks).await;
        let bytes = fetcher(url, 100).fetch(&cid()).await.unwrap();
        assert_eq!(bytes, br#"{"id":"did:x"}"#);
    }

    #[tokio::test]
    async fn missing_document_maps_to_not_found() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
            Vec::new(),
        )
        .await;
        let err = fetcher(url, 100).fetch(&cid()).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[test]
    fn default_config() {
        let c = GatewayConfig::default();
        assert_eq!(c.url, "http://127.0.0.1:8080");
        assert_eq!(c.timeout_secs, 30);
        assert_eq!(c.max_document_bytes, 1024 * 1024);
    }

    #[test]
    fn document_url_joins_without_double_slash() {
        let fetcher = IpfsGatewayFetcher::new(GatewayConfig {
            url: "https://ipfs.example.org/".into(),
            ..GatewayConfig::default()
        })
        .unwrap();
        assert_eq!(
            fetcher.document_url(&cid()),
            format!("https://ipfs.example.org/ipfs/{}", cid())
        );
    }

    #[test]
    fn oversize_documents_are_rejected() {
        let fetcher = IpfsGatewayFetcher::new(GatewayConfig {
            max_document_bytes: 10,
            ..GatewayConfig::default()
        })
        .unwrap();
        assert!(fetcher.check_size(&cid(), 10).is_ok());
        assert!(matches!(
            fetcher.check_size(&cid(), 11),
            Err(FetchError::TooLarge {
                size: 11,
                limit: 10,
                ..
            })
        ));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let c: GatewayConfig = serde_json::from_str(r#"{ "url": "http://gw" }"#).unwrap();
        assert_eq!(c.url, "http://gw");
        assert_eq!(c.timeout_secs, 30);
    }
}
