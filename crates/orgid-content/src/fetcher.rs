use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use orgid_types::ContentId;
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// Source of raw document bytes on the content-addressed network.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the bytes stored under `cid`.
    async fn fetch(&self, cid: &ContentId) -> FetchResult<Vec<u8>>;
}

/// In-memory document table for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryContentFetcher {
    documents: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl InMemoryContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document under its content id.
    pub fn insert(&self, cid: ContentId, bytes: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(cid, bytes.into());
    }

    /// Drop a document, simulating an unpinned or unreachable CID.
    pub fn remove(&self, cid: &ContentId) -> bool {
        self.documents
            .write()
            .expect("lock poisoned")
            .remove(cid)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentFetcher for InMemoryContentFetcher {
    async fn fetch(&self, cid: &ContentId) -> FetchResult<Vec<u8>> {
        self.documents
            .read()
            .expect("lock poisoned")
            .get(cid)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(cid.clone()))
    }
}

/// Reads documents from a local directory mirror.
///
/// A document for `<cid>` is looked up as `<root>/<cid>` and then
/// `<root>/<cid>.json`.
#[derive(Clone, Debug)]
pub struct DirectoryContentFetcher {
    root: PathBuf,
}

impl DirectoryContentFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn candidates(&self, cid: &ContentId) -> [PathBuf; 2] {
        [
            self.root.join(cid.as_str()),
            self.root.join(format!("{cid}.json")),
        ]
    }
}

#[async_trait]
impl ContentFetcher for DirectoryContentFetcher {
    async fn fetch(&self, cid: &ContentId) -> FetchResult<Vec<u8>> {
        for path in self.candidates(cid) {
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!(cid = %cid, path = %path.display(), "document read from mirror");
                    return Ok(bytes);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(FetchError::Io(e)),
            }
        }
        Err(FetchError::NotFound(cid.clone()))
    }
}

#[cfg(test)]
mod tests {
    use orgid_types::JsonHash;

    use super::*;

    fn cid(seed: u8) -> ContentId {
        ContentId::from_hash(&JsonHash::from_bytes([seed; 32]))
    }

    #[tokio::test]
    async fn in_memory_returns_inserted_bytes() {
        let fetcher = InMemoryContentFetcher::new();
        fetcher.insert(cid(1), b"{}".to_vec());
        assert_eq!(fetcher.fetch(&cid(1)).await.unwrap(), b"{}");
        assert_eq!(fetcher.len(), 1);
    }

    #[tokio::test]
    async fn in_memory_missing_is_not_found() {
        let fetcher = InMemoryContentFetcher::new();
        let err = fetcher.fetch(&cid(2)).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound(c) if c == cid(2)));
    }

    #[tokio::test]
    async fn in_memory_remove_unpins() {
        let fetcher = InMemoryContentFetcher::new();
        fetcher.insert(cid(1), "x");
        assert!(fetcher.remove(&cid(1)));
        assert!(fetcher.is_empty());
        assert!(fetcher.fetch(&cid(1)).await.is_err());
    }

    #[tokio::test]
    async fn directory_reads_bare_and_json_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(cid(1).as_str()), b"bare").unwrap();
        std::fs::write(dir.path().join(format!("{}.json", cid(2))), b"with-ext").unwrap();

        let fetcher = DirectoryContentFetcher::new(dir.path());
        assert_eq!(fetcher.fetch(&cid(1)).await.unwrap(), b"bare");
        assert_eq!(fetcher.fetch(&cid(2)).await.unwrap(), b"with-ext");
    }

    #[tokio::test]
    async fn directory_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = DirectoryContentFetcher::new(dir.path());
        assert!(matches!(
            fetcher.fetch(&cid(3)).await,
            Err(FetchError::NotFound(_))
        ));
    }
}
