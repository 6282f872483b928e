//! Content-addressed artifact storage.
//!
//! The pipeline only needs three operations from a store: look up the identifiers currently
//! published under a logical name, retire them, and publish new bytes under a name. Retrieval URLs
//! are derived from identifiers by a [`Gateway`] and never stored.

pub(crate) mod memory;
pub(crate) mod pinata;

use crate::foundation::error::AvatarResult;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
/// Opaque identifier returned by a content-addressed store (an IPFS CID for Pinata).
pub struct ContentId(pub String);

impl ContentId {
    /// Wrap a raw identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publish/lookup/unpin boundary to a content-addressed store, keyed by logical asset name.
pub trait ArtifactStore: Send + Sync {
    /// Every distinct identifier currently published under `name`. Empty when there is none.
    fn find_by_name(&self, name: &str) -> AvatarResult<Vec<ContentId>>;

    /// Retire a previously published identifier.
    fn unpin(&self, id: &ContentId) -> AvatarResult<()>;

    /// Store `bytes` under `name` and return the resulting identifier.
    fn publish(&self, bytes: &[u8], name: &str) -> AvatarResult<ContentId>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Maps content identifiers to public retrieval URLs.
pub struct Gateway {
    base: String,
}

impl Gateway {
    /// Gateway serving `{base}/{cid}`.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Retrieval URL for `id`.
    pub fn url_for(&self, id: &ContentId) -> String {
        format!("{}/{}", self.base, id.as_str())
    }

    /// Pair `id` with its retrieval URL.
    pub fn asset(&self, id: ContentId) -> PublishedAsset {
        let url = self.url_for(&id);
        PublishedAsset { cid: id, url }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(pinata::DEFAULT_GATEWAY)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// Result of one upload: identifier plus retrieval URL.
pub struct PublishedAsset {
    pub cid: ContentId,
    pub url: String,
}

#[cfg(test)]
#[path = "../../tests/unit/store/gateway.rs"]
mod tests;
