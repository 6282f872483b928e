use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, multipart};

use crate::{
    foundation::error::{AvatarError, AvatarResult},
    store::{ArtifactStore, ContentId},
};

/// Pinata REST API base.
pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
/// Public Pinata IPFS gateway.
pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs";

/// Rows requested per `pinList` page, the API maximum. The default page is only 10 rows.
pub(crate) const PIN_LIST_PAGE_LIMIT: usize = 1000;

#[derive(Clone, PartialEq, Eq)]
/// Pinata credentials.
pub enum PinataAuth {
    /// Legacy key pair sent as `pinata_api_key` / `pinata_secret_api_key` headers.
    ApiKey { key: String, secret: String },
    /// Scoped JWT sent as a bearer token.
    Jwt(String),
}

impl std::fmt::Debug for PinataAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey { key, .. } => f
                .debug_struct("ApiKey")
                .field("key", key)
                .field("secret", &"<redacted>")
                .finish(),
            Self::Jwt(_) => f.debug_tuple("Jwt").field(&"<redacted>").finish(),
        }
    }
}

/// File name Pinata records for an asset published under `name`.
pub fn pin_file_name(name: &str) -> String {
    format!("{name}.png")
}

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct PinList {
    #[serde(default)]
    pub(crate) rows: Vec<PinRow>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct PinRow {
    pub(crate) ipfs_pin_hash: String,
    #[serde(default)]
    pub(crate) metadata: PinMetadata,
}

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct PinMetadata {
    #[serde(default)]
    pub(crate) name: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    pub(crate) ipfs_hash: String,
}

/// Exact-name matches over a pin listing. The API's metadata filter is a substring match.
pub(crate) fn find_in_pin_list(list: &PinList, file_name: &str) -> Vec<ContentId> {
    list.rows
        .iter()
        .filter(|row| row.metadata.name.as_deref() == Some(file_name))
        .map(|row| ContentId::new(row.ipfs_pin_hash.clone()))
        .collect()
}

/// [`ArtifactStore`] backed by the Pinata pinning API.
#[derive(Clone, Debug)]
pub struct PinataStore {
    client: Client,
    api_url: String,
    auth: PinataAuth,
}

impl PinataStore {
    /// Build a store with its own client and request timeout.
    pub fn new(api_url: impl Into<String>, auth: PinataAuth, timeout: Duration) -> AvatarResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AvatarError::config(format!("build http client: {e}")))?;
        Ok(Self::with_client(client, api_url, auth))
    }

    /// Build a store sharing an existing client.
    pub fn with_client(client: Client, api_url: impl Into<String>, auth: PinataAuth) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            api_url,
            auth,
        }
    }

    fn pin_list_page(&self, file_name: &str, offset: usize) -> AvatarResult<PinList> {
        let url = format!("{}/data/pinList", self.api_url);
        let limit = PIN_LIST_PAGE_LIMIT.to_string();
        let offset = offset.to_string();
        let resp = self
            .authed(self.client.get(&url))
            .query(&[
                ("status", "pinned"),
                ("metadata[name]", file_name),
                ("pageLimit", limit.as_str()),
                ("pageOffset", offset.as_str()),
            ])
            .send()
            .map_err(|e| AvatarError::publish(format!("pin list request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AvatarError::publish(format!(
                "pin list lookup for '{file_name}' failed: HTTP {}",
                status.as_u16()
            )));
        }
        resp.json()
            .map_err(|e| AvatarError::publish(format!("parse pin list: {e}")))
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            PinataAuth::ApiKey { key, secret } => req
                .header("pinata_api_key", key)
                .header("pinata_secret_api_key", secret),
            PinataAuth::Jwt(token) => req.bearer_auth(token),
        }
    }
}

impl ArtifactStore for PinataStore {
    fn find_by_name(&self, name: &str) -> AvatarResult<Vec<ContentId>> {
        let file_name = pin_file_name(name);
        let mut found: Vec<ContentId> = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.pin_list_page(&file_name, offset)?;
            for cid in find_in_pin_list(&page, &file_name) {
                if !found.contains(&cid) {
                    found.push(cid);
                }
            }
            if page.rows.len() < PIN_LIST_PAGE_LIMIT {
                return Ok(found);
            }
            offset += page.rows.len();
        }
    }

    fn unpin(&self, id: &ContentId) -> AvatarResult<()> {
        let url = format!("{}/pinning/unpin/{}", self.api_url, id);
        let resp = self
            .authed(self.client.delete(&url))
            .send()
            .map_err(|e| AvatarError::replace_conflict(format!("unpin {id}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(AvatarError::replace_conflict(format!(
                "unpin {id}: HTTP {}: {body}",
                status.as_u16()
            )));
        }
        tracing::info!(cid = %id, "unpinned previous asset");
        Ok(())
    }

    fn publish(&self, bytes: &[u8], name: &str) -> AvatarResult<ContentId> {
        let file_name = pin_file_name(name);
        let file = multipart::Part::bytes(bytes.to_vec())
            .file_name(file_name.clone())
            .mime_str("image/png")
            .map_err(|e| AvatarError::publish(format!("build upload part: {e}")))?;
        let metadata = serde_json::json!({ "name": file_name }).to_string();
        let form = multipart::Form::new()
            .part("file", file)
            .text("pinataMetadata", metadata);

        let url = format!("{}/pinning/pinFileToIPFS", self.api_url);
        let resp = self
            .authed(self.client.post(&url))
            .multipart(form)
            .send()
            .map_err(|e| AvatarError::publish(format!("upload '{file_name}': {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AvatarError::publish(format!(
                "upload '{file_name}' rejected: HTTP {}",
                status.as_u16()
            )));
        }
        let pinned: PinFileResponse = resp
            .json()
            .map_err(|e| AvatarError::publish(format!("parse upload response: {e}")))?;
        tracing::info!(name = %file_name, cid = %pinned.ipfs_hash, "published asset");
        Ok(ContentId::new(pinned.ipfs_hash))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/pinata.rs"]
mod tests;
