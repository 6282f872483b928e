//! Process-wide configuration, built once at startup and passed by reference.

use std::path::PathBuf;
use std::time::Duration;

use crate::{
    foundation::error::{AvatarError, AvatarResult},
    layers::source::HttpLayerSource,
    pipeline::workspace::DirWorkspaces,
    store::{
        Gateway,
        pinata::{DEFAULT_API_URL, DEFAULT_GATEWAY, PinataAuth, PinataStore},
    },
};

/// Default bound on every outbound HTTP request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
/// Endpoints, credentials and staging location.
pub struct Config {
    /// `None` when no credentials are configured; publishing to Pinata then fails.
    pub pinata_auth: Option<PinataAuth>,
    pub api_url: String,
    pub gateway_url: String,
    /// Base URL layer names are resolved against.
    pub layer_base_url: String,
    pub http_timeout: Duration,
    pub staging_dir: PathBuf,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// - `PINATA_JWT`, or `PINATA_API_KEY` + `PINATA_API_SECRET`
    /// - `PINATA_API_URL` (default `https://api.pinata.cloud`)
    /// - `PINATA_GATEWAY` (default `https://gateway.pinata.cloud/ipfs`)
    /// - `PINATA_ENDPOINT`: layer base URL (defaults to the gateway)
    /// - `LAYERPIN_HTTP_TIMEOUT_SECS` (default 30)
    /// - `LAYERPIN_STAGING_DIR` (default `$TMPDIR/layerpin`)
    pub fn from_env() -> AvatarResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AvatarResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let pinata_auth = match (get("PINATA_JWT"), get("PINATA_API_KEY"), get("PINATA_API_SECRET")) {
            (Some(jwt), _, _) => Some(PinataAuth::Jwt(jwt)),
            (None, Some(key), Some(secret)) => Some(PinataAuth::ApiKey { key, secret }),
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(AvatarError::config(
                    "PINATA_API_KEY and PINATA_API_SECRET must be set together",
                ));
            }
            (None, None, None) => None,
        };

        let gateway_url = get("PINATA_GATEWAY").unwrap_or_else(|| DEFAULT_GATEWAY.to_string());
        let layer_base_url = get("PINATA_ENDPOINT").unwrap_or_else(|| gateway_url.clone());

        let http_timeout = match get("LAYERPIN_HTTP_TIMEOUT_SECS") {
            None => DEFAULT_HTTP_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(AvatarError::config(format!(
                        "LAYERPIN_HTTP_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                    )));
                }
            },
        };

        Ok(Self {
            pinata_auth,
            api_url: get("PINATA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            gateway_url,
            layer_base_url,
            http_timeout,
            staging_dir: get("LAYERPIN_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("layerpin")),
        })
    }

    /// Shared blocking client honouring the configured timeout.
    pub fn http_client(&self) -> AvatarResult<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| AvatarError::config(format!("build http client: {e}")))
    }

    pub fn gateway(&self) -> Gateway {
        Gateway::new(self.gateway_url.clone())
    }

    /// Pinata store; fails when no credentials are configured.
    pub fn pinata_store(&self, client: reqwest::blocking::Client) -> AvatarResult<PinataStore> {
        let auth = self.pinata_auth.clone().ok_or_else(|| {
            AvatarError::config(
                "missing Pinata credentials: set PINATA_JWT or PINATA_API_KEY and PINATA_API_SECRET",
            )
        })?;
        Ok(PinataStore::with_client(client, self.api_url.clone(), auth))
    }

    pub fn layer_source(&self, client: reqwest::blocking::Client) -> HttpLayerSource {
        HttpLayerSource::with_client(client, self.layer_base_url.clone())
    }

    pub fn workspaces(&self) -> DirWorkspaces {
        DirWorkspaces::new(self.staging_dir.clone())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
