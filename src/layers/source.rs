use std::path::PathBuf;
use std::time::Duration;

use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    foundation::error::{AvatarError, AvatarResult},
    layers::decode::decode_layer,
    model::character::{LayerRef, LayerSlot},
};

/// Fetches encoded layer bytes by locator.
///
/// Implementations must treat a non-success response as an error; "absent" is decided by the
/// caller before a source is ever consulted.
pub trait LayerSource: Send + Sync {
    /// Fetch the encoded image bytes for a non-empty `locator`.
    fn fetch(&self, locator: &str) -> AvatarResult<Vec<u8>>;
}

/// Resolve one reference: `None` when omitted, decoded RGBA8 otherwise.
pub fn resolve_layer(source: &dyn LayerSource, layer: &LayerRef) -> AvatarResult<Option<RgbaImage>> {
    let Some(locator) = layer.as_locator() else {
        return Ok(None);
    };
    let bytes = source.fetch(locator)?;
    let img = decode_layer(&bytes).map_err(|e| AvatarError::layer_fetch(locator, e.to_string()))?;
    Ok(Some(img))
}

/// Resolve every slot, fetching in parallel. Output order matches `refs`.
pub fn resolve_layers(
    source: &dyn LayerSource,
    refs: &[(LayerSlot, &LayerRef)],
) -> AvatarResult<Vec<Option<RgbaImage>>> {
    refs.par_iter()
        .map(|(slot, layer)| {
            let resolved = resolve_layer(source, layer);
            if let Err(err) = &resolved {
                tracing::warn!(slot = slot.field_path(), error = %err, "layer resolution failed");
            }
            resolved
        })
        .collect()
}

/// Whether `locator` is an absolute http(s) URL rather than a catalogue name.
pub fn is_absolute_url(locator: &str) -> bool {
    let lower = locator.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Layer source backed by an HTTP endpoint.
///
/// Names resolve to `{base_url}/{name}.png`; absolute URLs are fetched as given.
#[derive(Clone, Debug)]
pub struct HttpLayerSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpLayerSource {
    /// Build a source with its own client and request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AvatarResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AvatarError::config(format!("build http client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Build a source sharing an existing client.
    pub fn with_client(client: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// URL fetched for `locator`.
    pub fn url_for(&self, locator: &str) -> String {
        if is_absolute_url(locator) {
            locator.to_string()
        } else {
            format!("{}/{}.png", self.base_url.trim_end_matches('/'), locator)
        }
    }
}

impl LayerSource for HttpLayerSource {
    fn fetch(&self, locator: &str) -> AvatarResult<Vec<u8>> {
        let url = self.url_for(locator);
        tracing::debug!(%url, "fetching layer");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AvatarError::layer_fetch(locator, format!("request failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AvatarError::layer_fetch(
                locator,
                format!("HTTP {} from {url}", status.as_u16()),
            ));
        }
        let bytes = resp
            .bytes()
            .map_err(|e| AvatarError::layer_fetch(locator, format!("read body: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Layer source reading `{root}/{name}.png` from a local directory.
#[derive(Clone, Debug)]
pub struct DirLayerSource {
    root: PathBuf,
}

impl DirLayerSource {
    /// Serve layers from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path read for a layer name.
    pub fn path_for(&self, locator: &str) -> AvatarResult<PathBuf> {
        if is_absolute_url(locator) {
            return Err(AvatarError::layer_fetch(
                locator,
                "URLs cannot be served from a layer directory",
            ));
        }
        let normalized = locator.replace('\\', "/");
        if normalized.starts_with('/') || normalized.split('/').any(|part| part == "..") {
            return Err(AvatarError::layer_fetch(
                locator,
                "layer name must stay inside the layer directory",
            ));
        }
        Ok(self.root.join(format!("{normalized}.png")))
    }
}

impl LayerSource for DirLayerSource {
    fn fetch(&self, locator: &str) -> AvatarResult<Vec<u8>> {
        let path = self.path_for(locator)?;
        std::fs::read(&path)
            .map_err(|e| AvatarError::layer_fetch(locator, format!("read '{}': {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/source.rs"]
mod tests;
