use image::RgbaImage;
use serde::Serialize;

use crate::{
    foundation::error::{AvatarError, AvatarResult},
    layers::{decode::encode_png, source::LayerSource, source::resolve_layers},
    model::character::CharacterDescription,
    pipeline::workspace::{Workspace, WorkspaceProvider},
    render::{
        composite::composite_layers,
        thumbnail::{ThumbnailSpec, derive_thumbnail},
    },
    store::{ArtifactStore, ContentId, Gateway, pinata::pin_file_name},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// What to do with assets already published under the names about to be reused.
pub enum ReplacePolicy {
    /// Publish without looking for previous assets.
    Skip,
    /// Unpin previous assets; failing to do so aborts the request with an error.
    #[default]
    Strict,
    /// Unpin previous assets; failing to do so ends the request with a `Fail` outcome.
    Soft,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Which artifacts a request publishes.
pub enum ArtifactSet {
    /// Profile thumbnail and full character image.
    #[default]
    Both,
    /// Profile thumbnail only.
    ThumbnailOnly,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Per-deployment pipeline policy.
pub struct PipelineOpts {
    pub thumbnail: ThumbnailSpec,
    pub replace: ReplacePolicy,
    pub artifacts: ArtifactSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Pipeline stages, in execution order.
pub enum Stage {
    ReplaceCheck,
    Composite,
    DeriveThumbnail,
    Encode,
    Upload,
    Cleanup,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Successful publish: asset identity plus retrieval URLs and identifiers.
pub struct PublishReceipt {
    pub user_id: String,
    /// Gateway URL of the profile thumbnail.
    pub profile: String,
    /// Gateway URL of the full character image, when published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    pub profile_cid: ContentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_cid: Option<ContentId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Soft failure: a previous asset could not be removed, nothing was published.
pub struct ReplaceFailure {
    pub user_id: String,
    pub profile: String,
    pub character: String,
    pub reason: String,
}

impl ReplaceFailure {
    fn new(user_id: &str, reason: String) -> Self {
        Self {
            user_id: user_id.to_string(),
            profile: String::new(),
            character: String::new(),
            reason,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state")]
/// Non-error outcome of [`PublishPipeline::run`]. Hard failures are the `Err` side.
pub enum PublishOutcome {
    /// Everything was published.
    Success(PublishReceipt),
    /// Replace check failed under [`ReplacePolicy::Soft`].
    Fail(ReplaceFailure),
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[derive(Clone, Debug)]
/// Full composite plus its derived thumbnail.
pub struct RenderedCharacter {
    pub character: RgbaImage,
    pub thumbnail: RgbaImage,
}

/// Fetch, composite and derive the thumbnail for `desc`. No publishing.
pub fn render_character(
    source: &dyn LayerSource,
    desc: &CharacterDescription,
    thumbnail: &ThumbnailSpec,
) -> AvatarResult<RenderedCharacter> {
    let refs = desc.layer_refs();
    let layers = at(Stage::Composite, resolve_layers(source, &refs))?;
    let character = at(Stage::Composite, composite_layers(&layers))?;
    let thumbnail = at(Stage::DeriveThumbnail, derive_thumbnail(&character, thumbnail))?;
    Ok(RenderedCharacter {
        character,
        thumbnail,
    })
}

fn at<T>(stage: Stage, res: AvatarResult<T>) -> AvatarResult<T> {
    if let Err(err) = &res {
        tracing::warn!(?stage, error = %err, "pipeline stage failed");
    } else {
        tracing::debug!(?stage, "pipeline stage done");
    }
    res
}

/// One-request orchestrator: replace check, render, stage, upload, clean up.
pub struct PublishPipeline<'a> {
    layers: &'a dyn LayerSource,
    store: &'a dyn ArtifactStore,
    workspaces: &'a dyn WorkspaceProvider,
    gateway: Gateway,
    opts: PipelineOpts,
}

impl<'a> PublishPipeline<'a> {
    pub fn new(
        layers: &'a dyn LayerSource,
        store: &'a dyn ArtifactStore,
        workspaces: &'a dyn WorkspaceProvider,
        gateway: Gateway,
        opts: PipelineOpts,
    ) -> Self {
        Self {
            layers,
            store,
            workspaces,
            gateway,
            opts,
        }
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Store names this request publishes under, thumbnail first.
    pub fn target_names(&self, desc: &CharacterDescription) -> Vec<String> {
        match self.opts.artifacts {
            ArtifactSet::ThumbnailOnly => vec![desc.thumbnail_asset_name()],
            ArtifactSet::Both => vec![desc.thumbnail_asset_name(), desc.character_asset_name()],
        }
    }

    /// Run the whole pipeline for one request.
    ///
    /// The staging workspace is released on every path; a failure to release it after a
    /// successful upload is logged and does not change the outcome.
    #[tracing::instrument(skip_all, fields(user_id = %desc.user_id))]
    pub fn run(&self, desc: &CharacterDescription) -> AvatarResult<PublishOutcome> {
        desc.validate()?;

        if let Some(failure) = at(Stage::ReplaceCheck, self.replace_previous(desc))? {
            return Ok(PublishOutcome::Fail(failure));
        }

        let rendered = render_character(self.layers, desc, &self.opts.thumbnail)?;

        let mut ws = at(Stage::Encode, self.workspaces.acquire(&desc.user_id))?;
        let uploaded = self.stage_and_upload(ws.as_mut(), desc, &rendered);

        if let Err(err) = ws.release() {
            tracing::warn!(stage = ?Stage::Cleanup, error = %err, "workspace cleanup failed");
        }

        let receipt = uploaded?;
        tracing::info!(profile = %receipt.profile, "character published");
        Ok(PublishOutcome::Success(receipt))
    }

    fn replace_previous(&self, desc: &CharacterDescription) -> AvatarResult<Option<ReplaceFailure>> {
        if self.opts.replace == ReplacePolicy::Skip {
            return Ok(None);
        }

        for name in self.target_names(desc) {
            // Earlier skipped checks or racing writers can leave several pins per name.
            for previous in self.store.find_by_name(&name)? {
                tracing::info!(%name, cid = %previous, "replacing previous asset");

                if let Err(err) = self.store.unpin(&previous) {
                    let reason = format!("could not remove previous '{name}' ({previous}): {err}");
                    return match self.opts.replace {
                        ReplacePolicy::Soft => Ok(Some(ReplaceFailure::new(&desc.user_id, reason))),
                        _ => Err(AvatarError::replace_conflict(reason)),
                    };
                }
            }
        }
        Ok(None)
    }

    fn stage_files(
        &self,
        ws: &mut dyn Workspace,
        desc: &CharacterDescription,
        rendered: &RenderedCharacter,
    ) -> AvatarResult<()> {
        let png = encode_png(&rendered.thumbnail)?;
        ws.write(&pin_file_name(&desc.thumbnail_asset_name()), &png)?;
        if self.opts.artifacts == ArtifactSet::Both {
            let png = encode_png(&rendered.character)?;
            ws.write(&pin_file_name(&desc.character_asset_name()), &png)?;
        }
        Ok(())
    }

    fn stage_and_upload(
        &self,
        ws: &mut dyn Workspace,
        desc: &CharacterDescription,
        rendered: &RenderedCharacter,
    ) -> AvatarResult<PublishReceipt> {
        let thumb_name = desc.thumbnail_asset_name();
        let char_name = desc.character_asset_name();
        let publish_character = self.opts.artifacts == ArtifactSet::Both;

        at(Stage::Encode, self.stage_files(ws, desc, rendered))?;

        let publish = |name: &str| -> AvatarResult<ContentId> {
            let bytes = ws.read(&pin_file_name(name))?;
            self.store.publish(&bytes, name)
        };

        let profile = at(Stage::Upload, publish(&thumb_name))?;
        let character = if publish_character {
            Some(at(Stage::Upload, publish(&char_name))?)
        } else {
            None
        };

        Ok(PublishReceipt {
            user_id: desc.user_id.clone(),
            profile: self.gateway.url_for(&profile),
            character: character.as_ref().map(|cid| self.gateway.url_for(cid)),
            profile_cid: profile,
            character_cid: character,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/publish.rs"]
mod tests;
