//! layerpin renders layered character avatars and publishes them to IPFS.
//!
//! A client describes a character as named layer choices (skin, hair, outfit, accessories).
//! layerpin turns that description into two images and pins both through Pinata:
//!
//! 1. **Resolve**: every non-empty layer reference is fetched and decoded to RGBA8
//!    ([`LayerSource`]). Empty slots are skipped; a broken reference fails the request.
//! 2. **Composite**: layers are stacked bottom-up over the base skin layer with "over"
//!    blending, each resized to the base canvas ([`composite_layers`]).
//! 3. **Thumbnail**: the composite is flattened onto a solid background, cropped around the
//!    face, resized to a square and masked to a circle ([`derive_thumbnail`]).
//! 4. **Publish**: both images are staged as PNG in a request-scoped [`Workspace`] and
//!    uploaded to an [`ArtifactStore`], replacing whatever was published under the same names
//!    ([`PublishPipeline`]).
//!
//! The pipeline's result is explicit: `Ok(PublishOutcome::Success)`, `Ok(PublishOutcome::Fail)`
//! for a soft replace failure, or `Err(AvatarError)` for everything else.
#![forbid(unsafe_code)]

mod foundation;
mod layers;
mod model;
mod pipeline;
mod render;
mod store;

/// Environment-driven process configuration.
pub mod config;

pub use config::{Config, DEFAULT_HTTP_TIMEOUT};
pub use foundation::error::{AvatarError, AvatarResult, ErrorResponse, FieldViolation};
pub use layers::decode::{decode_layer, encode_png};
pub use layers::source::{
    DirLayerSource, HttpLayerSource, LayerSource, is_absolute_url, resolve_layer, resolve_layers,
};
pub use model::character::{
    CharacterDescription, Face, Item, LayerRef, LayerSlot, Outfit, THUMBNAIL_NAME_SUFFIX,
};
pub use pipeline::publish::{
    ArtifactSet, PipelineOpts, PublishOutcome, PublishPipeline, PublishReceipt, RenderedCharacter,
    ReplaceFailure, ReplacePolicy, Stage, render_character,
};
pub use pipeline::workspace::{
    DirWorkspace, DirWorkspaces, MemoryWorkspaces, Workspace, WorkspaceProvider,
};
pub use render::composite::{LAYER_FILTER, Rgba8, composite_layers, over, over_in_place};
pub use render::thumbnail::{
    CropBox, THUMBNAIL_BACKGROUND, THUMBNAIL_SIZE, ThumbnailSpec, apply_circle_mask, crop_box,
    derive_thumbnail, flatten,
};
pub use store::memory::{MemoryStore, StoreEvent};
pub use store::pinata::{DEFAULT_API_URL, DEFAULT_GATEWAY, PinataAuth, PinataStore, pin_file_name};
pub use store::{ArtifactStore, ContentId, Gateway, PublishedAsset};
