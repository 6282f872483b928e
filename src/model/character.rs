use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{AvatarError, AvatarResult, FieldViolation};

/// Suffix appended to the asset identity to name the published thumbnail.
pub const THUMBNAIL_NAME_SUFFIX: &str = "Profile";

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// Reference to one layer image.
///
/// Requests carry either a plain locator string or a `{name, imgurl}` object per slot.
/// `null`, `""` and an object with both fields empty all mean "layer omitted".
pub enum LayerRef {
    /// Slot left out of the request or explicitly `null`.
    #[default]
    Empty,
    /// Layer name or absolute URL.
    Locator(String),
    /// Catalogue entry with display name and optional direct image URL.
    Named {
        /// Catalogue name; used as locator when `imgurl` is empty.
        #[serde(default)]
        name: String,
        /// Direct image URL.
        #[serde(default)]
        imgurl: String,
    },
}

impl LayerRef {
    /// Build a plain locator reference.
    pub fn locator(s: impl Into<String>) -> Self {
        Self::Locator(s.into())
    }

    /// The locator to fetch, or `None` when the layer is omitted.
    pub fn as_locator(&self) -> Option<&str> {
        let raw = match self {
            Self::Empty => return None,
            Self::Locator(s) => s.as_str(),
            Self::Named { name, imgurl } => {
                if imgurl.trim().is_empty() {
                    name.as_str()
                } else {
                    imgurl.as_str()
                }
            }
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Whether the slot contributes nothing to the composite.
    pub fn is_absent(&self) -> bool {
        self.as_locator().is_none()
    }
}

impl From<&str> for LayerRef {
    fn from(s: &str) -> Self {
        Self::Locator(s.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Layer slots in canonical compositing order.
pub enum LayerSlot {
    /// Base layer; defines the canvas.
    SkinColor,
    Hair,
    Expression,
    Top,
    Bottom,
    Shoes,
    Head,
    Eyes,
    Ears,
    Neck,
    LeftWrist,
    RightWrist,
    LeftHand,
    RightHand,
}

impl LayerSlot {
    /// Every slot, bottom-most first.
    pub const ORDER: [LayerSlot; 14] = [
        LayerSlot::SkinColor,
        LayerSlot::Hair,
        LayerSlot::Expression,
        LayerSlot::Top,
        LayerSlot::Bottom,
        LayerSlot::Shoes,
        LayerSlot::Head,
        LayerSlot::Eyes,
        LayerSlot::Ears,
        LayerSlot::Neck,
        LayerSlot::LeftWrist,
        LayerSlot::RightWrist,
        LayerSlot::LeftHand,
        LayerSlot::RightHand,
    ];

    /// Dotted JSON path of the slot, e.g. `item.leftWrist`.
    pub fn field_path(self) -> &'static str {
        match self {
            Self::SkinColor => "face.skinColor",
            Self::Hair => "face.hair",
            Self::Expression => "face.expression",
            Self::Top => "outfit.top",
            Self::Bottom => "outfit.bottom",
            Self::Shoes => "outfit.shoes",
            Self::Head => "item.head",
            Self::Eyes => "item.eyes",
            Self::Ears => "item.ears",
            Self::Neck => "item.neck",
            Self::LeftWrist => "item.leftWrist",
            Self::RightWrist => "item.rightWrist",
            Self::LeftHand => "item.leftHand",
            Self::RightHand => "item.rightHand",
        }
    }

    /// Whether this is the slot that defines the canvas.
    pub fn is_base(self) -> bool {
        self == Self::SkinColor
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Face layers.
pub struct Face {
    /// Base skin layer. Required.
    pub skin_color: LayerRef,
    #[serde(default)]
    pub hair: LayerRef,
    #[serde(default)]
    pub expression: LayerRef,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Outfit layers, composited top, bottom, shoes.
pub struct Outfit {
    #[serde(default)]
    pub top: LayerRef,
    #[serde(default)]
    pub bottom: LayerRef,
    #[serde(default)]
    pub shoes: LayerRef,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Accessory layers. Every slot is optional.
pub struct Item {
    pub head: LayerRef,
    pub eyes: LayerRef,
    pub ears: LayerRef,
    pub neck: LayerRef,
    pub left_wrist: LayerRef,
    pub right_wrist: LayerRef,
    pub left_hand: LayerRef,
    pub right_hand: LayerRef,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A character as submitted by a client.
///
/// Only `face`, `outfit` and `item` affect pixels. `user_id` is the asset identity used as the
/// publish key; the remaining fields are descriptive metadata.
pub struct CharacterDescription {
    /// Asset identity. Must be non-empty.
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub birth_date: String,
    /// Informational only; the thumbnail background is a fixed fill colour.
    #[serde(default)]
    pub background_name: String,
    pub face: Face,
    #[serde(default)]
    pub outfit: Outfit,
    #[serde(default)]
    pub item: Item,
}

impl CharacterDescription {
    /// Parse a description from JSON. Shape errors are reported as validation failures.
    pub fn from_json_str(s: &str) -> AvatarResult<Self> {
        serde_json::from_str(s).map_err(|e| AvatarError::validation("body", e.to_string()))
    }

    /// Read and parse a description from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> AvatarResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read character description '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Check every field constraint and report all violations together.
    pub fn validate(&self) -> AvatarResult<()> {
        let mut violations = Vec::new();

        if let Err(msg) = check_asset_identity(&self.user_id) {
            violations.push(FieldViolation::new("userId", msg));
        }
        if self.face.skin_color.is_absent() {
            violations.push(FieldViolation::new(
                LayerSlot::SkinColor.field_path(),
                "base layer must not be empty",
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AvatarError::Validation(violations))
        }
    }

    /// References for every slot, in compositing order.
    pub fn layer_refs(&self) -> [(LayerSlot, &LayerRef); 14] {
        let f = &self.face;
        let o = &self.outfit;
        let i = &self.item;
        [
            (LayerSlot::SkinColor, &f.skin_color),
            (LayerSlot::Hair, &f.hair),
            (LayerSlot::Expression, &f.expression),
            (LayerSlot::Top, &o.top),
            (LayerSlot::Bottom, &o.bottom),
            (LayerSlot::Shoes, &o.shoes),
            (LayerSlot::Head, &i.head),
            (LayerSlot::Eyes, &i.eyes),
            (LayerSlot::Ears, &i.ears),
            (LayerSlot::Neck, &i.neck),
            (LayerSlot::LeftWrist, &i.left_wrist),
            (LayerSlot::RightWrist, &i.right_wrist),
            (LayerSlot::LeftHand, &i.left_hand),
            (LayerSlot::RightHand, &i.right_hand),
        ]
    }

    /// Store name of the full character image.
    pub fn character_asset_name(&self) -> String {
        self.user_id.clone()
    }

    /// Store name of the profile thumbnail.
    pub fn thumbnail_asset_name(&self) -> String {
        format!("{}{THUMBNAIL_NAME_SUFFIX}", self.user_id)
    }
}

// The identity names store objects and the staging directory.
fn check_asset_identity(id: &str) -> Result<(), &'static str> {
    if id.trim().is_empty() {
        return Err("must not be empty");
    }
    if id == "." || id == ".." {
        return Err("must not be a relative path component");
    }
    if id.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err("must not contain path separators or control characters");
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/model/character.rs"]
mod tests;
