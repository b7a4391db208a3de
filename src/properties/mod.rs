use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[cfg(test)]
mod tests;

/// Position of a scene item inside its scene.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    /// Alignment bitmask as reported by the remote side (opaque to prism).
    pub alignment: u32,
}

/// Per-axis scale factors applied to the source before bounds fitting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

/// Pixels cropped off each edge of the source before scaling.
///
/// Offsets are remote-defined and may be negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub top: i32,
    pub left: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Bounds fitting mode of a scene item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundsKind {
    #[serde(rename = "OBS_BOUNDS_NONE")]
    None,
    #[serde(rename = "OBS_BOUNDS_STRETCH")]
    Stretch,
    #[serde(rename = "OBS_BOUNDS_SCALE_INNER")]
    ScaleInner,
    #[serde(rename = "OBS_BOUNDS_SCALE_OUTER")]
    ScaleOuter,
    #[serde(rename = "OBS_BOUNDS_SCALE_TO_WIDTH")]
    ScaleToWidth,
    #[serde(rename = "OBS_BOUNDS_SCALE_TO_HEIGHT")]
    ScaleToHeight,
    #[serde(rename = "OBS_BOUNDS_MAX_ONLY")]
    MaxOnly,
}

/// Bounding box a scene item is fitted into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(rename = "type")]
    pub kind: BoundsKind,
    pub alignment: u32,
    pub x: f64,
    pub y: f64,
}

/// Full property snapshot of a remote scene item at one instant.
///
/// This is the shape returned by a `GetSceneItemProperties` round trip and
/// the shape held as the local replica. `source_width`/`source_height` are
/// fixed for the lifetime of a mirrored item; everything else changes as the
/// remote side changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneItemProperties {
    /// The name of the source. Remote-assigned identity key; the remote may
    /// rename the item, in which case a refresh carries the new name.
    pub name: String,
    /// The position of the item inside its scene.
    pub position: Position,
    /// Clockwise rotation of the item in degrees around the alignment point.
    pub rotation: f64,
    /// Scale factors applied to the source.
    pub scale: Scale,
    /// Pixels cropped off the source before scaling.
    pub crop: Crop,
    /// Whether the source is visible.
    pub visible: bool,
    /// Whether the item's transform is locked in the remote UI.
    pub locked: bool,
    /// Bounding box the item is fitted into.
    pub bounds: Bounds,
    /// Base width (without scaling) of the source.
    #[serde(rename = "sourceWidth")]
    pub source_width: f64,
    /// Base height (without scaling) of the source.
    #[serde(rename = "sourceHeight")]
    pub source_height: f64,
    /// Scene item width (base width multiplied by the horizontal scale).
    pub width: f64,
    /// Scene item height (base height multiplied by the vertical scale).
    pub height: f64,
}

impl SceneItemProperties {
    /// Decodes a remote response payload into a typed snapshot.
    ///
    /// Unknown envelope fields (`message-id`, `status`, ...) are ignored;
    /// a missing or malformed property fails with [`DecodeError`].
    pub fn decode(value: Value) -> Result<Self, DecodeError> {
        serde_json::from_value(value).map_err(|e| DecodeError::new(e.to_string()))
    }
}

/// Sparse set of scene item properties to change remotely.
///
/// `None` fields are not sent and the corresponding remote values stay
/// untouched. `width`, `height` and the source dimensions are reported by
/// the remote side and cannot be set.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SceneItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl SceneItemUpdate {
    /// Returns the update with `rotation` (if set) passed through
    /// [`clamp_rotation`]. Other fields are sent as given.
    pub fn normalized(mut self) -> Self {
        if let Some(rotation) = self.rotation {
            self.rotation = Some(clamp_rotation(rotation));
        }
        self
    }
}

/// Clamps a caller-supplied rotation into the remote's readable range.
///
/// Values above 359 become 0 and values below 0 become 359. This is a
/// single-step wrap, not a modulo: 400 clamps to 0, not 40. Callers stepping
/// rotation by one degree per tick cross each bound one step at a time, which
/// is the pattern this is built for.
pub fn clamp_rotation(degrees: f64) -> f64 {
    if degrees > 359.0 {
        0.0
    } else if degrees < 0.0 {
        359.0
    } else {
        degrees
    }
}

/// Error decoding a remote payload into the typed property model.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid scene item payload: {}", self.message)
    }
}

impl std::error::Error for DecodeError {}
