//! Edit state: the filter and transform parameters of the current document.
//!
//! An [`EditState`] only exists once a bitmap is loaded. It is replaced
//! wholesale on every action: each operation copies the whole state and
//! overrides one field. The source bitmap sits behind an `Arc`, so copies
//! are cheap.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;

/// A filter name that is not one of the six known filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown filter: {0}")]
pub struct UnknownFilter(pub String);

/// Unit a filter value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterUnit {
    Percent,
    Degrees,
}

impl FilterUnit {
    /// Suffix used in CSS functions and slider labels.
    pub fn suffix(self) -> &'static str {
        match self {
            FilterUnit::Percent => "%",
            FilterUnit::Degrees => "deg",
        }
    }
}

/// One of the six visual filters.
///
/// Declaration order is the order filters are chained in, both in the
/// preview `filter` directive and during rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    Brightness,
    Grayscale,
    Sepia,
    Saturate,
    Contrast,
    HueRotate,
}

struct FilterInfo {
    name: &'static str,
    css_function: &'static str,
    default: f32,
    max: Option<f32>,
    unit: FilterUnit,
}

/// Indexed by `FilterKind as usize`.
static FILTER_TABLE: [FilterInfo; 6] = [
    FilterInfo {
        name: "brightness",
        css_function: "brightness",
        default: 100.0,
        max: Some(200.0),
        unit: FilterUnit::Percent,
    },
    FilterInfo {
        name: "grayscale",
        css_function: "grayscale",
        default: 0.0,
        max: Some(200.0),
        unit: FilterUnit::Percent,
    },
    FilterInfo {
        name: "sepia",
        css_function: "sepia",
        default: 0.0,
        max: Some(200.0),
        unit: FilterUnit::Percent,
    },
    FilterInfo {
        name: "saturate",
        css_function: "saturate",
        default: 100.0,
        max: Some(200.0),
        unit: FilterUnit::Percent,
    },
    FilterInfo {
        name: "contrast",
        css_function: "contrast",
        default: 100.0,
        max: Some(200.0),
        unit: FilterUnit::Percent,
    },
    FilterInfo {
        name: "hueRotate",
        css_function: "hue-rotate",
        default: 0.0,
        max: None,
        unit: FilterUnit::Degrees,
    },
];

impl FilterKind {
    /// All filters in chain order.
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Brightness,
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::Saturate,
        FilterKind::Contrast,
        FilterKind::HueRotate,
    ];

    fn info(self) -> &'static FilterInfo {
        &FILTER_TABLE[self as usize]
    }

    /// Canonical name (`"hueRotate"` for hue rotation).
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Name of the matching CSS filter function.
    pub fn css_function(self) -> &'static str {
        self.info().css_function
    }

    /// Value after load, crop and reset.
    pub fn default_value(self) -> f32 {
        self.info().default
    }

    /// Slider maximum, `None` when unbounded.
    pub fn max_value(self) -> Option<f32> {
        self.info().max
    }

    pub fn unit(self) -> FilterUnit {
        self.info().unit
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.css_function() == s)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

/// The six filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Percent, 100 is identity.
    pub brightness: f32,
    /// Percent, 0 is identity.
    pub grayscale: f32,
    /// Percent, 0 is identity.
    pub sepia: f32,
    /// Percent, 100 is identity.
    pub saturate: f32,
    /// Percent, 100 is identity.
    pub contrast: f32,
    /// Degrees, 0 is identity.
    pub hue_rotate: f32,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            brightness: FilterKind::Brightness.default_value(),
            grayscale: FilterKind::Grayscale.default_value(),
            sepia: FilterKind::Sepia.default_value(),
            saturate: FilterKind::Saturate.default_value(),
            contrast: FilterKind::Contrast.default_value(),
            hue_rotate: FilterKind::HueRotate.default_value(),
        }
    }
}

impl FilterSpec {
    pub fn get(&self, kind: FilterKind) -> f32 {
        match kind {
            FilterKind::Brightness => self.brightness,
            FilterKind::Grayscale => self.grayscale,
            FilterKind::Sepia => self.sepia,
            FilterKind::Saturate => self.saturate,
            FilterKind::Contrast => self.contrast,
            FilterKind::HueRotate => self.hue_rotate,
        }
    }

    /// Set one field. The value is stored as given, without clamping.
    pub fn set(&mut self, kind: FilterKind, value: f32) {
        let field = match kind {
            FilterKind::Brightness => &mut self.brightness,
            FilterKind::Grayscale => &mut self.grayscale,
            FilterKind::Sepia => &mut self.sepia,
            FilterKind::Saturate => &mut self.saturate,
            FilterKind::Contrast => &mut self.contrast,
            FilterKind::HueRotate => &mut self.hue_rotate,
        };
        *field = value;
    }

    /// Copy with one field overridden.
    pub fn with(mut self, kind: FilterKind, value: f32) -> Self {
        self.set(kind, value);
        self
    }

    /// `(kind, value)` pairs in chain order.
    pub fn iter(&self) -> impl Iterator<Item = (FilterKind, f32)> + '_ {
        FilterKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Sign of one flip axis, serialized as `1` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum FlipSign {
    #[default]
    Positive,
    Negative,
}

impl FlipSign {
    pub fn toggled(self) -> Self {
        match self {
            FlipSign::Positive => FlipSign::Negative,
            FlipSign::Negative => FlipSign::Positive,
        }
    }

    pub fn value(self) -> i8 {
        match self {
            FlipSign::Positive => 1,
            FlipSign::Negative => -1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.value())
    }
}

impl From<FlipSign> for i8 {
    fn from(sign: FlipSign) -> Self {
        sign.value()
    }
}

impl TryFrom<i8> for FlipSign {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FlipSign::Positive),
            -1 => Ok(FlipSign::Negative),
            other => Err(format!("flip sign must be 1 or -1, got {other}")),
        }
    }
}

/// Rotation and flips describing geometric placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformSpec {
    /// Clockwise degrees. Accumulates by 90 per action and is never normalized.
    pub rotate: i32,
    pub vertical: FlipSign,
    pub horizontal: FlipSign,
}

/// Degrees added or removed by one rotate action.
pub const ROTATION_STEP: i32 = 90;

impl TransformSpec {
    pub fn rotated_left(self) -> Self {
        Self {
            rotate: self.rotate.wrapping_sub(ROTATION_STEP),
            ..self
        }
    }

    pub fn rotated_right(self) -> Self {
        Self {
            rotate: self.rotate.wrapping_add(ROTATION_STEP),
            ..self
        }
    }

    pub fn flipped_vertical(self) -> Self {
        Self {
            vertical: self.vertical.toggled(),
            ..self
        }
    }

    pub fn flipped_horizontal(self) -> Self {
        Self {
            horizontal: self.horizontal.toggled(),
            ..self
        }
    }

    /// Rotation folded into `[0, 360)`. Geometry only; the stored value is untouched.
    pub fn normalized_rotation(&self) -> i32 {
        self.rotate.rem_euclid(360)
    }

    /// True when painting with this transform leaves every pixel in place.
    pub fn is_identity(&self) -> bool {
        self.normalized_rotation() == 0
            && self.vertical == FlipSign::Positive
            && self.horizontal == FlipSign::Positive
    }
}

/// Which filter the adjustment slider currently targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveProperty {
    pub kind: FilterKind,
    /// Slider maximum, `None` for hue rotation.
    pub max: Option<f32>,
}

impl ActiveProperty {
    /// Clamp a slider value into `[0, max]`. NaN and infinities become 0.
    pub fn clamp(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return 0.0;
        }
        let value = value.max(0.0);
        match self.max {
            Some(max) => value.min(max),
            None => value,
        }
    }
}

impl From<FilterKind> for ActiveProperty {
    fn from(kind: FilterKind) -> Self {
        Self {
            kind,
            max: kind.max_value(),
        }
    }
}

impl Default for ActiveProperty {
    fn default() -> Self {
        FilterKind::Brightness.into()
    }
}

/// The complete record of an open document.
#[derive(Debug, Clone)]
pub struct EditState {
    source: Arc<DecodedImage>,
    pub filters: FilterSpec,
    pub transform: TransformSpec,
}

impl EditState {
    /// Fresh state for a newly loaded bitmap, every parameter at its default.
    pub fn new(source: DecodedImage) -> Self {
        Self {
            source: Arc::new(source),
            filters: FilterSpec::default(),
            transform: TransformSpec::default(),
        }
    }

    pub fn source(&self) -> &DecodedImage {
        &self.source
    }

    /// Natural `(width, height)` of the source bitmap.
    pub fn natural_dimensions(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    pub fn with_filter(&self, kind: FilterKind, value: f32) -> Self {
        Self {
            filters: self.filters.with(kind, value),
            ..self.clone()
        }
    }

    pub fn with_transform(&self, transform: TransformSpec) -> Self {
        Self {
            transform,
            ..self.clone()
        }
    }

    /// Defaults for every filter and transform field, same bitmap.
    pub fn reset(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            filters: FilterSpec::default(),
            transform: TransformSpec::default(),
        }
    }

    /// Serializable view of everything but the pixels.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            width: self.source.width,
            height: self.source.height,
            filters: self.filters,
            transform: self.transform,
        }
    }
}

/// Flat, serializable summary of an [`EditState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub width: u32,
    pub height: u32,
    #[serde(flatten)]
    pub filters: FilterSpec,
    #[serde(flatten)]
    pub transform: TransformSpec,
}
