//! Design object definitions for the print canvas.

mod image;
mod shape;
mod text;

pub use image::{ImageFormat, ImageObject, ImageSource};
pub use shape::{ShapeKind, ShapeObject, ShapeStyle, Stroke};
pub use text::{FontFamily, FontSize, TextAlign, TextObject, TextStyle};

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for design objects.
pub type ObjectId = Uuid;

/// Error parsing a hex color string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid color {0:?}: expected #rgb, #rrggbb or #rrggbbaa")]
pub struct ColorParseError(pub String);

/// Serializable color representation (RGBA8), stored as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Alpha as a 0.0..=1.0 fraction.
    pub fn alpha_f64(&self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SerializableColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(0..1).map_err(|_| err())? * 17;
                let g = channel(1..2).map_err(|_| err())? * 17;
                let b = channel(2..3).map_err(|_| err())? * 17;
                Ok(Self::rgb(r, g, b))
            }
            6 | 8 => {
                let r = channel(0..2).map_err(|_| err())?;
                let g = channel(2..4).map_err(|_| err())?;
                let b = channel(4..6).map_err(|_| err())?;
                let a = if hex.len() == 8 {
                    channel(6..8).map_err(|_| err())?
                } else {
                    255
                };
                Ok(Self::new(r, g, b, a))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

fn default_one() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// Fields shared by every design object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectBase {
    pub(crate) id: ObjectId,
    /// Center of the object in canvas coordinates.
    pub position: Point,
    #[serde(default = "default_one")]
    pub scale_x: f64,
    #[serde(default = "default_one")]
    pub scale_y: f64,
    /// Rotation in degrees, kept in [0, 360).
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_one")]
    pub opacity: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl ObjectBase {
    pub fn new(position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Local (origin-centered) space to canvas space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Map a canvas point into the object's local space.
    /// Returns `None` for degenerate (zero-scale) transforms.
    pub fn to_local(&self, point: Point) -> Option<Point> {
        let affine = self.transform();
        if affine.determinant().abs() < f64::EPSILON {
            return None;
        }
        Some(affine.inverse() * point)
    }
}

/// Wrap an angle in degrees into [0, 360).
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Common behavior for all design object variants.
pub trait ObjectTrait {
    fn base(&self) -> &ObjectBase;

    fn base_mut(&mut self) -> &mut ObjectBase;

    /// Untransformed size of the object's local geometry.
    fn intrinsic_size(&self) -> (f64, f64);

    /// Check whether a local-space point lies inside the geometry.
    fn contains_local(&self, local: Point) -> bool {
        let (w, h) = self.intrinsic_size();
        local.x.abs() <= w / 2.0 && local.y.abs() <= h / 2.0
    }
}

/// Enum wrapper for all design object types (tagged by `type` when serialized).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DesignObject {
    Text(TextObject),
    Shape(ShapeObject),
    Image(ImageObject),
}

/// Variant discriminant, used by the property panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Text,
    Shape,
    Image,
}

impl DesignObject {
    fn inner(&self) -> &dyn ObjectTrait {
        match self {
            DesignObject::Text(o) => o,
            DesignObject::Shape(o) => o,
            DesignObject::Image(o) => o,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ObjectTrait {
        match self {
            DesignObject::Text(o) => o,
            DesignObject::Shape(o) => o,
            DesignObject::Image(o) => o,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.base().id
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            DesignObject::Text(_) => ObjectKind::Text,
            DesignObject::Shape(_) => ObjectKind::Shape,
            DesignObject::Image(_) => ObjectKind::Image,
        }
    }

    pub fn base(&self) -> &ObjectBase {
        self.inner().base()
    }

    pub fn base_mut(&mut self) -> &mut ObjectBase {
        self.inner_mut().base_mut()
    }

    pub fn intrinsic_size(&self) -> (f64, f64) {
        self.inner().intrinsic_size()
    }

    pub fn position(&self) -> Point {
        self.base().position
    }

    pub fn is_visible(&self) -> bool {
        self.base().visible
    }

    /// Axis-aligned bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.intrinsic_size();
        let local = Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0);
        self.base().transform().transform_rect_bbox(local)
    }

    /// Check if a canvas point hits this object (rotation-aware).
    pub fn hit_test(&self, point: Point) -> bool {
        match self.base().to_local(point) {
            Some(local) => self.inner().contains_local(local),
            None => false,
        }
    }

    /// Move the object by a canvas-space delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.base_mut().position += delta;
    }

    /// Add to the rotation, wrapping into [0, 360).
    pub fn rotate_by(&mut self, degrees: f64) {
        let base = self.base_mut();
        base.rotation = wrap_degrees(base.rotation + degrees);
    }

    /// Bring loaded values into range: rotation wrapped into [0, 360) and
    /// opacity clamped into [0, 1]. Values no edit could produce (non-finite
    /// numbers, zero scale, empty extents) are rejected.
    pub fn normalize(&mut self) -> Result<(), &'static str> {
        let base = self.base_mut();
        if !(base.position.x.is_finite() && base.position.y.is_finite()) {
            return Err("position must be finite");
        }
        for scale in [base.scale_x, base.scale_y] {
            if !scale.is_finite() || scale == 0.0 {
                return Err("scale must be finite and non-zero");
            }
        }
        if !base.rotation.is_finite() {
            return Err("rotation must be finite");
        }
        if base.opacity.is_nan() {
            return Err("opacity must be a number");
        }
        base.rotation = wrap_degrees(base.rotation);
        base.opacity = base.opacity.clamp(0.0, 1.0);

        match self {
            DesignObject::Shape(shape) => {
                let positive = |v: f64| v.is_finite() && v > 0.0;
                if !(positive(shape.width) && positive(shape.height)) {
                    return Err("shape size must be finite and positive");
                }
                if shape.stroke.is_some_and(|s| !(s.width.is_finite() && s.width >= 0.0)) {
                    return Err("stroke width must be non-negative");
                }
            }
            DesignObject::Image(image) => {
                if image.natural_width == 0 || image.natural_height == 0 {
                    return Err("image has no pixels");
                }
            }
            DesignObject::Text(_) => {}
        }
        Ok(())
    }

    /// Regenerate the object's ID with a new unique identifier.
    /// Used when duplicating so clones never share an id.
    pub fn regenerate_id(&mut self) {
        self.base_mut().id = Uuid::new_v4();
    }

    pub fn as_text(&self) -> Option<&TextObject> {
        match self {
            DesignObject::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeObject> {
        match self {
            DesignObject::Shape(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageObject> {
        match self {
            DesignObject::Image(i) => Some(i),
            _ => None,
        }
    }
}
