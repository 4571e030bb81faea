//! Property panel state and edits for the selected object.

use crate::objects::{
    DesignObject, FontFamily, FontSize, ImageSource, ObjectId, ObjectKind, SerializableColor,
    ShapeKind, Stroke, TextAlign, wrap_degrees,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Variant-specific panel fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PanelDetails {
    Text {
        content: String,
        font_family: FontFamily,
        font_size: FontSize,
        fill: SerializableColor,
        align: TextAlign,
    },
    Shape {
        kind: ShapeKind,
        width: f64,
        height: f64,
        fill: SerializableColor,
        stroke: Option<Stroke>,
    },
    Image {
        source: ImageSource,
        natural_width: u32,
        natural_height: u32,
    },
}

/// Editable mirror of the selected object's attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub visible: bool,
    pub details: PanelDetails,
}

impl PanelState {
    pub fn from_object(object: &DesignObject) -> Self {
        let base = object.base();
        let details = match object {
            DesignObject::Text(text) => PanelDetails::Text {
                content: text.content.clone(),
                font_family: text.font_family,
                font_size: text.font_size,
                fill: text.fill,
                align: text.align,
            },
            DesignObject::Shape(shape) => PanelDetails::Shape {
                kind: shape.kind,
                width: shape.width,
                height: shape.height,
                fill: shape.fill,
                stroke: shape.stroke,
            },
            DesignObject::Image(image) => PanelDetails::Image {
                source: image.source.clone(),
                natural_width: image.natural_width,
                natural_height: image.natural_height,
            },
        };
        Self {
            id: base.id(),
            kind: object.kind(),
            x: base.position.x,
            y: base.position.y,
            scale_x: base.scale_x,
            scale_y: base.scale_y,
            rotation: base.rotation,
            opacity: base.opacity,
            visible: base.visible,
            details,
        }
    }
}

/// A single edit coming from the property panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyEdit {
    Position(Point),
    ScaleX(f64),
    ScaleY(f64),
    Rotation(f64),
    Opacity(f64),
    Visible(bool),
    Content(String),
    FontFamily(FontFamily),
    FontSize(FontSize),
    Align(TextAlign),
    /// Text or shape fill.
    Fill(SerializableColor),
    ShapeKind(ShapeKind),
    Width(f64),
    Height(f64),
    Stroke(Option<Stroke>),
}

impl PropertyEdit {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyEdit::Position(_) => "position",
            PropertyEdit::ScaleX(_) => "scale_x",
            PropertyEdit::ScaleY(_) => "scale_y",
            PropertyEdit::Rotation(_) => "rotation",
            PropertyEdit::Opacity(_) => "opacity",
            PropertyEdit::Visible(_) => "visible",
            PropertyEdit::Content(_) => "content",
            PropertyEdit::FontFamily(_) => "font_family",
            PropertyEdit::FontSize(_) => "font_size",
            PropertyEdit::Align(_) => "align",
            PropertyEdit::Fill(_) => "fill",
            PropertyEdit::ShapeKind(_) => "shape_kind",
            PropertyEdit::Width(_) => "width",
            PropertyEdit::Height(_) => "height",
            PropertyEdit::Stroke(_) => "stroke",
        }
    }

    /// Write the edit onto an object.
    pub fn apply(&self, object: &mut DesignObject) -> Result<(), PropertyError> {
        let kind = object.kind();
        let not_applicable = || PropertyError::NotApplicable {
            property: self.name(),
            kind,
        };
        let invalid = |reason: &'static str| PropertyError::InvalidValue {
            property: self.name(),
            reason,
        };

        match (self, object) {
            (PropertyEdit::Position(p), object) => {
                if !(p.x.is_finite() && p.y.is_finite()) {
                    return Err(invalid("must be finite"));
                }
                object.base_mut().position = *p;
            }
            (PropertyEdit::ScaleX(s), object) => {
                object.base_mut().scale_x =
                    valid_scale(*s).ok_or_else(|| invalid("must be finite and non-zero"))?;
            }
            (PropertyEdit::ScaleY(s), object) => {
                object.base_mut().scale_y =
                    valid_scale(*s).ok_or_else(|| invalid("must be finite and non-zero"))?;
            }
            (PropertyEdit::Rotation(deg), object) => {
                if !deg.is_finite() {
                    return Err(invalid("must be finite"));
                }
                object.base_mut().rotation = wrap_degrees(*deg);
            }
            (PropertyEdit::Opacity(o), object) => {
                if o.is_nan() {
                    return Err(invalid("must be a number"));
                }
                object.base_mut().opacity = o.clamp(0.0, 1.0);
            }
            (PropertyEdit::Visible(v), object) => object.base_mut().visible = *v,

            (PropertyEdit::Content(c), DesignObject::Text(text)) => text.content = c.clone(),
            (PropertyEdit::FontFamily(f), DesignObject::Text(text)) => text.font_family = *f,
            (PropertyEdit::FontSize(s), DesignObject::Text(text)) => text.font_size = *s,
            (PropertyEdit::Align(a), DesignObject::Text(text)) => text.align = *a,
            (PropertyEdit::Fill(c), DesignObject::Text(text)) => text.fill = *c,

            (PropertyEdit::Fill(c), DesignObject::Shape(shape)) => shape.fill = *c,
            (PropertyEdit::ShapeKind(k), DesignObject::Shape(shape)) => shape.kind = *k,
            (PropertyEdit::Width(w), DesignObject::Shape(shape)) => {
                shape.width = valid_extent(*w).ok_or_else(|| invalid("must be finite and positive"))?;
            }
            (PropertyEdit::Height(h), DesignObject::Shape(shape)) => {
                shape.height = valid_extent(*h).ok_or_else(|| invalid("must be finite and positive"))?;
            }
            (PropertyEdit::Stroke(stroke), DesignObject::Shape(shape)) => {
                if let Some(s) = stroke {
                    if !(s.width.is_finite() && s.width >= 0.0) {
                        return Err(invalid("stroke width must be non-negative"));
                    }
                }
                shape.stroke = *stroke;
            }

            _ => return Err(not_applicable()),
        }
        Ok(())
    }
}

fn valid_scale(scale: f64) -> Option<f64> {
    (scale.is_finite() && scale != 0.0).then_some(scale)
}

fn valid_extent(extent: f64) -> Option<f64> {
    (extent.is_finite() && extent > 0.0).then_some(extent)
}

/// Rejected property edits.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PropertyError {
    #[error("no object is selected")]
    NoSelection,
    #[error("{property} does not apply to {kind:?} objects")]
    NotApplicable {
        property: &'static str,
        kind: ObjectKind,
    },
    #[error("invalid {property}: {reason}")]
    InvalidValue {
        property: &'static str,
        reason: &'static str,
    },
}

/// Keeps the panel in step with the current selection.
#[derive(Debug, Clone, Default)]
pub struct PropertySync {
    panel: Option<PanelState>,
}

impl PropertySync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panel(&self) -> Option<&PanelState> {
        self.panel.as_ref()
    }

    /// Re-read the selected object. Returns true if the panel changed.
    pub fn sync(&mut self, selected: Option<&DesignObject>) -> bool {
        let next = selected.map(PanelState::from_object);
        if next == self.panel {
            return false;
        }
        self.panel = next;
        true
    }

    pub fn clear(&mut self) {
        self.panel = None;
    }
}
