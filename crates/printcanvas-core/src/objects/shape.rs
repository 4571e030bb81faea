//! Geometric shape objects.

use super::{ObjectBase, ObjectTrait, SerializableColor};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Kind of geometric shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
}

impl ShapeKind {
    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Triangle => "Triangle",
        }
    }

    pub fn all() -> &'static [ShapeKind] {
        &[ShapeKind::Rectangle, ShapeKind::Circle, ShapeKind::Triangle]
    }
}

/// Outline drawn around a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: SerializableColor,
    pub width: f64,
}

/// Style used when creating a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill: SerializableColor,
    pub stroke: Option<Stroke>,
    pub width: f64,
    pub height: f64,
}

impl ShapeStyle {
    /// Default fill for new shapes (indigo).
    pub const DEFAULT_FILL: SerializableColor = SerializableColor::rgb(0x63, 0x66, 0xf1);
    pub const DEFAULT_SIZE: f64 = 100.0;

    pub fn with_fill(fill: SerializableColor) -> Self {
        Self {
            fill,
            ..Self::default()
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: Self::DEFAULT_FILL,
            stroke: None,
            width: Self::DEFAULT_SIZE,
            height: Self::DEFAULT_SIZE,
        }
    }
}

/// A rectangle, circle (ellipse inscribed in width x height) or triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    pub kind: ShapeKind,
    pub width: f64,
    pub height: f64,
    pub fill: SerializableColor,
    #[serde(default)]
    pub stroke: Option<Stroke>,
}

impl ShapeObject {
    pub fn new(kind: ShapeKind, position: Point, style: ShapeStyle) -> Self {
        Self {
            base: ObjectBase::new(position),
            kind,
            width: style.width,
            height: style.height,
            fill: style.fill,
            stroke: style.stroke,
        }
    }

    /// Triangle vertices in local space: apex top-center, base at the bottom.
    pub fn triangle_points(&self) -> [Point; 3] {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [
            Point::new(0.0, -hh),
            Point::new(hw, hh),
            Point::new(-hw, hh),
        ]
    }
}

impl ObjectTrait for ShapeObject {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn intrinsic_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn contains_local(&self, local: Point) -> bool {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        match self.kind {
            ShapeKind::Rectangle => local.x.abs() <= hw && local.y.abs() <= hh,
            ShapeKind::Circle => {
                if hw <= 0.0 || hh <= 0.0 {
                    return false;
                }
                let (nx, ny) = (local.x / hw, local.y / hh);
                nx * nx + ny * ny <= 1.0
            }
            ShapeKind::Triangle => {
                let [a, b, c] = self.triangle_points();
                point_in_triangle(local, a, b, c)
            }
        }
    }
}

/// Sign-based point-in-triangle test (edges inclusive).
fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let cross = |o: Point, q: Point, r: Point| (q.x - o.x) * (r.y - o.y) - (q.y - o.y) * (r.x - o.x);
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
