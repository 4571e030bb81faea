//! Text objects.

use super::{ObjectBase, ObjectTrait, SerializableColor};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Font families available for printing.
///
/// Restricted to a fixed set so exported designs never reference typography
/// the print pipeline cannot reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Arial,
    Helvetica,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    Georgia,
    Verdana,
    #[serde(rename = "Courier New")]
    CourierNew,
    Impact,
    #[serde(rename = "Comic Sans MS")]
    ComicSansMs,
}

impl FontFamily {
    /// Get the font family name as used by the renderer.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Georgia => "Georgia",
            FontFamily::Verdana => "Verdana",
            FontFamily::CourierNew => "Courier New",
            FontFamily::Impact => "Impact",
            FontFamily::ComicSansMs => "Comic Sans MS",
        }
    }

    /// Generic CSS fallback family.
    pub fn generic(&self) -> &'static str {
        match self {
            FontFamily::TimesNewRoman | FontFamily::Georgia => "serif",
            FontFamily::CourierNew => "monospace",
            FontFamily::ComicSansMs => "cursive",
            _ => "sans-serif",
        }
    }

    /// Get all available font families.
    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::Arial,
            FontFamily::Helvetica,
            FontFamily::TimesNewRoman,
            FontFamily::Georgia,
            FontFamily::Verdana,
            FontFamily::CourierNew,
            FontFamily::Impact,
            FontFamily::ComicSansMs,
        ]
    }

    /// Average glyph advance as a fraction of the font size.
    fn char_width_factor(&self) -> f64 {
        match self {
            FontFamily::CourierNew => 0.60,
            FontFamily::Verdana => 0.58,
            FontFamily::Impact => 0.50,
            FontFamily::TimesNewRoman | FontFamily::Georgia => 0.50,
            _ => 0.55,
        }
    }
}

/// A font size outside the allowed set.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("font size {0}px is not one of the allowed sizes")]
pub struct FontSizeError(pub u32);

/// Font size in pixels, limited to [`FontSize::ALLOWED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FontSize(u32);

impl FontSize {
    pub const ALLOWED: [u32; 9] = [12, 16, 20, 24, 32, 40, 48, 64, 72];
    pub const DEFAULT: FontSize = FontSize(24);

    pub fn new(px: u32) -> Result<Self, FontSizeError> {
        if Self::ALLOWED.contains(&px) {
            Ok(Self(px))
        } else {
            Err(FontSizeError(px))
        }
    }

    pub fn px(&self) -> u32 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = FontSize> {
        Self::ALLOWED.into_iter().map(FontSize)
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for FontSize {
    type Error = FontSizeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Style used when creating a text object.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: FontFamily,
    pub font_size: FontSize,
    pub fill: SerializableColor,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: FontFamily::default(),
            font_size: FontSize::default(),
            fill: SerializableColor::black(),
            align: TextAlign::default(),
        }
    }
}

/// A text object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    pub content: String,
    pub font_family: FontFamily,
    pub font_size: FontSize,
    pub fill: SerializableColor,
    #[serde(default)]
    pub align: TextAlign,
}

impl TextObject {
    /// Line height relative to the font size.
    pub const LINE_HEIGHT: f64 = 1.2;

    pub fn new(position: Point, content: String, style: TextStyle) -> Self {
        Self {
            base: ObjectBase::new(position),
            content,
            font_family: style.font_family,
            font_size: style.font_size,
            fill: style.fill,
            align: style.align,
        }
    }

    /// Lines of the content; an empty string or trailing newline still yields a line.
    pub fn lines(&self) -> Vec<&str> {
        let mut lines: Vec<&str> = self.content.lines().collect();
        if lines.is_empty() || self.content.ends_with('\n') {
            lines.push("");
        }
        lines
    }

    /// Approximate width based on character count and font size.
    fn approximate_width(&self) -> f64 {
        let max_chars = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        max_chars as f64 * f64::from(self.font_size.px()) * self.font_family.char_width_factor()
    }

    fn approximate_height(&self) -> f64 {
        self.lines().len() as f64 * f64::from(self.font_size.px()) * Self::LINE_HEIGHT
    }
}

impl ObjectTrait for TextObject {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn intrinsic_size(&self) -> (f64, f64) {
        // Keep empty text grabbable
        (self.approximate_width().max(20.0), self.approximate_height())
    }
}
