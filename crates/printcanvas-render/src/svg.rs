//! SVG projection of a scene.
//!
//! The SVG is drawn in canvas units (`viewBox` = canvas size) so the same
//! markup serves vector export and, scaled, raster export.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Point;
use printcanvas_core::objects::{
    ImageFormat, ImageObject, ObjectBase, ObjectTrait, ShapeKind, ShapeObject, TextAlign,
    TextObject,
};
use printcanvas_core::{DesignObject, ImageResolver, RasterOptions, Scene, SerializableColor};
use std::fmt::Write;

/// Fill used where an image could not be resolved.
const PLACEHOLDER_FILL: &str = "#d1d5db";
/// Opacity of the brand overlay label.
const OVERLAY_OPACITY: f64 = 0.6;

/// Render the visible scene to an SVG document in canvas units.
pub fn render_svg(scene: &Scene, options: &RasterOptions, images: &dyn ImageResolver) -> String {
    let (w, h) = (scene.width, scene.height);
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
    );

    let _ = write!(
        svg,
        "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\"{}/>",
        fill_attrs("fill", scene.background)
    );

    for object in scene.objects().filter(|o| o.is_visible()) {
        render_object(&mut svg, object, images);
    }

    if let Some(label) = options.visible_overlay() {
        render_overlay(&mut svg, label, w, h);
    }

    svg.push_str("</svg>");
    svg
}

fn render_object(svg: &mut String, object: &DesignObject, images: &dyn ImageResolver) {
    let base = object.base();
    let _ = write!(
        svg,
        "<g transform=\"{}\" opacity=\"{}\">",
        matrix(base),
        base.opacity.clamp(0.0, 1.0)
    );
    match object {
        DesignObject::Text(text) => render_text(svg, text),
        DesignObject::Shape(shape) => render_shape(svg, shape),
        DesignObject::Image(image) => render_image(svg, image, images),
    }
    svg.push_str("</g>");
}

fn matrix(base: &ObjectBase) -> String {
    let [a, b, c, d, e, f] = base.transform().as_coeffs();
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

fn render_text(svg: &mut String, text: &TextObject) {
    let (width, height) = text.intrinsic_size();
    let size = f64::from(text.font_size.px());
    let line_height = size * TextObject::LINE_HEIGHT;
    let (anchor, x) = match text.align {
        TextAlign::Left => ("start", -width / 2.0),
        TextAlign::Center => ("middle", 0.0),
        TextAlign::Right => ("end", width / 2.0),
    };

    let _ = write!(
        svg,
        "<text font-family=\"{}, {}\" font-size=\"{size}\" text-anchor=\"{anchor}\"{}>",
        escape_xml(text.font_family.name()),
        text.font_family.generic(),
        fill_attrs("fill", text.fill)
    );
    for (i, line) in text.lines().into_iter().enumerate() {
        // Baseline sits roughly one font size below the top of each line box
        let y = -height / 2.0 + line_height * i as f64 + size;
        let _ = write!(
            svg,
            "<tspan x=\"{x}\" y=\"{y}\" xml:space=\"preserve\">{}</tspan>",
            escape_xml(line)
        );
    }
    svg.push_str("</text>");
}

fn render_shape(svg: &mut String, shape: &ShapeObject) {
    let mut paint = fill_attrs("fill", shape.fill);
    if let Some(stroke) = shape.stroke.filter(|s| s.width > 0.0) {
        paint.push_str(&fill_attrs("stroke", stroke.color));
        let _ = write!(paint, " stroke-width=\"{}\"", stroke.width);
    }

    let (hw, hh) = (shape.width / 2.0, shape.height / 2.0);
    match shape.kind {
        ShapeKind::Rectangle => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{paint}/>",
                -hw, -hh, shape.width, shape.height
            );
        }
        ShapeKind::Circle => {
            let _ = write!(svg, "<ellipse cx=\"0\" cy=\"0\" rx=\"{hw}\" ry=\"{hh}\"{paint}/>");
        }
        ShapeKind::Triangle => {
            let points = shape
                .triangle_points()
                .iter()
                .map(|p| format!("{},{}", p.x, p.y))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(svg, "<polygon points=\"{points}\"{paint}/>");
        }
    }
}

fn render_image(svg: &mut String, image: &ImageObject, images: &dyn ImageResolver) {
    let (w, h) = (f64::from(image.natural_width), f64::from(image.natural_height));
    let (x, y) = (-w / 2.0, -h / 2.0);

    let href = images.resolve(&image.source).and_then(|bytes| {
        let format = ImageFormat::from_magic_bytes(&bytes)?;
        Some(format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(&bytes)))
    });

    match href {
        Some(href) => {
            let _ = write!(
                svg,
                "<image x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" \
                 preserveAspectRatio=\"none\" xlink:href=\"{href}\"/>"
            );
        }
        None => {
            log::warn!(
                "Image {} is not available; drawing a placeholder",
                image.source.cache_key()
            );
            let _ = write!(
                svg,
                "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" fill=\"{PLACEHOLDER_FILL}\"/>"
            );
        }
    }
}

fn render_overlay(svg: &mut String, label: &str, width: f64, height: f64) {
    let size = (width.min(height) * 0.04).max(12.0);
    let margin = size * 0.75;
    let anchor = Point::new(width - margin, height - margin);
    let _ = write!(
        svg,
        "<text x=\"{}\" y=\"{}\" font-family=\"Arial, sans-serif\" font-size=\"{size}\" \
         font-weight=\"bold\" text-anchor=\"end\" fill=\"#ffffff\" stroke=\"#000000\" \
         stroke-width=\"{}\" opacity=\"{OVERLAY_OPACITY}\">{}</text>",
        anchor.x,
        anchor.y,
        size / 24.0,
        escape_xml(label)
    );
}

/// `fill="#rrggbb"` plus an opacity attribute when the color is translucent.
fn fill_attrs(attr: &str, color: SerializableColor) -> String {
    let opaque = SerializableColor::rgb(color.r, color.g, color.b);
    let mut out = format!(" {attr}=\"{}\"", opaque.to_hex());
    if color.a != 255 {
        let _ = write!(out, " {attr}-opacity=\"{}\"", color.alpha_f64());
    }
    out
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
