//! PrintCanvas Render Library
//!
//! SVG projection of a scene and a resvg/tiny-skia [`Rasterizer`]
//! implementation for PNG export.
//!
//! [`Rasterizer`]: printcanvas_core::Rasterizer

mod rasterizer;
pub mod svg;

pub use rasterizer::SvgRasterizer;
pub use svg::render_svg;
