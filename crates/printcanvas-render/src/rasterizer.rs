//! resvg-backed rasterizer.

use crate::svg::render_svg;
use printcanvas_core::export::RasterResult;
use printcanvas_core::{ImageResolver, RasterError, RasterImage, RasterOptions, Rasterizer, Scene};

/// Rasterizes scenes by building their SVG projection and rendering it with
/// resvg onto a tiny-skia pixmap.
pub struct SvgRasterizer {
    options: usvg::Options<'static>,
}

impl SvgRasterizer {
    /// Rasterizer with the system fonts loaded.
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        log::debug!("Loaded {} font faces", options.fontdb.len());
        Self { options }
    }

    /// Rasterizer without any fonts. Text renders as nothing.
    pub fn without_fonts() -> Self {
        Self {
            options: usvg::Options::default(),
        }
    }

    /// Number of font faces available for text.
    pub fn font_count(&self) -> usize {
        self.options.fontdb.len()
    }

    /// Add a font file to the database.
    pub fn load_font_file(&mut self, path: &std::path::Path) -> std::io::Result<()> {
        self.options.fontdb_mut().load_font_file(path)
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for SvgRasterizer {
    fn rasterize(
        &self,
        scene: &Scene,
        options: &RasterOptions,
        images: &dyn ImageResolver,
    ) -> RasterResult<RasterImage> {
        options.validate()?;
        let (width, height) = options.output_size(scene.width, scene.height);

        let svg = render_svg(scene, options, images);
        let tree = usvg::Tree::from_str(&svg, &self.options)
            .map_err(|e| RasterError::Scene(format!("SVG parsing failed: {}", e)))?;

        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(RasterError::Allocation { width, height })?;
        let scale = options.multiplier as f32;
        resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        let rgba = demultiplied_rgba(&pixmap);
        let png = encode_png(&rgba, width, height)?;
        log::info!("Rasterized scene to {}x{} ({} bytes)", width, height, png.len());

        Ok(RasterImage { width, height, png })
    }
}

/// tiny-skia stores premultiplied alpha; PNG wants straight alpha.
fn demultiplied_rgba(pixmap: &tiny_skia::Pixmap) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    rgba
}

/// Encode RGBA pixel data to PNG bytes.
fn encode_png(rgba: &[u8], width: u32, height: u32) -> RasterResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RasterError::Encode(format!("header: {}", e)))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| RasterError::Encode(format!("data: {}", e)))?;
    }
    Ok(png_data)
}
