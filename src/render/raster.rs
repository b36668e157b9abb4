use std::path::Path;

use image::RgbaImage;
use resvg::{tiny_skia, usvg};

use super::{RenderError, RenderResult};

/// Turns SVG documents into bitmaps
pub struct Rasterizer {
    options: usvg::Options<'static>,
}

impl Rasterizer {
    pub fn new(font_dir: Option<&Path>) -> Self {
        let mut options = usvg::Options::default();
        let fontdb = options.fontdb_mut();
        fontdb.load_system_fonts();
        if let Some(dir) = font_dir {
            fontdb.load_fonts_dir(dir);
        }
        log::debug!("{} font faces available", options.fontdb.len());

        Self { options }
    }

    /// Rasterizes on an opaque white background
    pub fn rasterize(&self, svg: &str) -> RenderResult<RgbaImage> {
        let tree = usvg::Tree::from_str(svg, &self.options)?;
        let size = tree.size().to_int_size();

        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            RenderError::Raster(format!("Bad size {}x{}", size.width(), size.height()))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // fully opaque, so premultiplied and straight alpha agree
        RgbaImage::from_raw(size.width(), size.height(), pixmap.take())
            .ok_or_else(|| RenderError::Raster("Pixel buffer size mismatch".to_string()))
    }
}

/// Pastes `overlay` onto `base` with its top-left corner at `offset`
pub fn compose(base: &mut RgbaImage, overlay: &RgbaImage, offset: (i64, i64)) {
    image::imageops::overlay(base, overlay, offset.0, offset.1);
}

pub fn save_png(image: &RgbaImage, path: &Path) -> RenderResult<()> {
    log::debug!("Writing {}", path.display());
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use image::Rgba;

    use super::*;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_rasterize_shapes() {
        let rasterizer = Rasterizer::new(None);
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
            <rect x="0" y="0" width="10" height="10" fill="black"/>
        </svg>"#;

        let image = rasterizer.rasterize(svg).unwrap();
        assert_eq!(image.dimensions(), (20, 10));
        assert_eq!(*image.get_pixel(5, 5), BLACK);
        assert_eq!(*image.get_pixel(15, 5), WHITE);
    }

    #[test]
    fn test_invalid_svg() {
        let rasterizer = Rasterizer::new(None);
        assert!(matches!(
            rasterizer.rasterize("not svg"),
            Err(RenderError::Svg(_))
        ));
    }

    #[test]
    fn test_compose_at_offset() {
        let mut base = RgbaImage::from_pixel(10, 10, WHITE);
        let overlay = RgbaImage::from_pixel(3, 3, BLACK);

        compose(&mut base, &overlay, (5, 0));

        assert_eq!(*base.get_pixel(5, 0), BLACK);
        assert_eq!(*base.get_pixel(7, 2), BLACK);
        assert_eq!(*base.get_pixel(4, 0), WHITE);
        assert_eq!(*base.get_pixel(5, 3), WHITE);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        save_png(&RgbaImage::from_pixel(4, 4, WHITE), &path).unwrap();

        let read = image::open(&path).unwrap().to_rgba8();
        assert_eq!(read.dimensions(), (4, 4));
    }
}
