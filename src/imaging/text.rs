//! Text rasterization onto 8-bit canvases.

use crate::imaging::normalize::PixelLayout;
use crate::utils::error::{Result, TestkitError};
use ab_glyph::{FontVec, PxScale};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use ndarray::ArrayD;
use std::path::Path;

/// 沒有指定字型時依序嘗試的系統字型
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// 內建點陣字每個字元的邊長
const BITMAP_GLYPH_SIZE: u32 = 8;

/// 字高與影像高度成正比，但不小於 `min_size`
pub fn font_size_for_height(height: u32, min_size: u32, divisor: u32) -> u32 {
    (height / divisor.max(1)).max(min_size)
}

enum GlyphSource {
    Outline(FontVec),
    Bitmap,
}

pub struct TextRenderer {
    glyphs: GlyphSource,
}

impl TextRenderer {
    /// 只用內建 8x8 點陣字，輸出可預期
    pub fn bitmap() -> Self {
        Self {
            glyphs: GlyphSource::Bitmap,
        }
    }

    pub fn from_font_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        // .ttc 字型集合取第一個字型
        let font = FontVec::try_from_vec_and_index(data, 0).map_err(|e| {
            TestkitError::ConfigError {
                message: format!("Cannot parse font {}: {}", path.display(), e),
            }
        })?;
        Ok(Self {
            glyphs: GlyphSource::Outline(font),
        })
    }

    /// 先試指定字型，再試系統字型，都失敗就退回點陣字
    pub fn load(preferred: Option<&Path>) -> Self {
        let candidates = preferred
            .into_iter()
            .chain(SYSTEM_FONT_CANDIDATES.iter().map(Path::new));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::from_font_file(path) {
                Ok(renderer) => {
                    tracing::debug!("Using font {}", path.display());
                    return renderer;
                }
                Err(e) => tracing::warn!("Skipping font {}: {}", path.display(), e),
            }
        }

        if let Some(path) = preferred {
            tracing::warn!(
                "Font {} could not be loaded, falling back to the built-in bitmap font",
                path.display()
            );
        } else {
            tracing::warn!("No system font found, falling back to the built-in bitmap font");
        }
        Self::bitmap()
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self.glyphs, GlyphSource::Bitmap)
    }

    /// 文字外框的寬高 (像素)
    pub fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        match &self.glyphs {
            GlyphSource::Outline(font) => text_size(PxScale::from(size as f32), font, text),
            GlyphSource::Bitmap => {
                let scale = bitmap_scale(size);
                let chars = text.chars().count() as u32;
                (
                    chars * BITMAP_GLYPH_SIZE * scale,
                    BITMAP_GLYPH_SIZE * scale,
                )
            }
        }
    }

    /// 以最大亮度把文字畫到 canvas 上
    pub fn draw(&self, canvas: &mut Canvas, text: &str, origin: (i32, i32), size: u32) {
        let (x, y) = origin;
        match (&self.glyphs, canvas) {
            (GlyphSource::Outline(font), Canvas::Gray(img)) => {
                draw_text_mut(img, Luma([255u8]), x, y, PxScale::from(size as f32), font, text)
            }
            (GlyphSource::Outline(font), Canvas::Rgb(img)) => draw_text_mut(
                img,
                Rgb([255u8, 255, 255]),
                x,
                y,
                PxScale::from(size as f32),
                font,
                text,
            ),
            (GlyphSource::Bitmap, Canvas::Gray(img)) => {
                draw_bitmap_text(img, Luma([255u8]), x, y, size, text)
            }
            (GlyphSource::Bitmap, Canvas::Rgb(img)) => {
                draw_bitmap_text(img, Rgb([255u8, 255, 255]), x, y, size, text)
            }
        }
    }
}

fn bitmap_scale(size: u32) -> u32 {
    (size / BITMAP_GLYPH_SIZE).max(1)
}

fn draw_bitmap_text<P: Pixel>(
    img: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    color: P,
    x: i32,
    y: i32,
    size: u32,
    text: &str,
) {
    let scale = bitmap_scale(size) as i32;
    let (width, height) = img.dimensions();
    let mut pen_x = x;

    for ch in text.chars() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8i32 {
                // 最低位元是最左邊的像素
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = pen_x + col * scale + dx;
                        let py = y + row as i32 * scale + dy;
                        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                            img.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }

        pen_x += BITMAP_GLYPH_SIZE as i32 * scale;
    }
}

/// 可繪製的 8-bit 影像
pub enum Canvas {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl Canvas {
    pub fn from_pixels(pixels: &ArrayD<u8>, layout: PixelLayout) -> Result<Self> {
        let (rows, cols) = (layout.rows() as u32, layout.cols() as u32);
        let raw: Vec<u8> = pixels.iter().copied().collect();

        let canvas = match layout {
            PixelLayout::Grayscale { .. } => GrayImage::from_raw(cols, rows, raw).map(Canvas::Gray),
            PixelLayout::Color { .. } => RgbImage::from_raw(cols, rows, raw).map(Canvas::Rgb),
        };

        canvas.ok_or_else(|| TestkitError::ImageBufferError {
            message: format!(
                "buffer of {} samples does not match {}x{}x{}",
                pixels.len(),
                rows,
                cols,
                layout.samples_per_pixel()
            ),
        })
    }

    pub fn width(&self) -> u32 {
        match self {
            Canvas::Gray(img) => img.width(),
            Canvas::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Canvas::Gray(img) => img.height(),
            Canvas::Rgb(img) => img.height(),
        }
    }

    pub fn as_raw(&self) -> &[u8] {
        match self {
            Canvas::Gray(img) => img.as_raw(),
            Canvas::Rgb(img) => img.as_raw(),
        }
    }

    pub fn save_preview(&self, path: &Path) -> Result<()> {
        let saved = match self {
            Canvas::Gray(img) => img.save(path),
            Canvas::Rgb(img) => img.save(path),
        };
        saved.map_err(|source| TestkitError::PreviewError {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_font_size_rule() {
        assert_eq!(font_size_for_height(64, 20, 20), 20);
        assert_eq!(font_size_for_height(512, 20, 20), 25);
        assert_eq!(font_size_for_height(2048, 20, 20), 102);
    }

    #[test]
    fn test_bitmap_text_stays_inside_measured_box() {
        let renderer = TextRenderer::bitmap();
        let pixels = ArrayD::<u8>::zeros(IxDyn(&[64, 128]));
        let layout = PixelLayout::Grayscale { rows: 64, cols: 128 };
        let mut canvas = Canvas::from_pixels(&pixels, layout).unwrap();

        renderer.draw(&mut canvas, "AB", (10, 10), 16);
        let (w, h) = renderer.measure("AB", 16);
        assert_eq!((w, h), (32, 16));

        let Canvas::Gray(img) = canvas else {
            panic!("expected grayscale canvas");
        };
        let mut lit = 0;
        for (x, y, pixel) in img.enumerate_pixels() {
            let inside = x >= 10 && x < 10 + w && y >= 10 && y < 10 + h;
            if pixel[0] == 255 {
                assert!(inside, "pixel ({}, {}) drawn outside the text box", x, y);
                lit += 1;
            } else {
                assert_eq!(pixel[0], 0);
            }
        }
        assert!(lit > 0);
    }

    #[test]
    fn test_bitmap_text_is_clipped_at_edges() {
        let renderer = TextRenderer::bitmap();
        let pixels = ArrayD::<u8>::zeros(IxDyn(&[12, 12, 3]));
        let layout = PixelLayout::Color { rows: 12, cols: 12 };
        let mut canvas = Canvas::from_pixels(&pixels, layout).unwrap();

        renderer.draw(&mut canvas, "WWWW", (10, 10), 20);

        assert_eq!(canvas.width(), 12);
        assert!(canvas.as_raw().iter().any(|&v| v == 255));
    }

    #[test]
    fn test_canvas_rejects_mismatched_buffer() {
        let pixels = ArrayD::<u8>::zeros(IxDyn(&[4, 4]));
        let layout = PixelLayout::Color { rows: 4, cols: 4 };
        assert!(Canvas::from_pixels(&pixels, layout).is_err());
    }

    #[test]
    fn test_missing_preferred_font_falls_back_to_bitmap_or_system() {
        let renderer = TextRenderer::load(Some(Path::new("/definitely/not/a/font.ttf")));
        let (w, h) = renderer.measure("X", 20);
        assert!(w > 0 && h > 0);
    }
}
