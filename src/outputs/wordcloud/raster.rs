//! PNG rendering with a TrueType font.

use super::layout::{PlacedWord, TextMeasure};
use crate::error::OutputError;
use ab_glyph::{FontVec, PxScale};
use image::imageops::{self, rotate270};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// A loaded font, used both to measure and to draw words.
pub struct GlyphFont {
    font: FontVec,
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFont").finish_non_exhaustive()
    }
}

impl GlyphFont {
    pub async fn load(path: &Path) -> Result<Self, OutputError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| OutputError::Io {
                operation: "failed to read font",
                path: path.to_path_buf(),
                source,
            })?;
        let font = FontVec::try_from_vec(bytes).map_err(|_| OutputError::Font(path.to_path_buf()))?;
        Ok(Self { font })
    }
}

impl TextMeasure for GlyphFont {
    fn measure(&self, word: &str, font_size: u32) -> (u32, u32) {
        let (w, h) = text_size(PxScale::from(font_size as f32), &self.font, word);
        (w.max(1), h.max(1))
    }
}

/// Draw placed words onto a canvas and encode it as PNG.
pub fn to_png(
    words: &[PlacedWord],
    width: u32,
    height: u32,
    background: Rgba<u8>,
    font: &GlyphFont,
    path: &Path,
) -> Result<Vec<u8>, OutputError> {
    let mut canvas = RgbaImage::from_pixel(width, height, background);

    for word in words {
        let [r, g, b] = word.color.0;
        let color = Rgba([r, g, b, 255]);
        let scale = PxScale::from(word.font_size as f32);

        // Draw horizontally on a tile the size of the unrotated text, then
        // rotate the tile for vertical words.
        let (tw, th) = if word.vertical {
            (word.height, word.width)
        } else {
            (word.width, word.height)
        };
        let mut tile = RgbaImage::from_pixel(tw, th, background);
        draw_text_mut(&mut tile, color, 0, 0, scale, &font.font, &word.word);
        let tile = if word.vertical { rotate270(&tile) } else { tile };

        imageops::replace(&mut canvas, &tile, word.x as i64, word.y as i64);
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|source| OutputError::Image {
            path: PathBuf::from(path),
            source,
        })?;
    Ok(bytes)
}
