//! Wordcloud rendering.
//!
//! Each configured [`WordcloudStyle`] produces one image from the run's
//! keyword frequencies:
//!
//! - [`layout`]: placement of words on the canvas or inside a mask
//! - [`colors`]: colormaps and background parsing
//! - [`svg`]: SVG encoding (default, needs no font)
//! - [`raster`]: PNG encoding with a configured font

pub mod colors;
pub mod layout;
pub mod raster;
pub mod svg;

use crate::config::{ImageFormat, WordcloudStyle};
use crate::error::OutputError;
use crate::models::KeywordFrequencies;
use crate::stopwords;
use colors::Colormap;
use image::imageops::FilterType;
use layout::{ApproxMeasure, Mask};
use rand::SeedableRng;
use rand::rngs::StdRng;
use raster::GlyphFont;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Masks larger than this on either side are scaled down before layout,
/// and canvases without a mask may not exceed it.
pub const MAX_MASK_SIDE: u32 = 1600;

/// File name of a rendered wordcloud, e.g. `tree_wordcloud_05_06_25.svg`.
pub fn wordcloud_filename(style: &WordcloudStyle, date_stamp: &str) -> String {
    format!("{}_{}.{}", style.name, date_stamp, style.format.extension())
}

/// Render one wordcloud style into `output_dir`.
///
/// Returns `Ok(None)` without writing anything when no words are left after
/// stopword filtering.
#[instrument(level = "info", skip_all, fields(style = %style.name))]
pub async fn render_wordcloud(
    frequencies: &KeywordFrequencies,
    style: &WordcloudStyle,
    output_dir: &Path,
    date_stamp: &str,
) -> Result<Option<PathBuf>, OutputError> {
    let extra: HashSet<String> = style.stopwords.iter().map(|s| s.to_lowercase()).collect();
    let frequencies = frequencies
        .without(|w| (style.default_stopwords && stopwords::is_stopword(w)) || extra.contains(w));
    if frequencies.is_empty() {
        warn!("No keywords to draw, skipping wordcloud");
        return Ok(None);
    }

    let path = output_dir.join(wordcloud_filename(style, date_stamp));
    let mask = match &style.mask {
        Some(mask_path) => Some(load_mask(mask_path)?),
        None => None,
    };
    let (width, height) = mask
        .as_ref()
        .map(|m| (m.width(), m.height()))
        .unwrap_or((style.width, style.height));

    let colormap = style
        .colormap
        .as_deref()
        .and_then(Colormap::by_name)
        .or_else(|| Colormap::by_name(Colormap::DEFAULT))
        .ok_or_else(|| OutputError::Style(format!("unknown colormap for '{}'", style.name)))?;
    let background = colors::parse_background(&style.background)
        .ok_or_else(|| OutputError::Style(format!("unknown background '{}'", style.background)))?;
    debug!(colormap = colormap.name(), seed = ?style.random_state, "Wordcloud style");
    let mut rng = match style.random_state {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let bytes = match style.format {
        ImageFormat::Svg => {
            let words = layout::layout(
                &frequencies,
                style,
                width,
                height,
                mask.as_ref(),
                colormap,
                &ApproxMeasure,
                &mut rng,
            );
            info!(placed = words.len(), width, height, "Laid out wordcloud");
            svg::to_svg(&words, width, height, background).into_bytes()
        }
        ImageFormat::Png => {
            let font_path = style
                .font
                .as_deref()
                .ok_or_else(|| OutputError::Style(format!("'{}' has no font", style.name)))?;
            let font = GlyphFont::load(font_path).await?;
            let words = layout::layout(
                &frequencies,
                style,
                width,
                height,
                mask.as_ref(),
                colormap,
                &font,
                &mut rng,
            );
            info!(placed = words.len(), width, height, "Laid out wordcloud");
            raster::to_png(&words, width, height, background, &font, &path)?
        }
    };

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| OutputError::Io {
            operation: "failed to write wordcloud",
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "Wrote wordcloud");
    Ok(Some(path))
}

fn load_mask(path: &Path) -> Result<Mask, OutputError> {
    let image = image::open(path).map_err(|source| OutputError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let image = if image.width() > MAX_MASK_SIDE || image.height() > MAX_MASK_SIDE {
        info!(
            width = image.width(),
            height = image.height(),
            "Scaling down large mask"
        );
        image.resize(MAX_MASK_SIDE, MAX_MASK_SIDE, FilterType::Triangle)
    } else {
        image
    };
    Ok(Mask::new(image.to_rgba8()))
}
