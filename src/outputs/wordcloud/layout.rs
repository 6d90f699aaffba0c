//! Word placement.
//!
//! Words are placed largest first. For each word a summed-area table over
//! the occupied pixels gives every position where its box fits; one of them
//! is picked uniformly at random. When none is free the word is tried in the
//! other orientation, then at a smaller size, and layout stops once the size
//! drops below the style's minimum.

use super::colors::Colormap;
use crate::config::WordcloudStyle;
use crate::models::KeywordFrequencies;
use image::{Rgb, RgbaImage};
use rand::Rng;

/// Measures the box a word occupies at a given font size.
pub trait TextMeasure {
    fn measure(&self, word: &str, font_size: u32) -> (u32, u32);
}

/// Glyph-independent estimate used for SVG output, where the viewer picks
/// the font and `textLength` stretches the word to the measured width.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn measure(&self, word: &str, font_size: u32) -> (u32, u32) {
        let chars = word.chars().count().max(1) as f32;
        let width = (0.6 * font_size as f32 * chars).ceil() as u32;
        (width.max(1), font_size.max(1))
    }
}

/// A mask image. White or fully transparent pixels are off limits.
#[derive(Debug, Clone)]
pub struct Mask {
    image: RgbaImage,
}

impl Mask {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_blocked(&self, x: u32, y: u32) -> bool {
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        a == 0 || (r >= 250 && g >= 250 && b >= 250)
    }

    /// Mean color of the usable pixels inside a box, or black if the box has
    /// none.
    pub fn mean_color(&self, x: u32, y: u32, w: u32, h: u32) -> Rgb<u8> {
        let (mut sum, mut n) = ([0u64; 3], 0u64);
        for py in y..(y + h).min(self.height()) {
            for px in x..(x + w).min(self.width()) {
                if self.is_blocked(px, py) {
                    continue;
                }
                let p = self.image.get_pixel(px, py).0;
                for c in 0..3 {
                    sum[c] += p[c] as u64;
                }
                n += 1;
            }
        }
        if n == 0 {
            return Rgb([0, 0, 0]);
        }
        Rgb([(sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8])
    }
}

/// One word as laid out on the canvas.
///
/// `x`, `y`, `width`, `height` describe the text box after rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub font_size: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub vertical: bool,
    pub color: Rgb<u8>,
}

/// Occupied pixels plus their summed-area table.
#[derive(Debug)]
struct Occupancy {
    width: u32,
    height: u32,
    cells: Vec<bool>,
    integral: Vec<u32>,
}

impl Occupancy {
    fn new(width: u32, height: u32, mask: Option<&Mask>) -> Self {
        let mut cells = vec![false; width as usize * height as usize];
        if let Some(mask) = mask {
            for y in 0..height {
                for x in 0..width {
                    cells[y as usize * width as usize + x as usize] = mask.is_blocked(x, y);
                }
            }
        }
        let mut occ = Self {
            width,
            height,
            cells,
            integral: Vec::new(),
        };
        occ.rebuild();
        occ
    }

    fn rebuild(&mut self) {
        let stride = (self.width + 1) as usize;
        let mut integral = vec![0u32; stride * (self.height + 1) as usize];
        for y in 0..self.height as usize {
            let mut row = 0u32;
            for x in 0..self.width as usize {
                row += self.cells[y * self.width as usize + x] as u32;
                integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row;
            }
        }
        self.integral = integral;
    }

    fn is_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        let stride = (self.width + 1) as usize;
        let at = |x: u32, y: u32| self.integral[y as usize * stride + x as usize];
        at(x + w, y + h) + at(x, y) == at(x + w, y) + at(x, y + h)
    }

    /// A uniformly random free position for a `w`×`h` box.
    fn sample<R: Rng>(&self, w: u32, h: u32, rng: &mut R) -> Option<(u32, u32)> {
        if w > self.width || h > self.height {
            return None;
        }
        let positions = move || {
            (0..=self.height - h)
                .flat_map(move |y| (0..=self.width - w).map(move |x| (x, y)))
                .filter(move |&(x, y)| self.is_free(x, y, w, h))
        };
        let count = positions().count();
        if count == 0 {
            return None;
        }
        positions().nth(rng.random_range(0..count))
    }

    fn occupy(&mut self, x: u32, y: u32, w: u32, h: u32) {
        for py in y..y + h {
            for px in x..x + w {
                self.cells[py as usize * self.width as usize + px as usize] = true;
            }
        }
        self.rebuild();
    }
}

/// Lay out `frequencies` on a `width`×`height` canvas.
///
/// Returns the placed words, most frequent first. Words that no longer fit
/// at the minimum font size are dropped.
#[allow(clippy::too_many_arguments)]
pub fn layout<M: TextMeasure, R: Rng>(
    frequencies: &KeywordFrequencies,
    style: &WordcloudStyle,
    width: u32,
    height: u32,
    mask: Option<&Mask>,
    colormap: Colormap,
    measure: &M,
    rng: &mut R,
) -> Vec<PlacedWord> {
    let ranked = frequencies.ranked();
    let Some(&(_, top)) = ranked.first() else {
        return Vec::new();
    };

    let mut grid = Occupancy::new(width, height, mask);
    let mut placed = Vec::new();
    let margin = style.margin;
    let rs = style.relative_scaling;
    let mut font_size = style
        .max_font_size
        .unwrap_or(height)
        .max(style.min_font_size);
    let mut last_freq = 1.0f32;

    'words: for (i, &(word, count)) in ranked.iter().take(style.max_words).enumerate() {
        let freq = count as f32 / top as f32;
        if i > 0 && rs != 0.0 {
            font_size = ((rs * (freq / last_freq) + (1.0 - rs)) * font_size as f32).round() as u32;
        }

        let mut vertical = rng.random::<f32>() >= style.prefer_horizontal;
        let mut flipped = false;
        let (x, y, w, h) = loop {
            if font_size < style.min_font_size {
                break 'words;
            }
            let (tw, th) = measure.measure(word, font_size);
            let (w, h) = if vertical { (th, tw) } else { (tw, th) };
            if let Some((x, y)) = grid.sample(w + 2 * margin, h + 2 * margin, rng) {
                break (x, y, w, h);
            }
            if !flipped && style.prefer_horizontal < 1.0 {
                vertical = !vertical;
                flipped = true;
            } else {
                font_size -= (font_size / 10).max(1);
                flipped = false;
            }
        };

        grid.occupy(x, y, w + 2 * margin, h + 2 * margin);
        let (tx, ty) = (x + margin, y + margin);
        let color = match mask {
            Some(mask) if style.recolor_from_mask => mask.mean_color(tx, ty, w, h),
            _ => colormap.sample(rng.random::<f32>()),
        };

        placed.push(PlacedWord {
            word: word.to_string(),
            font_size,
            x: tx,
            y: ty,
            width: w,
            height: h,
            vertical,
            color,
        });
        last_freq = freq;
    }

    placed
}
