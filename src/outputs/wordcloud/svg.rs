//! SVG encoding of a laid-out wordcloud.

use super::layout::PlacedWord;
use image::Rgba;
use quick_xml::escape::escape;
use std::fmt::Write;

const FONT_FAMILY: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";
/// Baseline offset from the top of a word's box, as a fraction of its size.
const ASCENT: f32 = 0.8;

/// Render placed words as a standalone SVG document.
pub fn to_svg(words: &[PlacedWord], width: u32, height: u32, background: Rgba<u8>) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let [r, g, b, a] = background.0;
    if a > 0 {
        let _ = writeln!(
            svg,
            r#"  <rect width="100%" height="100%" fill="rgb({r},{g},{b})" fill-opacity="{:.3}"/>"#,
            a as f32 / 255.0
        );
    }
    let _ = writeln!(svg, r#"  <g font-family="{FONT_FAMILY}">"#);

    for word in words {
        let [r, g, b] = word.color.0;
        let ascent = (word.font_size as f32 * ASCENT).round() as u32;
        let text = escape(word.word.as_str());
        if word.vertical {
            let _ = writeln!(
                svg,
                r#"    <text transform="translate({},{}) rotate(-90)" font-size="{}" fill="rgb({r},{g},{b})" textLength="{}" lengthAdjust="spacingAndGlyphs">{text}</text>"#,
                word.x + ascent,
                word.y + word.height,
                word.font_size,
                word.height,
            );
        } else {
            let _ = writeln!(
                svg,
                r#"    <text x="{}" y="{}" font-size="{}" fill="rgb({r},{g},{b})" textLength="{}" lengthAdjust="spacingAndGlyphs">{text}</text>"#,
                word.x,
                word.y + ascent,
                word.font_size,
                word.width,
            );
        }
    }

    svg.push_str("  </g>\n</svg>\n");
    svg
}
