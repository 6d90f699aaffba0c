//! Colormaps and color parsing for wordclouds.

use image::{Rgb, Rgba};

/// A sequential colormap defined by evenly spaced anchor colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colormap {
    name: &'static str,
    anchors: &'static [[u8; 3]],
}

const VIRIDIS: &[[u8; 3]] = &[
    [0x44, 0x01, 0x54], [0x48, 0x28, 0x78], [0x3e, 0x49, 0x89], [0x31, 0x68, 0x8e],
    [0x26, 0x82, 0x8e], [0x1f, 0x9e, 0x89], [0x35, 0xb7, 0x79], [0x6e, 0xce, 0x58],
    [0xb5, 0xde, 0x2b], [0xfd, 0xe7, 0x25],
];
const PLASMA: &[[u8; 3]] = &[
    [0x0d, 0x08, 0x87], [0x53, 0x02, 0xa3], [0x8b, 0x0a, 0xa5], [0xb8, 0x32, 0x89],
    [0xdb, 0x5c, 0x68], [0xf4, 0x88, 0x49], [0xfe, 0xbd, 0x2a], [0xf0, 0xf9, 0x21],
];
const MAGMA: &[[u8; 3]] = &[
    [0x00, 0x00, 0x04], [0x1c, 0x10, 0x44], [0x4f, 0x12, 0x7b], [0x81, 0x25, 0x81],
    [0xb5, 0x36, 0x7a], [0xe5, 0x59, 0x64], [0xfb, 0x87, 0x61], [0xfe, 0xc2, 0x87],
    [0xfc, 0xfd, 0xbf],
];
const INFERNO: &[[u8; 3]] = &[
    [0x00, 0x00, 0x04], [0x1f, 0x0c, 0x48], [0x55, 0x0f, 0x6d], [0x88, 0x22, 0x6a],
    [0xba, 0x36, 0x55], [0xe3, 0x59, 0x33], [0xf9, 0x8e, 0x09], [0xf9, 0xcb, 0x35],
    [0xfc, 0xff, 0xa4],
];
const CIVIDIS: &[[u8; 3]] = &[
    [0x00, 0x22, 0x4e], [0x12, 0x35, 0x70], [0x3b, 0x49, 0x6c], [0x57, 0x5d, 0x6d],
    [0x70, 0x71, 0x73], [0x8a, 0x87, 0x79], [0xa6, 0x9d, 0x75], [0xc4, 0xb5, 0x6c],
    [0xe4, 0xcf, 0x5b], [0xfe, 0xe8, 0x38],
];
const RAINBOW: &[[u8; 3]] = &[
    [0x80, 0x00, 0xff], [0x19, 0x96, 0xf3], [0x4d, 0xf3, 0xce], [0xb2, 0xf3, 0x96],
    [0xff, 0x96, 0x4f], [0xff, 0x00, 0x00],
];
const GREYS: &[[u8; 3]] = &[[0xff, 0xff, 0xff], [0x00, 0x00, 0x00]];

const COLORMAPS: &[Colormap] = &[
    Colormap { name: "viridis", anchors: VIRIDIS },
    Colormap { name: "plasma", anchors: PLASMA },
    Colormap { name: "magma", anchors: MAGMA },
    Colormap { name: "inferno", anchors: INFERNO },
    Colormap { name: "cividis", anchors: CIVIDIS },
    Colormap { name: "rainbow", anchors: RAINBOW },
    Colormap { name: "greys", anchors: GREYS },
];

impl Colormap {
    pub const DEFAULT: &'static str = "viridis";

    /// Look a colormap up by case-insensitive name.
    pub fn by_name(name: &str) -> Option<Colormap> {
        let name = name.trim().to_lowercase();
        COLORMAPS.iter().copied().find(|c| c.name == name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Color at position `t`, clamped to `0..=1`.
    pub fn sample(&self, t: f32) -> Rgb<u8> {
        let t = t.clamp(0.0, 1.0);
        let last = self.anchors.len() - 1;
        if last == 0 {
            return Rgb(self.anchors[0]);
        }
        let pos = t * last as f32;
        let i = (pos.floor() as usize).min(last - 1);
        let frac = pos - i as f32;
        let (a, b) = (self.anchors[i], self.anchors[i + 1]);
        let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * frac).round() as u8;
        Rgb([lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2])])
    }
}

/// Parse a background color: a common color name, `#rgb`, `#rrggbb`, or
/// `transparent` (alpha 0).
pub fn parse_background(s: &str) -> Option<Rgba<u8>> {
    let s = s.trim().to_lowercase();
    let named = match s.as_str() {
        "transparent" | "none" => return Some(Rgba([0, 0, 0, 0])),
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "gray" | "grey" => [128, 128, 128],
        "lightgray" | "lightgrey" => [211, 211, 211],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "navy" => [0, 0, 128],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "ivory" => [255, 255, 240],
        _ => return parse_hex(&s).map(|[r, g, b]| Rgba([r, g, b, 255])),
    };
    Some(Rgba([named[0], named[1], named[2], 255]))
}

fn parse_hex(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(out)
        }
        6 => Some([
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colormap_lookup() {
        assert_eq!(Colormap::by_name("Rainbow").unwrap().name(), "rainbow");
        assert_eq!(Colormap::by_name(Colormap::DEFAULT).unwrap().name(), "viridis");
        assert!(Colormap::by_name("jet").is_none());
    }

    #[test]
    fn test_colormap_endpoints_and_midpoint() {
        let greys = Colormap::by_name("greys").unwrap();
        assert_eq!(greys.sample(0.0), Rgb([255, 255, 255]));
        assert_eq!(greys.sample(1.0), Rgb([0, 0, 0]));
        assert_eq!(greys.sample(0.5), Rgb([128, 128, 128]));
        assert_eq!(greys.sample(7.0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_parse_background() {
        assert_eq!(parse_background("white"), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_background("#102030"), Some(Rgba([16, 32, 48, 255])));
        assert_eq!(parse_background("#fff"), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_background("transparent"), Some(Rgba([0, 0, 0, 0])));
        assert_eq!(parse_background("#12345"), None);
        assert_eq!(parse_background("chartreuse-ish"), None);
    }
}
