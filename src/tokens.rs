//! Mapping of raw design values onto a Tailwind-style token vocabulary.

use crate::color::ColorSpec;

pub const DEFAULT_COLOR_THRESHOLD: f64 = 30.0;

const PALETTE: &[(u8, u8, u8, &str)] = &[
    (0xf8, 0xfa, 0xfc, "slate-50"),
    (0xf1, 0xf5, 0xf9, "slate-100"),
    (0xe2, 0xe8, 0xf0, "slate-200"),
    (0xcb, 0xd5, 0xe1, "slate-300"),
    (0x94, 0xa3, 0xb8, "slate-400"),
    (0x64, 0x74, 0x8b, "slate-500"),
    (0x47, 0x55, 0x69, "slate-600"),
    (0x33, 0x41, 0x55, "slate-700"),
    (0x1e, 0x29, 0x3b, "slate-800"),
    (0x0f, 0x17, 0x2a, "slate-900"),
    (0xef, 0xf6, 0xff, "blue-50"),
    (0xdb, 0xea, 0xfe, "blue-100"),
    (0xbf, 0xdb, 0xfe, "blue-200"),
    (0x93, 0xc5, 0xfd, "blue-300"),
    (0x60, 0xa5, 0xfa, "blue-400"),
    (0x3b, 0x82, 0xf6, "blue-500"),
    (0x25, 0x63, 0xeb, "blue-600"),
    (0x1d, 0x4e, 0xd8, "blue-700"),
    (0x1e, 0x40, 0xaf, "blue-800"),
    (0x1e, 0x3a, 0x8a, "blue-900"),
    (0xfe, 0xf2, 0xf2, "red-50"),
    (0xfe, 0xe2, 0xe2, "red-100"),
    (0xfe, 0xca, 0xca, "red-200"),
    (0xfc, 0xa5, 0xa5, "red-300"),
    (0xf8, 0x71, 0x71, "red-400"),
    (0xef, 0x44, 0x44, "red-500"),
    (0xdc, 0x26, 0x26, "red-600"),
    (0xb9, 0x1c, 0x1c, "red-700"),
    (0x99, 0x1b, 0x1b, "red-800"),
    (0x7f, 0x1d, 0x1d, "red-900"),
    (0xf0, 0xfd, 0xf4, "green-50"),
    (0xdc, 0xfc, 0xe7, "green-100"),
    (0xbb, 0xf7, 0xd0, "green-200"),
    (0x86, 0xef, 0xac, "green-300"),
    (0x4a, 0xde, 0x80, "green-400"),
    (0x22, 0xc5, 0x5e, "green-500"),
    (0x16, 0xa3, 0x4a, "green-600"),
    (0x15, 0x80, 0x3d, "green-700"),
    (0x16, 0x65, 0x34, "green-800"),
    (0x14, 0x53, 0x2d, "green-900"),
    (0xff, 0xff, 0xff, "white"),
    (0x00, 0x00, 0x00, "black"),
];

/// Closest palette token by Euclidean RGB distance, if within `threshold`.
/// Alpha is ignored.
pub fn nearest_color_token(color: ColorSpec, threshold: f64) -> Option<&'static str> {
    let (r, g, b) = color.channels();
    let mut best: Option<(f64, &'static str)> = None;
    for &(pr, pg, pb, name) in PALETTE {
        let d = distance((r, g, b), (pr, pg, pb));
        if best.is_none_or(|(bd, _)| d < bd) {
            best = Some((d, name));
        }
    }
    best.filter(|&(d, _)| d <= threshold).map(|(_, name)| name)
}

fn distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> f64 {
    let dr = f64::from(a.0) - f64::from(b.0);
    let dg = f64::from(a.1) - f64::from(b.1);
    let db = f64::from(a.2) - f64::from(b.2);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Spacing scale token for a pixel length (1 unit = 4px).
pub fn spacing_token(px: f64) -> Option<String> {
    if px <= 0.0 {
        return Some("0".to_string());
    }
    let px = px.round() as u64;
    if px % 4 == 0 {
        return Some((px / 4).to_string());
    }
    match px {
        2 => Some("0.5".to_string()),
        6 => Some("1.5".to_string()),
        10 => Some("2.5".to_string()),
        _ => None,
    }
}
