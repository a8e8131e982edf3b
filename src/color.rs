use serde::{Deserialize, Serialize};

/// Normalized RGBA color as emitted by a design tool (each component in `0..=1`).
///
/// Components are fixed at construction and only read afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorSpec {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl ColorSpec {
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub fn r(self) -> f64 {
        self.r
    }

    pub fn g(self) -> f64 {
        self.g
    }

    pub fn b(self) -> f64 {
        self.b
    }

    pub fn a(self) -> f64 {
        self.a
    }

    /// New color with alpha scaled by a fill/layer opacity.
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self::rgba(self.r, self.g, self.b, self.a * unit(opacity))
    }

    /// Integer channels in `0..=255`: clamp, scale by 255, round half away from zero.
    pub fn channels(self) -> (u8, u8, u8) {
        (to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }

    /// Alpha after clamping to `0..=1`.
    pub fn alpha(self) -> f64 {
        unit(self.a)
    }

    pub fn is_opaque(self) -> bool {
        self.alpha() >= 1.0
    }

    pub fn to_display_color(self) -> String {
        to_display_color(self)
    }
}

/// Convert a [`ColorSpec`] into a display color string.
///
/// Opaque colors become `#RRGGBB` (uppercase hex). Anything with alpha strictly
/// below 1.0 becomes `rgba(r, g, b, a)` with the alpha printed as the shortest
/// decimal that round-trips.
pub fn to_display_color(spec: ColorSpec) -> String {
    let (r, g, b) = spec.channels();
    if spec.is_opaque() {
        format!("#{r:02X}{g:02X}{b:02X}")
    } else {
        format!("rgba({r}, {g}, {b}, {})", spec.alpha())
    }
}

fn unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

fn to_u8(x: f64) -> u8 {
    (unit(x) * 255.0).round() as u8
}

impl<'de> Deserialize<'de> for ColorSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => match v.as_slice() {
                &[r, g, b] => Ok(Self::rgb(r, g, b)),
                &[r, g, b, a] => Ok(Self::rgba(r, g, b, a)),
                _ => Err(serde::de::Error::custom(
                    "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

/// A converted color as carried in the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayColor {
    pub css: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl DisplayColor {
    pub fn plain(spec: ColorSpec) -> Self {
        Self {
            css: to_display_color(spec),
            token: None,
        }
    }
}
