pub use kurbo::{Point, Rect, Size, Vec2};

/// Full drawing surface of a render; the root frame's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Deepest node nesting a render or an assembled tree may reach; the root is
/// depth 0.
pub const MAX_DEPTH: usize = 128;

/// Finite and non-negative; the only shape a width or height may take.
pub(crate) fn is_valid_extent(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}
