#![forbid(unsafe_code)]

pub mod color;
pub mod compose;
pub mod design;
pub mod display;
pub mod foundation;
pub mod model;
pub mod settings;
pub mod text;
pub mod tokens;
pub mod tree;

pub use color::{ColorSpec, DisplayColor, to_display_color};
pub use compose::{
    Composer, NodeStyle, ROOT_ID, RenderedNode, RenderedTree, ResolvedBorder, ResolvedShadow,
    SpacingTokens, render,
};
pub use design::{DesignExport, DesignNode, load_design};
pub use display::DrawOp;
pub use foundation::core::{Canvas, MAX_DEPTH, Point, Rect, Size, Vec2};
pub use foundation::error::{FigError, FigResult};
pub use model::{Border, Child, FrameNode, Placement, RectNode, Shadow, TextNode, VisualNode};
pub use settings::RenderSettings;
pub use text::{FixedAdvanceMeasurer, ParleyMeasurer, TextMeasurer, TextRun};
pub use tokens::{nearest_color_token, spacing_token};
pub use tree::{NodeRecord, assemble};
