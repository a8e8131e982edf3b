use std::collections::HashSet;

use serde::Serialize;

use crate::{
    color::{ColorSpec, DisplayColor},
    foundation::{
        core::{Canvas, MAX_DEPTH, Point, Rect, Size, Vec2, is_valid_extent},
        error::{FigError, FigResult},
    },
    model::{Child, FrameNode, Placement, RectNode, TextNode, VisualNode},
    settings::RenderSettings,
    text::{TextMeasurer, TextRun},
    tokens::{nearest_color_token, spacing_token},
};

pub const ROOT_ID: &str = "root";

/// Result of one render pass: every input node mapped to exactly one
/// positioned, styled node.
#[derive(Clone, Debug, Serialize)]
pub struct RenderedTree {
    pub canvas: Canvas,
    pub root: RenderedNode,
}

#[derive(Clone, Debug, Serialize)]
pub struct RenderedNode {
    pub id: String,
    /// Placement offset from the parent's origin, as given in the input.
    pub offset: Vec2,
    /// Absolute top-left on the canvas.
    pub origin: Point,
    pub size: Size,
    pub z_order: i32,
    /// Position in the global depth-first paint sequence (parents before children).
    pub paint_index: usize,
    pub style: NodeStyle,
    /// Absolute region this node is truncated to by clipping ancestors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<Rect>,
    pub clips_children: bool,
    /// Present when the render settings ask for tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<SpacingTokens>,
    /// In paint order.
    pub children: Vec<RenderedNode>,
}

/// Spacing-scale names for a node's offset and size. A field is `None` when
/// the value falls between scale steps.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SpacingTokens {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeStyle {
    Frame {
        background: Option<DisplayColor>,
        #[serde(skip_serializing_if = "Option::is_none")]
        corner_radius: Option<f64>,
    },
    Rectangle {
        background: DisplayColor,
        #[serde(skip_serializing_if = "Option::is_none")]
        border: Option<ResolvedBorder>,
        #[serde(skip_serializing_if = "Option::is_none")]
        shadow: Option<ResolvedShadow>,
        #[serde(skip_serializing_if = "Option::is_none")]
        corner_radius: Option<f64>,
    },
    Text {
        content: String,
        color: DisplayColor,
        font_family: String,
        font_weight: f64,
        font_size: f64,
        line_height: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        letter_spacing: Option<f64>,
    },
}

impl NodeStyle {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Frame { .. } => "frame",
            Self::Rectangle { .. } => "rectangle",
            Self::Text { .. } => "text",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedBorder {
    pub color: DisplayColor,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedShadow {
    pub color: DisplayColor,
    pub offset: Vec2,
    pub blur: f64,
    pub spread: f64,
}

impl RenderedNode {
    /// Full logical bounds, whether or not a clipping ancestor truncates them.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// Bounds after clipping; `None` when nothing of the node is visible.
    pub fn visible_bounds(&self) -> Option<Rect> {
        let bounds = self.bounds();
        match self.clip {
            None => Some(bounds),
            Some(clip) => non_empty(bounds.intersect(clip)),
        }
    }
}

fn non_empty(r: Rect) -> Option<Rect> {
    (r.width() > 0.0 && r.height() > 0.0).then_some(r)
}

/// Walks a [`VisualNode`] tree once and produces a [`RenderedTree`].
///
/// Rendering is all-or-nothing: the first malformed or unsupported node aborts
/// the pass and nothing is returned but the error. Node ids must be unique
/// across the whole tree, including generated path ids.
pub struct Composer<'m> {
    settings: RenderSettings,
    measurer: &'m mut dyn TextMeasurer,
    ids: HashSet<String>,
}

/// Render with default settings.
pub fn render(tree: &VisualNode, measurer: &mut dyn TextMeasurer) -> FigResult<RenderedTree> {
    Composer::new(RenderSettings::default(), measurer).render(tree)
}

struct Parent<'a> {
    id: &'a str,
    origin: Point,
    clip: Option<Rect>,
    depth: usize,
}

impl<'m> Composer<'m> {
    pub fn new(settings: RenderSettings, measurer: &'m mut dyn TextMeasurer) -> Self {
        Self {
            settings,
            measurer,
            ids: HashSet::new(),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    #[tracing::instrument(skip_all)]
    pub fn render(&mut self, tree: &VisualNode) -> FigResult<RenderedTree> {
        let frame = match tree {
            VisualNode::Frame(f) => f,
            VisualNode::Unsupported { kind } => return Err(FigError::unsupported(ROOT_ID, kind)),
            other => {
                return Err(FigError::malformed(format!(
                    "root must be a frame, got {}",
                    other.kind()
                )));
            }
        };

        let size = match self.settings.canvas {
            Some(c) => c.size(),
            None => frame_size(ROOT_ID, frame)?,
        };
        let canvas = Canvas {
            width: size.width,
            height: size.height,
        };

        self.ids.clear();
        self.ids.insert(ROOT_ID.to_string());

        let mut paint_index = 0usize;
        let mut root = self.frame(
            ROOT_ID.to_string(),
            frame,
            Vec2::ZERO,
            Point::ORIGIN,
            size,
            0,
            None,
            0,
            &mut paint_index,
        )?;
        root.spacing = self.spacing(Vec2::ZERO, size);
        tracing::debug!(nodes = paint_index, "rendered tree");

        Ok(RenderedTree { canvas, root })
    }

    #[allow(clippy::too_many_arguments)]
    fn frame(
        &mut self,
        id: String,
        frame: &FrameNode,
        offset: Vec2,
        origin: Point,
        size: Size,
        z_order: i32,
        clip: Option<Rect>,
        depth: usize,
        paint_index: &mut usize,
    ) -> FigResult<RenderedNode> {
        if depth > MAX_DEPTH {
            return Err(FigError::malformed(format!(
                "frame '{id}' is nested deeper than {MAX_DEPTH} levels"
            )));
        }
        if frame.corner_radius.is_some_and(|r| !is_valid_extent(r)) {
            return Err(FigError::malformed(format!(
                "node '{id}' has an invalid corner radius"
            )));
        }
        let my_index = next(paint_index);
        let background = frame.background_color.map(|c| self.color(c));

        let bounds = Rect::from_origin_size(origin, size);
        let children_clip = if frame.clips_children {
            Some(clip.map_or(bounds, |c| c.intersect(bounds)))
        } else {
            clip
        };

        let parent = Parent {
            id: &id,
            origin,
            clip: children_clip,
            depth,
        };
        let children = self.children(&parent, &frame.children, paint_index)?;

        Ok(RenderedNode {
            id,
            offset,
            origin,
            size,
            z_order,
            paint_index: my_index,
            style: NodeStyle::Frame {
                background,
                corner_radius: frame.corner_radius,
            },
            clip,
            clips_children: frame.clips_children,
            spacing: None,
            children,
        })
    }

    fn children(
        &mut self,
        parent: &Parent<'_>,
        children: &[Child],
        paint_index: &mut usize,
    ) -> FigResult<Vec<RenderedNode>> {
        // Ascending z, then declaration order: later siblings paint on top.
        let mut order = Vec::<(i32, usize)>::with_capacity(children.len());
        let mut placements = Vec::with_capacity(children.len());
        for (idx, child) in children.iter().enumerate() {
            let placement = child.placement.ok_or_else(|| {
                FigError::malformed(format!(
                    "node '{}' has no placement inside '{}'",
                    child_id(parent.id, idx, child),
                    parent.id
                ))
            })?;
            let z = match placement.z_order {
                Some(z) => z,
                None => i32::try_from(idx).map_err(|_| {
                    FigError::malformed(format!("frame '{}' has too many children", parent.id))
                })?,
            };
            order.push((z, idx));
            placements.push(placement);
        }
        order.sort();

        let mut out = Vec::with_capacity(children.len());
        for (z, idx) in order {
            let child = &children[idx];
            out.push(self.child(parent, idx, child, placements[idx], z, paint_index)?);
        }
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn child(
        &mut self,
        parent: &Parent<'_>,
        idx: usize,
        child: &Child,
        placement: Placement,
        z_order: i32,
        paint_index: &mut usize,
    ) -> FigResult<RenderedNode> {
        let id = child_id(parent.id, idx, child);
        if !self.ids.insert(id.clone()) {
            return Err(FigError::malformed(format!("duplicate node id '{id}'")));
        }
        if !placement.offset_x.is_finite() || !placement.offset_y.is_finite() {
            return Err(FigError::malformed(format!(
                "node '{id}' has a non-finite placement offset"
            )));
        }
        let offset = Vec2::new(placement.offset_x, placement.offset_y);
        let origin = parent.origin + offset;

        let mut node = match &child.node {
            VisualNode::Frame(f) => {
                let size = frame_size(&id, f)?;
                self.frame(
                    id,
                    f,
                    offset,
                    origin,
                    size,
                    z_order,
                    parent.clip,
                    parent.depth + 1,
                    paint_index,
                )?
            }
            VisualNode::Rectangle(r) => {
                let (size, style) = self.rectangle(&id, r)?;
                leaf(id, offset, origin, size, z_order, style, parent.clip, paint_index)
            }
            VisualNode::Text(t) => {
                let (size, style) = self.text(&id, t)?;
                leaf(id, offset, origin, size, z_order, style, parent.clip, paint_index)
            }
            VisualNode::Unsupported { kind } => return Err(FigError::unsupported(id, kind)),
        };
        node.spacing = self.spacing(offset, node.size);

        if node.clip.is_some() && node.visible_bounds().is_none() {
            tracing::warn!(id = %node.id, "node is entirely clipped");
        }
        tracing::debug!(
            id = %node.id,
            kind = node.style.kind(),
            x = node.origin.x,
            y = node.origin.y,
            z = node.z_order,
            "placed node"
        );
        Ok(node)
    }

    fn rectangle(&mut self, id: &str, r: &RectNode) -> FigResult<(Size, NodeStyle)> {
        let width = extent(id, "rectangle", "width", r.width)?;
        let height = extent(id, "rectangle", "height", r.height)?;
        let background = required(id, "rectangle", "background_color", r.background_color)?;

        let border = match r.border {
            Some(b) => {
                if !is_valid_extent(b.width) {
                    return Err(FigError::malformed(format!(
                        "node '{id}' has an invalid border width"
                    )));
                }
                Some(ResolvedBorder {
                    color: self.color(b.color),
                    width: b.width,
                })
            }
            None => None,
        };
        let shadow = match r.shadow {
            Some(s) => {
                let finite = [s.offset_x, s.offset_y, s.blur, s.spread]
                    .iter()
                    .all(|v| v.is_finite());
                if !finite || s.blur < 0.0 {
                    return Err(FigError::malformed(format!(
                        "node '{id}' has an invalid shadow"
                    )));
                }
                Some(ResolvedShadow {
                    color: self.color(s.color),
                    offset: Vec2::new(s.offset_x, s.offset_y),
                    blur: s.blur,
                    spread: s.spread,
                })
            }
            None => None,
        };
        if r.corner_radius.is_some_and(|v| !is_valid_extent(v)) {
            return Err(FigError::malformed(format!(
                "node '{id}' has an invalid corner radius"
            )));
        }

        Ok((
            Size::new(width, height),
            NodeStyle::Rectangle {
                background: self.color(background),
                border,
                shadow,
                corner_radius: r.corner_radius,
            },
        ))
    }

    fn text(&mut self, id: &str, t: &TextNode) -> FigResult<(Size, NodeStyle)> {
        let content = required(id, "text", "content", t.content.as_ref())?;
        let color = required(id, "text", "color", t.color)?;
        let font_family = required(id, "text", "font_family", t.font_family.as_ref())?;
        let font_weight = required(id, "text", "font_weight", t.font_weight)?;
        let font_size = required(id, "text", "font_size", t.font_size)?;
        let line_height = extent(id, "text", "line_height", t.line_height)?;
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(FigError::malformed(format!(
                "node '{id}' font_size must be finite and > 0"
            )));
        }
        if !font_weight.is_finite() || font_weight <= 0.0 {
            return Err(FigError::malformed(format!(
                "node '{id}' font_weight must be finite and > 0"
            )));
        }
        if t.letter_spacing.is_some_and(|v| !v.is_finite()) {
            return Err(FigError::malformed(format!(
                "node '{id}' letter_spacing must be finite"
            )));
        }

        let size = match (t.width, t.height) {
            (Some(w), Some(h)) => Size::new(
                extent(id, "text", "width", Some(w))?,
                extent(id, "text", "height", Some(h))?,
            ),
            (w, h) => {
                let measured = self.measurer.measure(&TextRun {
                    content,
                    font_family,
                    font_weight,
                    font_size,
                    line_height,
                    letter_spacing: t.letter_spacing.unwrap_or(0.0),
                })?;
                if !is_valid_extent(measured.width) || !is_valid_extent(measured.height) {
                    return Err(FigError::measure(format!(
                        "text '{id}' measured to an invalid size {}x{}",
                        measured.width, measured.height
                    )));
                }
                Size::new(
                    match w {
                        Some(w) => extent(id, "text", "width", Some(w))?,
                        None => measured.width,
                    },
                    match h {
                        Some(h) => extent(id, "text", "height", Some(h))?,
                        None => measured.height,
                    },
                )
            }
        };

        Ok((
            size,
            NodeStyle::Text {
                content: content.clone(),
                color: self.color(color),
                font_family: font_family.clone(),
                font_weight,
                font_size,
                line_height,
                letter_spacing: t.letter_spacing,
            },
        ))
    }

    fn spacing(&self, offset: Vec2, size: Size) -> Option<SpacingTokens> {
        self.settings.emit_tokens.then(|| SpacingTokens {
            x: signed_spacing(offset.x),
            y: signed_spacing(offset.y),
            width: spacing_token(size.width),
            height: spacing_token(size.height),
        })
    }

    fn color(&self, spec: ColorSpec) -> DisplayColor {
        let mut out = DisplayColor::plain(spec);
        if self.settings.emit_tokens {
            out.token =
                nearest_color_token(spec, self.settings.token_threshold).map(str::to_string);
        }
        out
    }
}

#[allow(clippy::too_many_arguments)]
fn leaf(
    id: String,
    offset: Vec2,
    origin: Point,
    size: Size,
    z_order: i32,
    style: NodeStyle,
    clip: Option<Rect>,
    paint_index: &mut usize,
) -> RenderedNode {
    RenderedNode {
        id,
        offset,
        origin,
        size,
        z_order,
        paint_index: next(paint_index),
        style,
        clip,
        clips_children: false,
        spacing: None,
        children: Vec::new(),
    }
}

// Negative offsets map onto the negative side of the scale (`-4`).
fn signed_spacing(v: f64) -> Option<String> {
    if v < 0.0 {
        spacing_token(-v).map(|t| if t == "0" { t } else { format!("-{t}") })
    } else {
        spacing_token(v)
    }
}

fn next(counter: &mut usize) -> usize {
    let v = *counter;
    *counter += 1;
    v
}

fn child_id(parent: &str, idx: usize, child: &Child) -> String {
    match &child.id {
        Some(id) => id.clone(),
        None => format!("{parent}/{idx}"),
    }
}

fn frame_size(id: &str, f: &FrameNode) -> FigResult<Size> {
    Ok(Size::new(
        extent(id, "frame", "width", f.width)?,
        extent(id, "frame", "height", f.height)?,
    ))
}

fn required<T>(id: &str, kind: &str, field: &str, v: Option<T>) -> FigResult<T> {
    v.ok_or_else(|| {
        FigError::malformed(format!(
            "{kind} '{id}' is missing required field '{field}'"
        ))
    })
}

fn extent(id: &str, kind: &str, field: &str, v: Option<f64>) -> FigResult<f64> {
    let v = required(id, kind, field, v)?;
    if !is_valid_extent(v) {
        return Err(FigError::malformed(format!(
            "{kind} '{id}' field '{field}' must be finite and >= 0, got {v}"
        )));
    }
    Ok(v)
}

#[cfg(test)]
#[path = "../tests/unit/compose.rs"]
mod tests;
