use serde::Serialize;

use crate::{
    compose::{NodeStyle, RenderedNode, RenderedTree},
    foundation::core::{Point, Rect},
};

/// Flat paint command with absolute geometry, as consumed by a mounting layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    FillRect {
        id: String,
        rect: Rect,
        color: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        corner_radius: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        border: Option<(String, f64)>,
        #[serde(skip_serializing_if = "Option::is_none")]
        shadow: Option<String>,
    },
    Text {
        id: String,
        rect: Rect,
        content: String,
        color: String,
        font_family: String,
        font_weight: f64,
        font_size: f64,
        line_height: f64,
        letter_spacing: f64,
    },
    PushClip {
        rect: Rect,
    },
    PopClip,
}

impl RenderedTree {
    /// Nodes in paint order (pre-order, children already sorted).
    pub fn iter(&self) -> impl Iterator<Item = &RenderedNode> {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn find(&self, id: &str) -> Option<&RenderedNode> {
        self.iter().find(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Topmost node whose visible (clipped) bounds contain `p`.
    pub fn hit_test(&self, p: Point) -> Option<&RenderedNode> {
        self.iter()
            .filter(|n| n.visible_bounds().is_some_and(|r| r.contains(p)))
            .max_by_key(|n| n.paint_index)
    }

    /// Flatten into paint-ordered draw commands. Clipping frames wrap their
    /// children in a `PushClip`/`PopClip` pair.
    pub fn draw_ops(&self) -> Vec<DrawOp> {
        let mut ops = Vec::with_capacity(self.node_count() * 2);
        emit(&self.root, &mut ops);
        ops
    }
}

fn emit(node: &RenderedNode, ops: &mut Vec<DrawOp>) {
    let rect = node.bounds();
    match &node.style {
        NodeStyle::Frame {
            background,
            corner_radius,
        } => {
            if let Some(bg) = background {
                ops.push(DrawOp::FillRect {
                    id: node.id.clone(),
                    rect,
                    color: bg.css.clone(),
                    corner_radius: *corner_radius,
                    border: None,
                    shadow: None,
                });
            }
        }
        NodeStyle::Rectangle {
            background,
            border,
            shadow,
            corner_radius,
        } => ops.push(DrawOp::FillRect {
            id: node.id.clone(),
            rect,
            color: background.css.clone(),
            corner_radius: *corner_radius,
            border: border.as_ref().map(|b| (b.color.css.clone(), b.width)),
            shadow: shadow.as_ref().map(|s| {
                format!(
                    "{}px {}px {}px {}px {}",
                    s.offset.x, s.offset.y, s.blur, s.spread, s.color.css
                )
            }),
        }),
        NodeStyle::Text {
            content,
            color,
            font_family,
            font_weight,
            font_size,
            line_height,
            letter_spacing,
        } => ops.push(DrawOp::Text {
            id: node.id.clone(),
            rect,
            content: content.clone(),
            color: color.css.clone(),
            font_family: font_family.clone(),
            font_weight: *font_weight,
            font_size: *font_size,
            line_height: *line_height,
            letter_spacing: letter_spacing.unwrap_or(0.0),
        }),
    }

    if node.children.is_empty() {
        return;
    }
    if node.clips_children {
        ops.push(DrawOp::PushClip { rect });
    }
    for child in &node.children {
        emit(child, ops);
    }
    if node.clips_children {
        ops.push(DrawOp::PopClip);
    }
}

#[cfg(test)]
#[path = "../tests/unit/display.rs"]
mod tests;
