//! Loader for a design tool's JSON export.
//!
//! The export positions every node by its absolute canvas bounding box. The
//! loader rewrites that into the parent-relative [`Placement`] model, so no
//! offset ever has to be pre-summed by hand.

use serde::Deserialize;

use crate::{
    color::ColorSpec,
    foundation::error::{FigError, FigResult},
    model::{Border, Child, FrameNode, Placement, RectNode, Shadow, TextNode, VisualNode},
    settings::RenderSettings,
};

/// The shapes an export arrives in: the raw file response (`document`), the
/// fetcher's normalized result (`nodes`), or a bare node.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum DesignExport {
    Document { document: DesignNode },
    Nodes { nodes: Vec<DesignNode> },
    Node(DesignNode),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "yes")]
    pub visible: bool,
    pub absolute_bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    pub stroke_weight: Option<f64>,
    pub corner_radius: Option<f64>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub clips_content: bool,
    pub characters: Option<String>,
    pub style: Option<TypeStyle>,
    #[serde(default)]
    pub children: Vec<DesignNode>,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Paint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "yes")]
    pub visible: bool,
    pub opacity: Option<f64>,
    pub color: Option<ColorSpec>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "yes")]
    pub visible: bool,
    pub color: Option<ColorSpec>,
    pub offset: Option<EffectOffset>,
    pub radius: Option<f64>,
    pub spread: Option<f64>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct EffectOffset {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    pub font_family: Option<String>,
    pub font_weight: Option<f64>,
    pub font_size: Option<f64>,
    pub line_height_px: Option<f64>,
    pub letter_spacing: Option<f64>,
}

fn yes() -> bool {
    true
}

impl DesignExport {
    pub fn from_json_str(s: &str) -> FigResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// The node that becomes the render root: the first frame-like node,
    /// descending through document and page wrappers.
    pub fn root(&self) -> FigResult<&DesignNode> {
        let top = match self {
            Self::Document { document } => document,
            Self::Node(node) => node,
            Self::Nodes { nodes } => {
                if nodes.len() > 1 {
                    tracing::warn!(count = nodes.len(), "export has several nodes; using the first");
                }
                nodes
                    .first()
                    .ok_or_else(|| FigError::malformed("export contains no nodes"))?
            }
        };

        let mut cur = top;
        while matches!(cur.kind.as_str(), "DOCUMENT" | "CANVAS") {
            cur = cur
                .children
                .iter()
                .find(|c| c.visible && is_frame_like(&c.kind))
                .or_else(|| cur.children.iter().find(|c| c.visible))
                .ok_or_else(|| {
                    FigError::malformed(format!("'{}' ({}) has no renderable child", cur.id, cur.kind))
                })?;
        }
        Ok(cur)
    }
}

fn is_frame_like(kind: &str) -> bool {
    matches!(kind, "FRAME" | "COMPONENT" | "COMPONENT_SET" | "INSTANCE" | "GROUP" | "SECTION")
}

/// Convert an export into a [`VisualNode`] tree rooted at [`DesignExport::root`].
#[tracing::instrument(skip_all)]
pub fn load_design(export: &DesignExport, settings: &RenderSettings) -> FigResult<VisualNode> {
    let root = export.root()?;
    tracing::debug!(id = %root.id, name = %root.name, "loading design root");
    Ok(convert(root, settings))
}

fn convert(node: &DesignNode, settings: &RenderSettings) -> VisualNode {
    let bbox = node.absolute_bounding_box;
    match node.kind.as_str() {
        k if is_frame_like(k) => {
            let mut children = Vec::with_capacity(node.children.len());
            for child in node.children.iter().filter(|c| c.visible) {
                if settings.skip_unsupported && !is_supported(&child.kind) {
                    tracing::warn!(id = %child.id, kind = %child.kind, "skipping unsupported node");
                    continue;
                }
                let placement = match (bbox, child.absolute_bounding_box) {
                    (Some(p), Some(c)) => Some(Placement::at(c.x - p.x, c.y - p.y)),
                    _ => None,
                };
                children.push(Child {
                    id: Some(child.id.clone()),
                    placement,
                    node: convert(child, settings),
                });
            }
            VisualNode::Frame(FrameNode {
                width: bbox.map(|b| b.width),
                height: bbox.map(|b| b.height),
                background_color: solid(&node.fills),
                corner_radius: node.corner_radius.filter(|r| *r > 0.0),
                // Groups only bundle their children; they never clip.
                clips_children: node.clips_content && node.kind != "GROUP",
                children,
            })
        }
        "RECTANGLE" => VisualNode::Rectangle(RectNode {
            width: bbox.map(|b| b.width),
            height: bbox.map(|b| b.height),
            background_color: solid(&node.fills),
            border: solid(&node.strokes).map(|color| Border {
                color,
                width: node.stroke_weight.unwrap_or(1.0),
            }),
            shadow: drop_shadow(&node.effects),
            corner_radius: node.corner_radius.filter(|r| *r > 0.0),
        }),
        "TEXT" => {
            let style = node.style.as_ref();
            VisualNode::Text(TextNode {
                content: node.characters.clone(),
                color: solid(&node.fills),
                font_family: style.and_then(|s| s.font_family.clone()),
                font_weight: style.and_then(|s| s.font_weight),
                font_size: style.and_then(|s| s.font_size),
                line_height: style.and_then(|s| s.line_height_px),
                letter_spacing: style.and_then(|s| s.letter_spacing).filter(|v| *v != 0.0),
                width: None,
                height: None,
            })
        }
        other => VisualNode::Unsupported {
            kind: other.to_ascii_lowercase(),
        },
    }
}

fn is_supported(kind: &str) -> bool {
    is_frame_like(kind) || matches!(kind, "RECTANGLE" | "TEXT")
}

/// First visible solid paint, with the paint's own opacity folded into alpha.
fn solid(paints: &[Paint]) -> Option<ColorSpec> {
    paints
        .iter()
        .filter(|p| p.visible && p.kind == "SOLID")
        .find_map(|p| Some(p.color?.with_opacity(p.opacity.unwrap_or(1.0))))
}

fn drop_shadow(effects: &[Effect]) -> Option<Shadow> {
    let e = effects
        .iter()
        .find(|e| e.visible && e.kind == "DROP_SHADOW")?;
    let offset = e.offset.unwrap_or(EffectOffset { x: 0.0, y: 0.0 });
    Some(Shadow {
        color: e.color?,
        offset_x: offset.x,
        offset_y: offset.y,
        blur: e.radius.unwrap_or(0.0),
        spread: e.spread.unwrap_or(0.0),
    })
}
