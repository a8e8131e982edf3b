use serde::{Deserialize, Serialize};

use crate::color::ColorSpec;

/// A node of the static design snapshot.
///
/// Geometry and color fields that the composer requires are optional here: the
/// tree comes from an external loader and is validated when rendered.
#[derive(Clone, Debug, PartialEq)]
pub enum VisualNode {
    Frame(FrameNode),
    Rectangle(RectNode),
    Text(TextNode),
    /// Any node kind outside the three above; rejected by the composer.
    Unsupported { kind: String },
}

impl VisualNode {
    pub fn kind(&self) -> &str {
        match self {
            Self::Frame(_) => "frame",
            Self::Rectangle(_) => "rectangle",
            Self::Text(_) => "text",
            Self::Unsupported { kind } => kind,
        }
    }

    pub fn as_frame(&self) -> Option<&FrameNode> {
        match self {
            Self::Frame(f) => Some(f),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameNode {
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(default, alias = "backgroundColor")]
    pub background_color: Option<ColorSpec>,
    #[serde(
        default,
        alias = "cornerRadius",
        skip_serializing_if = "Option::is_none"
    )]
    pub corner_radius: Option<f64>,
    #[serde(default, alias = "clipsChildren")]
    pub clips_children: bool,
    #[serde(default)]
    pub children: Vec<Child>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RectNode {
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(default, alias = "backgroundColor")]
    pub background_color: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(
        default,
        alias = "cornerRadius",
        skip_serializing_if = "Option::is_none"
    )]
    pub corner_radius: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub content: Option<String>,
    pub color: Option<ColorSpec>,
    #[serde(default, alias = "fontFamily")]
    pub font_family: Option<String>,
    #[serde(default, alias = "fontWeight")]
    pub font_weight: Option<f64>,
    #[serde(default, alias = "fontSize")]
    pub font_size: Option<f64>,
    #[serde(default, alias = "lineHeight")]
    pub line_height: Option<f64>,
    #[serde(
        default,
        alias = "letterSpacing",
        skip_serializing_if = "Option::is_none"
    )]
    pub letter_spacing: Option<f64>,
    /// Explicit box; measured by the text collaborator when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub color: ColorSpec,
    pub width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: ColorSpec,
    #[serde(default, alias = "offsetX")]
    pub offset_x: f64,
    #[serde(default, alias = "offsetY")]
    pub offset_y: f64,
    #[serde(default)]
    pub blur: f64,
    #[serde(default)]
    pub spread: f64,
}

/// Position of a node's top-left corner relative to its parent's top-left
/// corner, plus paint order among siblings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(alias = "offsetX")]
    pub offset_x: f64,
    #[serde(alias = "offsetY")]
    pub offset_y: f64,
    /// Defaults to the sibling index.
    #[serde(default, alias = "zOrder", skip_serializing_if = "Option::is_none")]
    pub z_order: Option<i32>,
}

impl Placement {
    pub fn at(offset_x: f64, offset_y: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            z_order: None,
        }
    }

    pub fn with_z(mut self, z: i32) -> Self {
        self.z_order = Some(z);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Child {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub placement: Option<Placement>,
    pub node: VisualNode,
}

impl Child {
    pub fn new(id: impl Into<String>, placement: Placement, node: VisualNode) -> Self {
        Self {
            id: Some(id.into()),
            placement: Some(placement),
            node,
        }
    }
}

impl FrameNode {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn with_background(mut self, color: ColorSpec) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn rounded(mut self, radius: f64) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    pub fn clipped(mut self) -> Self {
        self.clips_children = true;
        self
    }

    pub fn push(mut self, child: Child) -> Self {
        self.children.push(child);
        self
    }
}

impl RectNode {
    pub fn filled(width: f64, height: f64, color: ColorSpec) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            background_color: Some(color),
            ..Self::default()
        }
    }
}

// Nodes are tagged by `type`. Unknown tags are kept as `Unsupported` so the
// composer can report them; a known tag with a bad body stays a parse error.
impl<'de> Deserialize<'de> for VisualNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(tag = "type", rename_all = "snake_case")]
        enum Known {
            Frame(FrameNode),
            Rectangle(RectNode),
            Text(TextNode),
        }

        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| serde::de::Error::custom("node is missing string field 'type'"))?
            .to_owned();

        match kind.as_str() {
            "frame" | "rectangle" | "text" => {
                let known = Known::deserialize(value).map_err(serde::de::Error::custom)?;
                Ok(match known {
                    Known::Frame(f) => Self::Frame(f),
                    Known::Rectangle(r) => Self::Rectangle(r),
                    Known::Text(t) => Self::Text(t),
                })
            }
            _ => Ok(Self::Unsupported { kind }),
        }
    }
}

impl Serialize for VisualNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        #[serde(tag = "type", rename_all = "snake_case")]
        enum KnownRef<'a> {
            Frame(&'a FrameNode),
            Rectangle(&'a RectNode),
            Text(&'a TextNode),
        }

        #[derive(Serialize)]
        struct Other<'a> {
            #[serde(rename = "type")]
            kind: &'a str,
        }

        match self {
            Self::Frame(f) => KnownRef::Frame(f).serialize(serializer),
            Self::Rectangle(r) => KnownRef::Rectangle(r).serialize(serializer),
            Self::Text(t) => KnownRef::Text(t).serialize(serializer),
            Self::Unsupported { kind } => Other { kind }.serialize(serializer),
        }
    }
}
