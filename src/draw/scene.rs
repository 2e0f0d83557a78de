//! JSON scene description used by the command-line front end.

use std::path::Path;

use anyhow::Context as _;
use kurbo::Shape as _;

use crate::draw::primitives::{LabelNode, LayerNode, Paint, PathNode, VerbatimNode};
use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgb, Vec2};
use crate::foundation::error::{PictorError, PictorResult};
use crate::picture::Picture;

/// A picture plus an optional PostScript preamble drawn ahead of it.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preamble: Vec<NodeSpec>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeSpec {
    /// SVG path data, filled unless `stroke_width` is given.
    Path {
        d: String,
        #[serde(default)]
        color: Rgb,
        #[serde(default)]
        stroke_width: Option<f64>,
        #[serde(default)]
        even_odd: bool,
        #[serde(default = "opaque")]
        opacity: f64,
    },
    Rect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        #[serde(default)]
        color: Rgb,
        #[serde(default)]
        stroke_width: Option<f64>,
    },
    Label {
        text: String,
        at: Point,
        #[serde(default)]
        align: Vec2,
        #[serde(default = "default_label_size")]
        size: f64,
    },
    Layer,
    Verbatim {
        line: String,
    },
    /// Children clipped to the path `d`.
    Clip {
        d: String,
        #[serde(default)]
        even_odd: bool,
        nodes: Vec<NodeSpec>,
    },
    /// Children with an affine transform `[a b c d e f]` applied.
    Group {
        transform: [f64; 6],
        nodes: Vec<NodeSpec>,
    },
}

fn opaque() -> f64 {
    1.0
}

fn default_label_size() -> f64 {
    12.0
}

fn parse_path(d: &str) -> PictorResult<BezPath> {
    BezPath::from_svg(d).map_err(|e| PictorError::validation(format!("invalid path data: {e}")))
}

fn finite(name: &str, values: &[f64]) -> PictorResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(PictorError::validation(format!("{name} has non-finite values")))
    }
}

impl Scene {
    pub fn from_json_file(path: &Path) -> PictorResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(s: &str) -> PictorResult<Self> {
        serde_json::from_str(s).map_err(|e| PictorError::validation(format!("invalid scene JSON: {e}")))
    }

    pub fn picture(&self) -> PictorResult<Picture> {
        build(&self.nodes)
    }

    /// The preamble picture, when the scene has one.
    pub fn preamble_picture(&self) -> PictorResult<Option<Picture>> {
        if self.preamble.is_empty() {
            return Ok(None);
        }
        build(&self.preamble).map(Some)
    }
}

fn build(specs: &[NodeSpec]) -> PictorResult<Picture> {
    let mut pic = Picture::new();
    for spec in specs {
        add(&mut pic, spec)?;
    }
    Ok(pic)
}

fn add(pic: &mut Picture, spec: &NodeSpec) -> PictorResult<()> {
    match spec {
        NodeSpec::Path {
            d,
            color,
            stroke_width,
            even_odd,
            opacity,
        } => {
            let path = parse_path(d)?;
            let node = match stroke_width {
                Some(w) => {
                    finite("stroke_width", &[*w])?;
                    PathNode::stroke(path, *w, *color)
                }
                None => PathNode {
                    paint: Paint::Fill {
                        even_odd: *even_odd,
                    },
                    ..PathNode::fill(path, *color)
                },
            };
            pic.append(node.with_opacity(*opacity).into_node());
        }
        NodeSpec::Rect {
            x0,
            y0,
            x1,
            y1,
            color,
            stroke_width,
        } => {
            finite("rect", &[*x0, *y0, *x1, *y1])?;
            let path = Rect::new(*x0, *y0, *x1, *y1).to_path(0.1);
            let node = match stroke_width {
                Some(w) => PathNode::stroke(path, *w, *color),
                None => PathNode::fill(path, *color),
            };
            pic.append(node.into_node());
        }
        NodeSpec::Label {
            text,
            at,
            align,
            size,
        } => {
            finite("label", &[at.x, at.y, *size])?;
            if *size <= 0.0 {
                return Err(PictorError::validation(format!(
                    "label '{text}' must have a positive size"
                )));
            }
            pic.append(
                LabelNode::new(text.clone(), *at)
                    .aligned(*align)
                    .sized(*size)
                    .into_node(),
            );
        }
        NodeSpec::Layer => pic.append(LayerNode::node()),
        NodeSpec::Verbatim { line } => pic.append(VerbatimNode::node(line.clone())),
        NodeSpec::Clip { d, even_odd, nodes } => {
            let mut inner = build(nodes)?;
            inner.clip(parse_path(d)?, *even_odd);
            pic.merge(&inner);
        }
        NodeSpec::Group { transform, nodes } => {
            finite("transform", transform)?;
            let inner = build(nodes)?;
            pic.merge(&inner.transformed(Affine::new(*transform)));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/draw/scene.rs"]
mod tests;
