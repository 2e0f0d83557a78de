//! Node kinds pictor ships: paths, labels, layers, verbatim lines and clip brackets.

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{PathEl, Shape as _};

use crate::draw::node::{BoundsScan, DrawNode, NodeRef};
use crate::foundation::bbox::BBox;
use crate::foundation::core::{Affine, BezPath, Point, Rgb, Vec2};
use crate::foundation::error::{PictorError, PictorResult};
use crate::output::psfile::VectorSink;
use crate::output::texfile::{LabelPlacement, LabelSink};
use crate::typeset::metrics::EstimatedMetrics;

/// How a path is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Fill { even_odd: bool },
    Stroke { width: f64 },
}

/// Filled or stroked path.
#[derive(Clone, Debug)]
pub struct PathNode {
    pub path: BezPath,
    pub paint: Paint,
    pub color: Rgb,
    pub opacity: f64,
}

impl PathNode {
    pub fn fill(path: BezPath, color: Rgb) -> Self {
        Self {
            path,
            paint: Paint::Fill { even_odd: false },
            color,
            opacity: 1.0,
        }
    }

    pub fn stroke(path: BezPath, width: f64, color: Rgb) -> Self {
        Self {
            path,
            paint: Paint::Stroke { width },
            color,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn into_node(self) -> NodeRef {
        Rc::new(self)
    }
}

fn path_is_finite(path: &BezPath) -> bool {
    path.elements().iter().all(|el| match *el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => p.is_finite(),
        PathEl::QuadTo(a, b) => a.is_finite() && b.is_finite(),
        PathEl::CurveTo(a, b, c) => a.is_finite() && b.is_finite() && c.is_finite(),
        PathEl::ClosePath => true,
    })
}

fn linear_scale(t: Affine) -> f64 {
    t.determinant().abs().sqrt()
}

impl DrawNode for PathNode {
    fn bounds(&self, b: &mut BBox, _scan: &mut BoundsScan<'_>) {
        if self.path.elements().is_empty() {
            return;
        }
        let mut r = self.path.bounding_box();
        if let Paint::Stroke { width } = self.paint {
            r = r.inflate(width * 0.5, width * 0.5);
        }
        b.merge(&BBox::from_rect(r));
    }

    fn draw(&self, out: &mut dyn VectorSink) -> PictorResult<()> {
        if !path_is_finite(&self.path) {
            return Err(PictorError::draw("path has non-finite coordinates"));
        }
        out.set_color(self.color)?;
        out.set_opacity(self.opacity)?;
        match self.paint {
            Paint::Fill { even_odd } => {
                out.path(&self.path)?;
                out.fill(even_odd)
            }
            Paint::Stroke { width } => {
                out.set_line_width(width)?;
                out.path(&self.path)?;
                out.stroke()
            }
        }
    }

    fn transformed(&self, t: Affine) -> NodeRef {
        let paint = match self.paint {
            Paint::Stroke { width } => Paint::Stroke {
                width: width * linear_scale(t),
            },
            fill => fill,
        };
        Rc::new(Self {
            path: t * self.path.clone(),
            paint,
            ..self.clone()
        })
    }
}

/// Text typeset by the engine and overlaid on the graphics.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelNode {
    pub text: String,
    pub at: Point,
    /// Side of `at` the label sits on; only the sign of each component matters.
    pub align: Vec2,
    pub size: f64,
}

impl LabelNode {
    pub fn new(text: impl Into<String>, at: Point) -> Self {
        Self {
            text: text.into(),
            at,
            align: Vec2::ZERO,
            size: 12.0,
        }
    }

    pub fn aligned(mut self, align: Vec2) -> Self {
        self.align = align;
        self
    }

    pub fn sized(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn into_node(self) -> NodeRef {
        Rc::new(self)
    }
}

impl DrawNode for LabelNode {
    fn is_label(&self) -> bool {
        true
    }

    fn bounds(&self, b: &mut BBox, scan: &mut BoundsScan<'_>) {
        let extent = match scan.metrics.measure(&self.text, self.size) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(label = %self.text, error = %e, "falling back to estimated label extent");
                EstimatedMetrics::estimate(&self.text, self.size)
            }
        };
        let total = extent.height + extent.depth;
        let left = self.at.x + (side(self.align.x) - 1.0) * extent.width * 0.5;
        let bottom = self.at.y + (side(self.align.y) - 1.0) * total * 0.5;
        let label = BBox::new(left, bottom, left + extent.width, bottom + total);
        scan.label_bounds.push(label);
        b.merge(&label);
    }

    fn write(&self, tex: &mut dyn LabelSink, b: &BBox) -> PictorResult<()> {
        let origin = if b.empty {
            Vec2::ZERO
        } else {
            Vec2::new(b.left, b.bottom)
        };
        tex.put_label(&LabelPlacement {
            text: &self.text,
            at: self.at - origin,
            align: self.align,
            size: self.size,
        })
    }

    fn transformed(&self, t: Affine) -> NodeRef {
        Rc::new(Self {
            at: t * self.at,
            size: self.size * linear_scale(t),
            ..self.clone()
        })
    }
}

fn side(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Layer boundary.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayerNode;

impl LayerNode {
    pub fn node() -> NodeRef {
        Rc::new(Self)
    }
}

impl DrawNode for LayerNode {
    fn is_layer(&self) -> bool {
        true
    }

    fn transformed(&self, _t: Affine) -> NodeRef {
        Rc::new(Self)
    }
}

/// A raw PostScript line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerbatimNode {
    pub line: String,
}

impl VerbatimNode {
    pub fn node(line: impl Into<String>) -> NodeRef {
        Rc::new(Self { line: line.into() })
    }
}

impl DrawNode for VerbatimNode {
    fn draw(&self, out: &mut dyn VectorSink) -> PictorResult<()> {
        out.verbatim_line(&self.line)
    }

    fn transformed(&self, _t: Affine) -> NodeRef {
        Rc::new(self.clone())
    }
}

/// Start of a clip region. Shares its save flag with the matching [`ClipEndNode`].
#[derive(Clone, Debug)]
pub struct ClipBeginNode {
    pub path: BezPath,
    pub even_odd: bool,
    save: Rc<Cell<bool>>,
}

impl ClipBeginNode {
    pub fn saves(&self) -> bool {
        self.save.get()
    }
}

/// End of a clip region.
#[derive(Clone, Debug)]
pub struct ClipEndNode {
    save: Rc<Cell<bool>>,
}

impl ClipEndNode {
    pub fn saves(&self) -> bool {
        self.save.get()
    }
}

/// Matching begin/end nodes for clipping to `path`.
pub fn clip_pair(path: BezPath, even_odd: bool) -> (NodeRef, NodeRef) {
    let save = Rc::new(Cell::new(true));
    let begin = ClipBeginNode {
        path,
        even_odd,
        save: Rc::clone(&save),
    };
    let end = ClipEndNode { save };
    (Rc::new(begin), Rc::new(end))
}

impl DrawNode for ClipBeginNode {
    fn bounds(&self, b: &mut BBox, scan: &mut BoundsScan<'_>) {
        scan.bbox_stack.push(*b);
        scan.bbox_stack.push(BBox::from_rect(self.path.bounding_box()));
        *b = BBox::EMPTY;
    }

    fn draw(&self, out: &mut dyn VectorSink) -> PictorResult<()> {
        if self.save.get() {
            out.gsave()?;
        }
        out.path(&self.path)?;
        out.clip(self.even_odd)
    }

    fn transformed(&self, t: Affine) -> NodeRef {
        Rc::new(Self {
            path: t * self.path.clone(),
            ..self.clone()
        })
    }
}

impl DrawNode for ClipEndNode {
    fn end_clip(&self) -> bool {
        true
    }

    fn set_save(&self, save: bool) {
        self.save.set(save);
    }

    fn bounds(&self, b: &mut BBox, scan: &mut BoundsScan<'_>) {
        let (Some(clip), Some(outer)) = (scan.bbox_stack.pop(), scan.bbox_stack.pop()) else {
            tracing::warn!("clip end without matching clip begin");
            return;
        };
        let mut merged = outer;
        merged.merge(&b.intersect(&clip));
        *b = merged;
    }

    fn draw(&self, out: &mut dyn VectorSink) -> PictorResult<()> {
        if self.save.get() {
            out.grestore()?;
        }
        Ok(())
    }

    fn transformed(&self, _t: Affine) -> NodeRef {
        Rc::new(self.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/primitives.rs"]
mod tests;
