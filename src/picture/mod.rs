//! Ordered, layer-aware node container with incremental bounds.
//!
//! Node order is painting order. Bounds are folded in incrementally: `scanned` is the number of
//! leading nodes already accounted for in the cached box. Appending only grows the unscanned
//! tail; any insertion in front of scanned nodes resets the watermark to zero.

use std::ops::Range;
use std::rc::Rc;

use crate::draw::node::{BoundsScan, NodeRef};
use crate::draw::primitives::clip_pair;
use crate::foundation::bbox::BBox;
use crate::foundation::core::{Affine, BezPath};
use crate::settings::TexEngine;
use crate::typeset::metrics::LabelMetrics;

/// Memo of whether the picture contains label nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelScan {
    #[default]
    Unknown,
    Absent,
    Present,
}

#[derive(Clone, Debug, Default)]
struct BoundsCache {
    bbox: BBox,
    scanned: usize,
    labels: LabelScan,
    label_bounds: Vec<BBox>,
    bbox_stack: Vec<BBox>,
}

/// A drawing: nodes in z-order plus cached geometry.
#[derive(Clone, Debug)]
pub struct Picture {
    nodes: Vec<NodeRef>,
    cache: BoundsCache,
    transform: Affine,
}

impl Default for Picture {
    fn default() -> Self {
        Self::new()
    }
}

impl Picture {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            cache: BoundsCache::default(),
            transform: Affine::IDENTITY,
        }
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Transform accumulated over successive [`Picture::transformed`] calls.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Number of leading nodes folded into the cached bounds.
    pub fn scanned(&self) -> usize {
        self.cache.scanned
    }

    pub fn label_scan(&self) -> LabelScan {
        self.cache.labels
    }

    /// Boxes of the labels seen by the last bounds scan(s).
    pub fn label_bounds(&self) -> &[BBox] {
        &self.cache.label_bounds
    }

    pub fn append(&mut self, node: NodeRef) {
        self.nodes.push(node);
    }

    pub fn prepend(&mut self, node: NodeRef) {
        self.nodes.insert(0, node);
        self.cache.scanned = 0;
    }

    /// Append all of `other`'s nodes, sharing them.
    ///
    /// Merging a picture into itself cannot be expressed: `other` is borrowed shared while `self`
    /// is borrowed mutably.
    pub fn merge(&mut self, other: &Picture) {
        self.nodes.extend(other.nodes.iter().cloned());
    }

    /// Insert all of `other`'s nodes in front of this picture's nodes.
    pub fn prepend_picture(&mut self, other: &Picture) {
        self.nodes.splice(0..0, other.nodes.iter().cloned());
        self.cache.scanned = 0;
    }

    /// Bracket the picture with `begin`/`end`, re-opening the bracket after every run of layer
    /// markers so no bracket spans a layer boundary.
    ///
    /// When the picture ends inside a run of layer markers no final `end` is added.
    pub fn enclose(&mut self, begin: NodeRef, end: NodeRef) {
        self.nodes.insert(0, Rc::clone(&begin));
        self.cache.scanned = 0;

        let mut i = 0;
        while i < self.nodes.len() {
            if self.nodes[i].is_layer() {
                self.nodes.insert(i, Rc::clone(&end));
                i += 1;
                while i < self.nodes.len() && self.nodes[i].is_layer() {
                    i += 1;
                }
                if i == self.nodes.len() {
                    return;
                }
                self.nodes.insert(i, Rc::clone(&begin));
                i += 1;
            }
            i += 1;
        }
        self.nodes.push(end);
    }

    /// Clip everything drawn so far to `path`.
    pub fn clip(&mut self, path: BezPath, even_odd: bool) {
        let (begin, end) = clip_pair(path, even_odd);
        self.enclose(begin, end);
    }

    /// Whether any label node exists. Only the unscanned suffix is inspected, and once a label
    /// has been found the answer stays `true`. Always `false` without a typesetting engine.
    pub fn has_labels(&mut self, engine: TexEngine) -> bool {
        if engine.is_none() {
            return false;
        }
        let n = self.nodes.len();
        if n > self.cache.scanned && self.cache.labels != LabelScan::Present {
            let found = self.nodes[self.cache.scanned..]
                .iter()
                .any(|node| node.is_label());
            self.cache.labels = if found {
                LabelScan::Present
            } else {
                LabelScan::Absent
            };
        }
        self.cache.labels == LabelScan::Present
    }

    /// Bounding box of everything in the picture.
    ///
    /// Only nodes past the watermark are measured. The typesetting engine is brought up first
    /// when labels are present, since their extents come from its metrics.
    pub fn bounds(&mut self, metrics: &mut dyn LabelMetrics) -> BBox {
        let n = self.nodes.len();
        if n == self.cache.scanned {
            return self.cache.bbox;
        }

        if self.cache.scanned == 0 {
            self.cache.bbox = BBox::EMPTY;
            self.cache.label_bounds.clear();
            self.cache.bbox_stack.clear();
        }

        if self.has_labels(metrics.engine())
            && let Err(e) = metrics.init()
        {
            tracing::warn!(error = %e, "typesetting engine unavailable; label extents are estimated");
        }

        for i in self.cache.scanned..n {
            let node = &self.nodes[i];
            let mut scan = BoundsScan {
                metrics: &mut *metrics,
                label_bounds: &mut self.cache.label_bounds,
                bbox_stack: &mut self.cache.bbox_stack,
            };
            node.bounds(&mut self.cache.bbox, &mut scan);

            // Consecutive clip ends: the inner one need not save graphics state, which keeps the
            // interpreter's save stack shallow.
            if node.end_clip() && i > 0 {
                let prev = &self.nodes[i - 1];
                if prev.end_clip() {
                    prev.set_save(false);
                }
            }
        }

        self.cache.scanned = n;
        self.cache.bbox
    }

    /// New picture holding transformed copies of every node.
    pub fn transformed(&self, t: Affine) -> Picture {
        let mut pic = Picture::new();
        for node in &self.nodes {
            pic.append(node.transformed(t));
        }
        pic.transform = t * self.transform;
        pic
    }

    /// Index ranges of the layer segments, layer markers excluded.
    ///
    /// Without `split` the whole picture is one segment. A trailing layer marker does not open
    /// an empty final segment; consecutive markers do produce empty segments between them.
    pub fn layer_segments(&self, split: bool) -> Vec<Range<usize>> {
        let n = self.nodes.len();
        if !split {
            return if n == 0 { Vec::new() } else { vec![0..n] };
        }
        let mut segments = Vec::new();
        let mut start = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_layer() {
                segments.push(start..i);
                start = i + 1;
            }
        }
        if start < n {
            segments.push(start..n);
        }
        segments
    }
}

#[cfg(test)]
#[path = "../../tests/unit/picture/picture.rs"]
mod tests;
