//! The node trait every picture element implements.

use std::fmt;
use std::rc::Rc;

use crate::foundation::bbox::BBox;
use crate::foundation::core::Affine;
use crate::foundation::error::PictorResult;
use crate::output::psfile::VectorSink;
use crate::output::texfile::LabelSink;
use crate::typeset::metrics::LabelMetrics;

/// Shared handle to a node. Pictures merged into each other share the same nodes.
pub type NodeRef = Rc<dyn DrawNode>;

/// Mutable state threaded through a bounds scan.
pub struct BoundsScan<'a> {
    pub metrics: &'a mut dyn LabelMetrics,
    /// Boxes of every label seen since the last full rescan.
    pub label_bounds: &'a mut Vec<BBox>,
    /// Saved boxes of enclosing clip regions.
    pub bbox_stack: &'a mut Vec<BBox>,
}

/// Capabilities a picture element exposes to the picture and the shipout stage.
pub trait DrawNode: fmt::Debug {
    /// Layer boundary marker.
    fn is_layer(&self) -> bool {
        false
    }

    /// Text that needs the typesetting engine.
    fn is_label(&self) -> bool {
        false
    }

    /// Closes a clip region.
    fn end_clip(&self) -> bool {
        false
    }

    /// Ask a clip-ending node not to save/restore graphics state.
    fn set_save(&self, _save: bool) {}

    /// Fold this node's extent into `b`.
    fn bounds(&self, _b: &mut BBox, _scan: &mut BoundsScan<'_>) {}

    fn draw(&self, _out: &mut dyn VectorSink) -> PictorResult<()> {
        Ok(())
    }

    /// Emit typesetting output; `b` is the bounding box of the whole picture.
    fn write(&self, _tex: &mut dyn LabelSink, _b: &BBox) -> PictorResult<()> {
        Ok(())
    }

    /// Fresh node with `t` applied.
    fn transformed(&self, t: Affine) -> NodeRef;
}
