//! Pictor assembles drawings into pictures and ships them out through external tools.
//!
//! A [`Picture`] is an ordered list of [`DrawNode`]s in painting order, with layer markers,
//! clip brackets and text labels. Shipping it out draws each layer to Encapsulated PostScript,
//! typesets the labels with TeX, and converts the result with dvips, Ghostscript or ImageMagick
//! before handing it to a viewer:
//!
//! - Build a [`Picture`] (or load a [`Scene`])
//! - Create a [`ShipoutContext`] once per program run
//! - Call [`Picture::shipout`] with a [`ShipoutRequest`]
#![deny(unsafe_code)]

mod foundation;

pub(crate) mod draw;
pub(crate) mod output;
pub(crate) mod picture;
pub(crate) mod process;
pub(crate) mod settings;
/// Shipping pictures out to files.
pub mod shipout;
pub(crate) mod typeset;

pub use crate::foundation::bbox::BBox;
pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgb, Vec2};
pub use crate::foundation::error::{PictorError, PictorResult};

pub use crate::draw::node::{BoundsScan, DrawNode, NodeRef};
pub use crate::draw::primitives::{
    ClipBeginNode, ClipEndNode, LabelNode, LayerNode, Paint, PathNode, VerbatimNode, clip_pair,
};
pub use crate::draw::scene::{NodeSpec, Scene};
pub use crate::output::psfile::{PsFile, VectorSink};
pub use crate::output::texfile::{LabelPlacement, LabelSink, TexFile};
pub use crate::picture::{LabelScan, Picture};
pub use crate::process::launcher::{
    ProcessHandle, ProcessLauncher, RunOpts, RunOutcome, Signal, SystemLauncher, ToolCommand,
};
pub use crate::process::viewer::{ReloadPolicy, ViewOutcome, ViewRequest, ViewerRegistry};
pub use crate::settings::{Align, PaperType, Programs, Settings, TexEngine};
pub use crate::shipout::{OutputTrack, ShipoutContext, ShipoutReport, ShipoutRequest};
pub use crate::typeset::metrics::{EstimatedMetrics, LabelExtent, LabelMetrics};
pub use crate::typeset::texpipe::TexPipe;
