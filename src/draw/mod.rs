//! Drawable nodes.
//!
//! A [`Picture`](crate::Picture) holds nodes by shared reference; the node kinds below are the
//! ones pictor ships, but anything implementing [`DrawNode`](node::DrawNode) can be added.

pub(crate) mod node;
pub(crate) mod primitives;
pub(crate) mod scene;
