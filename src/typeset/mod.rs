//! Label extents.
//!
//! Label bounds depend on font metrics only the typesetting engine knows, so bounds computation
//! goes through [`LabelMetrics`](metrics::LabelMetrics).

pub(crate) mod metrics;
pub(crate) mod texpipe;
