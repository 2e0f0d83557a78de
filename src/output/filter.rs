//! Pass-through of dvips output into the final EPS.

use std::io::{BufRead, Write};

use crate::foundation::bbox::BBox;
use crate::foundation::core::{Affine, is_identity};
use crate::foundation::error::PictorResult;
use crate::output::psfile::{PsFile, VectorSink};

const BEGIN_SPECIAL: &str = "TeXDict begin @defspecial";
const END_SPECIAL: &str = "@fedspecial end";

/// Copy dvips output into `out`, fixing up the header and bounding box.
///
/// The first `%%BoundingBox:` comment is replaced by `shifted`, paper size comments are dropped,
/// and when `t` is not the identity every `\special` block is wrapped in `gsave t concat ...
/// grestore` so embedded PostScript follows the picture transform.
pub fn filter_dvips_output<R: BufRead, W: Write>(
    input: R,
    out: &mut PsFile<W>,
    shifted: &BBox,
    t: Affine,
) -> PictorResult<()> {
    let shift = !is_identity(t);
    let mut first_bbox = true;
    for line in input.lines() {
        let line = line?;
        if line.starts_with("%%DocumentPaperSizes:") {
            continue;
        }
        if line.starts_with("%!PS-Adobe-") {
            out.header()?;
        } else if first_bbox && line.starts_with("%%BoundingBox:") {
            tracing::trace!(?shifted, "replacing dvips bounding box");
            out.bounding_box(shifted)?;
            first_bbox = false;
        } else if shift && line.starts_with(BEGIN_SPECIAL) {
            out.verbatim_line(&line)?;
            out.gsave()?;
            out.concat(t)?;
        } else if shift && line.starts_with(END_SPECIAL) {
            out.grestore()?;
            out.verbatim_line(&line)?;
        } else {
            out.verbatim_line(&line)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/output/filter.rs"]
mod tests;
