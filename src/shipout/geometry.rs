//! Placement of the picture on the page.

use crate::foundation::bbox::BBox;
use crate::foundation::core::Vec2;
use crate::settings::Align;

/// Placeholder box written when there is nothing to draw.
pub fn null_box(xobject: bool) -> BBox {
    let size = if xobject { 18.0 } else { 1.0 };
    BBox::new(0.0, 0.0, size, size)
}

/// Ghostscript's pngalpha device crops half a pixel; grow the box to compensate.
pub fn png_fuzz(b: &mut BBox, magnification: f64) {
    if b.empty || magnification <= 0.0 {
        return;
    }
    let fuzz = 0.5 / magnification;
    b.top += fuzz;
    b.right += fuzz;
    b.bottom -= fuzz;
}

/// Shift that moves the picture to its place on the page.
///
/// PDF output always starts at the origin. Otherwise the box is moved to the origin unless
/// aligned at zero, the configured offset is added, and top/center alignment distribute the
/// paper left over around the picture.
pub fn bbox_shift(b: &BBox, align: Align, pdf_format: bool, offset: Vec2, paper: (f64, f64)) -> Vec2 {
    let mut shift = if align == Align::Zero && !pdf_format {
        Vec2::ZERO
    } else {
        Vec2::new(-b.left, -b.bottom)
    };
    if pdf_format {
        return shift;
    }
    shift += offset;
    let (paper_width, paper_height) = paper;
    match align {
        Align::Zero | Align::Bottom => {}
        Align::Top => {
            let yexcess = (paper_height - (b.height() + 1.0)).max(0.0);
            shift.y += yexcess;
        }
        Align::Center => {
            let yexcess = (paper_height - (b.height() + 1.0)).max(0.0);
            let xexcess = (paper_width - (b.width() + 1.0)).max(0.0);
            shift += Vec2::new(0.5 * xexcess, 0.5 * yexcess);
        }
    }
    shift
}

/// `-O` offsets (bp) that make dvips place the page where the shifted box expects it.
pub fn dvips_offsets(b: &BBox, shift: Vec2, paper_height: f64, latex: bool) -> (f64, f64) {
    let height = b.height() + 1.0;
    let mut vertical = height;
    if !latex {
        vertical += 2.0;
    }
    let hoffset = -128.4 + b.left + shift.x;
    let voffset = if vertical < 13.0 {
        -137.8 + vertical
    } else {
        -124.8
    };
    (hoffset, voffset + paper_height - height - b.bottom - shift.y)
}

#[cfg(test)]
#[path = "../../tests/unit/shipout/geometry.rs"]
mod tests;
