//! Encapsulated PostScript output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context as _;
use kurbo::PathEl;

use crate::foundation::bbox::BBox;
use crate::foundation::core::{Affine, BezPath, Point, Rgb, Vec2, fmt_num};
use crate::foundation::error::PictorResult;

/// Drawing operations nodes emit into a vector output.
pub trait VectorSink {
    fn gsave(&mut self) -> PictorResult<()>;
    fn grestore(&mut self) -> PictorResult<()>;
    fn translate(&mut self, by: Vec2) -> PictorResult<()>;
    fn concat(&mut self, t: Affine) -> PictorResult<()>;
    /// Forget cached pen state so the next colour/width is emitted unconditionally.
    fn reset_pen(&mut self);
    fn verbatim_line(&mut self, line: &str) -> PictorResult<()>;
    fn set_color(&mut self, color: Rgb) -> PictorResult<()>;
    fn set_line_width(&mut self, width: f64) -> PictorResult<()>;
    /// Alpha below one marks the output as using transparency.
    fn set_opacity(&mut self, opacity: f64) -> PictorResult<()>;
    fn path(&mut self, path: &BezPath) -> PictorResult<()>;
    fn fill(&mut self, even_odd: bool) -> PictorResult<()>;
    fn stroke(&mut self) -> PictorResult<()>;
    fn clip(&mut self, even_odd: bool) -> PictorResult<()>;
}

#[derive(Clone, Copy, Debug, Default)]
struct PenState {
    color: Option<Rgb>,
    width: Option<f64>,
    opacity: Option<f64>,
}

/// Encapsulated PostScript writer.
pub struct PsFile<W: Write> {
    out: W,
    for_pdf: bool,
    pen: PenState,
    transparency: bool,
}

impl PsFile<Box<dyn Write>> {
    /// Open `name` for writing; `-` or an empty name writes to standard output.
    pub fn open(name: &str, for_pdf: bool) -> PictorResult<Self> {
        let out: Box<dyn Write> = if name.is_empty() || name == "-" {
            Box::new(BufWriter::new(std::io::stdout()))
        } else {
            let path = Path::new(name);
            let f = File::create(path)
                .with_context(|| format!("create vector output '{}'", path.display()))?;
            Box::new(BufWriter::new(f))
        };
        Ok(Self::new(out, for_pdf))
    }
}

impl<W: Write> PsFile<W> {
    pub fn new(out: W, for_pdf: bool) -> Self {
        Self {
            out,
            for_pdf,
            pen: PenState::default(),
            transparency: false,
        }
    }

    fn line(&mut self, s: &str) -> PictorResult<()> {
        writeln!(self.out, "{s}")?;
        Ok(())
    }

    pub fn header(&mut self) -> PictorResult<()> {
        self.line("%!PS-Adobe-3.0 EPSF-3.0")
    }

    pub fn bounding_box(&mut self, b: &BBox) -> PictorResult<()> {
        let (l, bo, r, t) = if b.empty {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            (b.left, b.bottom, b.right, b.top)
        };
        writeln!(
            self.out,
            "%%BoundingBox: {} {} {} {}",
            fmt_num(l.floor()),
            fmt_num(bo.floor()),
            fmt_num(r.ceil()),
            fmt_num(t.ceil())
        )?;
        writeln!(
            self.out,
            "%%HiResBoundingBox: {} {} {} {}",
            fmt_num(l),
            fmt_num(bo),
            fmt_num(r),
            fmt_num(t)
        )?;
        Ok(())
    }

    pub fn prologue(&mut self, b: &BBox) -> PictorResult<()> {
        self.header()?;
        self.bounding_box(b)?;
        self.line(concat!("%%Creator: pictor ", env!("CARGO_PKG_VERSION")))?;
        self.line("%%Pages: 1")?;
        self.line("%%EndComments")?;
        self.line("%%Page: 1 1")?;
        if self.for_pdf && !b.empty {
            writeln!(
                self.out,
                "<< /PageSize [{} {}] >> setpagedevice",
                fmt_num(b.width().ceil().max(1.0)),
                fmt_num(b.height().ceil().max(1.0))
            )?;
        }
        self.line("0 setgray 0 0.5 dtransform truncate idtransform setlinewidth pop")?;
        self.line("1 setlinecap 1 setlinejoin")?;
        Ok(())
    }

    pub fn epilogue(&mut self) -> PictorResult<()> {
        self.line("showpage")?;
        self.line("%%EOF")
    }

    /// Whether any drawing used alpha below one.
    pub fn transparency(&self) -> bool {
        self.transparency
    }

    /// Flush and hand back the underlying writer.
    pub fn close(mut self) -> PictorResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn point(&mut self, p: Point, op: &str) -> PictorResult<()> {
        writeln!(self.out, "{} {} {op}", fmt_num(p.x), fmt_num(p.y))?;
        Ok(())
    }
}

impl<W: Write> VectorSink for PsFile<W> {
    fn gsave(&mut self) -> PictorResult<()> {
        self.line("gsave")
    }

    fn grestore(&mut self) -> PictorResult<()> {
        // grestore brings back whatever pen the matching gsave saw.
        self.reset_pen();
        self.line("grestore")
    }

    fn translate(&mut self, by: Vec2) -> PictorResult<()> {
        if by == Vec2::ZERO {
            return Ok(());
        }
        writeln!(self.out, "{} {} translate", fmt_num(by.x), fmt_num(by.y))?;
        Ok(())
    }

    fn concat(&mut self, t: Affine) -> PictorResult<()> {
        let c = t.as_coeffs();
        writeln!(
            self.out,
            "[{} {} {} {} {} {}] concat",
            fmt_num(c[0]),
            fmt_num(c[1]),
            fmt_num(c[2]),
            fmt_num(c[3]),
            fmt_num(c[4]),
            fmt_num(c[5])
        )?;
        Ok(())
    }

    fn reset_pen(&mut self) {
        self.pen = PenState::default();
    }

    fn verbatim_line(&mut self, line: &str) -> PictorResult<()> {
        self.line(line)
    }

    fn set_color(&mut self, color: Rgb) -> PictorResult<()> {
        if self.pen.color == Some(color) {
            return Ok(());
        }
        self.pen.color = Some(color);
        if color.r == color.g && color.g == color.b {
            writeln!(self.out, "{} setgray", fmt_num(color.r))?;
        } else {
            writeln!(
                self.out,
                "{} {} {} setrgbcolor",
                fmt_num(color.r),
                fmt_num(color.g),
                fmt_num(color.b)
            )?;
        }
        Ok(())
    }

    fn set_line_width(&mut self, width: f64) -> PictorResult<()> {
        if self.pen.width == Some(width) {
            return Ok(());
        }
        self.pen.width = Some(width);
        writeln!(self.out, "{} setlinewidth", fmt_num(width))?;
        Ok(())
    }

    fn set_opacity(&mut self, opacity: f64) -> PictorResult<()> {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity < 1.0 {
            self.transparency = true;
        }
        if self.pen.opacity.unwrap_or(1.0) == opacity {
            return Ok(());
        }
        self.pen.opacity = Some(opacity);
        writeln!(self.out, "{} .setopacityalpha", fmt_num(opacity))?;
        Ok(())
    }

    fn path(&mut self, path: &BezPath) -> PictorResult<()> {
        self.line("newpath")?;
        let mut current = Point::ORIGIN;
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    self.point(p, "moveto")?;
                    current = p;
                }
                PathEl::LineTo(p) => {
                    self.point(p, "lineto")?;
                    current = p;
                }
                PathEl::QuadTo(p1, p2) => {
                    let c1 = current + (p1 - current) * (2.0 / 3.0);
                    let c2 = p2 + (p1 - p2) * (2.0 / 3.0);
                    self.curve(c1, c2, p2)?;
                    current = p2;
                }
                PathEl::CurveTo(c1, c2, p) => {
                    self.curve(c1, c2, p)?;
                    current = p;
                }
                PathEl::ClosePath => self.line("closepath")?,
            }
        }
        Ok(())
    }

    fn fill(&mut self, even_odd: bool) -> PictorResult<()> {
        self.line(if even_odd { "eofill" } else { "fill" })
    }

    fn stroke(&mut self) -> PictorResult<()> {
        self.line("stroke")
    }

    fn clip(&mut self, even_odd: bool) -> PictorResult<()> {
        self.line(if even_odd { "eoclip newpath" } else { "clip newpath" })
    }
}

impl<W: Write> PsFile<W> {
    fn curve(&mut self, c1: Point, c2: Point, p: Point) -> PictorResult<()> {
        writeln!(
            self.out,
            "{} {} {} {} {} {} curveto",
            fmt_num(c1.x),
            fmt_num(c1.y),
            fmt_num(c2.x),
            fmt_num(c2.y),
            fmt_num(p.x),
            fmt_num(p.y)
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/output/psfile.rs"]
mod tests;
