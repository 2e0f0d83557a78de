//! LaTeX and plain TeX documents carrying the labels.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::bbox::BBox;
use crate::foundation::core::{Point, Vec2, fmt_num};
use crate::foundation::error::PictorResult;
use crate::settings::TexEngine;

/// One label, positioned relative to the lower-left corner of the picture.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelPlacement<'a> {
    pub text: &'a str,
    pub at: Point,
    /// Direction the label is pushed away from `at`; zero centers it.
    pub align: Vec2,
    pub size: f64,
}

/// Receiver for layer structure and label output.
pub trait LabelSink {
    /// Start a layer whose graphics live in `include` (an EPS or PDF file).
    fn begin_layer(&mut self, include: &str) -> PictorResult<()>;
    fn end_layer(&mut self) -> PictorResult<()>;
    fn reset_pen(&mut self);
    fn put_label(&mut self, label: &LabelPlacement<'_>) -> PictorResult<()>;
}

/// Typesetting document that overlays labels on the layer graphics.
pub struct TexFile<W: Write> {
    out: W,
    engine: TexEngine,
    bbox: BBox,
    inline: bool,
    layers: usize,
    last_size: Option<f64>,
}

impl TexFile<BufWriter<File>> {
    pub fn create(path: &Path, engine: TexEngine, bbox: BBox, inline: bool) -> PictorResult<Self> {
        let f = File::create(path)
            .with_context(|| format!("create typesetting document '{}'", path.display()))?;
        Ok(Self::new(BufWriter::new(f), engine, bbox, inline))
    }
}

impl<W: Write> TexFile<W> {
    pub fn new(out: W, engine: TexEngine, bbox: BBox, inline: bool) -> Self {
        Self {
            out,
            engine,
            bbox,
            inline,
            layers: 0,
            last_size: None,
        }
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn prologue(&mut self) -> PictorResult<()> {
        let w = fmt_num(self.bbox.width());
        let h = fmt_num(self.bbox.height());
        if self.engine.is_latex() {
            if !self.inline {
                writeln!(self.out, "\\documentclass[12pt]{{article}}")?;
                writeln!(self.out, "\\usepackage{{graphicx}}")?;
                writeln!(self.out, "\\pagestyle{{empty}}")?;
                writeln!(self.out, "\\textheight=2048pt")?;
                writeln!(self.out, "\\textwidth=2048pt")?;
                writeln!(self.out, "\\begin{{document}}")?;
            }
            writeln!(
                self.out,
                "\\providecommand\\pictorlabel[4]{{\\put(#1,#2){{\\makebox(0,0)[#3]{{#4}}}}}}"
            )?;
            writeln!(self.out, "\\setlength{{\\unitlength}}{{1bp}}%")?;
            writeln!(self.out, "\\noindent\\begin{{picture}}({w},{h})%")?;
        } else {
            if !self.inline {
                writeln!(self.out, "\\input miniltx\\input graphicx\\resetatcatcode")?;
                writeln!(self.out, "\\nopagenumbers")?;
            }
            writeln!(
                self.out,
                "\\def\\pictorlabel#1#2#3#4{{\\rlap{{\\kern#1bp\\raise#2bp\\hbox{{#4}}}}}}"
            )?;
            writeln!(self.out, "\\hbox to {w}bp{{\\vbox to {h}bp{{\\vfil")?;
        }
        Ok(())
    }

    pub fn epilogue(&mut self) -> PictorResult<()> {
        self.close_picture()?;
        if !self.inline {
            if self.engine.is_latex() {
                writeln!(self.out, "\\end{{document}}")?;
            } else {
                writeln!(self.out, "\\bye")?;
            }
        }
        Ok(())
    }

    fn close_picture(&mut self) -> PictorResult<()> {
        if self.engine.is_latex() {
            writeln!(self.out, "\\end{{picture}}%")?;
        } else {
            writeln!(self.out, "}}\\hss}}")?;
        }
        Ok(())
    }

    pub fn close(mut self) -> PictorResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn makebox_position(align: Vec2) -> String {
    let mut pos = String::new();
    if align.x > 0.0 {
        pos.push('l');
    } else if align.x < 0.0 {
        pos.push('r');
    }
    if align.y > 0.0 {
        pos.push('b');
    } else if align.y < 0.0 {
        pos.push('t');
    }
    if pos.is_empty() {
        pos.push('c');
    }
    pos
}

impl<W: Write> LabelSink for TexFile<W> {
    fn begin_layer(&mut self, include: &str) -> PictorResult<()> {
        self.layers += 1;
        if self.engine.is_latex() {
            writeln!(self.out, "\\put(0,0){{\\includegraphics{{{include}}}}}%")?;
        } else {
            writeln!(self.out, "\\rlap{{\\includegraphics{{{include}}}}}%")?;
        }
        Ok(())
    }

    fn end_layer(&mut self) -> PictorResult<()> {
        writeln!(self.out, "% end of layer {}", self.layers)?;
        Ok(())
    }

    fn reset_pen(&mut self) {
        self.last_size = None;
    }

    fn put_label(&mut self, label: &LabelPlacement<'_>) -> PictorResult<()> {
        if self.engine.is_latex() && self.last_size != Some(label.size) {
            writeln!(
                self.out,
                "\\fontsize{{{}}}{{{}}}\\selectfont%",
                fmt_num(label.size),
                fmt_num(label.size * 1.2)
            )?;
            self.last_size = Some(label.size);
        }
        writeln!(
            self.out,
            "\\pictorlabel{{{}}}{{{}}}{{{}}}{{{}}}%",
            fmt_num(label.at.x),
            fmt_num(label.at.y),
            makebox_position(label.align),
            label.text
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/output/texfile.rs"]
mod tests;
