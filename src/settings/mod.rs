//! Shipout configuration.
//!
//! Every field has a default, so a settings file only needs the keys it changes.

mod engine;

pub use engine::{Align, PaperType, TexEngine};

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::Vec2;
use crate::foundation::error::{PictorError, PictorResult};

/// Names (or paths) of the external programs the pipeline drives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Programs {
    /// Overrides the engine's own program name.
    pub tex: Option<String>,
    pub dvips: String,
    pub gs: String,
    pub convert: String,
    pub psviewer: String,
    pub pdfviewer: String,
    pub display: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            tex: None,
            dvips: "dvips".to_string(),
            gs: "gs".to_string(),
            convert: "convert".to_string(),
            psviewer: "gv".to_string(),
            pdfviewer: "acroread".to_string(),
            display: "display".to_string(),
        }
    }
}

/// All options consulted by bounds computation and shipout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output format; empty selects [`Settings::default_format`].
    pub outformat: String,
    pub tex: TexEngine,
    /// Write the typesetting document for inclusion elsewhere instead of running the engine.
    pub inline_tex: bool,
    pub paper_type: PaperType,
    pub paper_width: Option<f64>,
    pub paper_height: Option<f64>,
    pub align: Align,
    /// Extra shift applied to non-PDF output, in bp.
    pub offset: Vec2,
    /// Keep every intermediate file.
    pub keep: bool,
    /// Keep the engine's `.aux` file even when `keep` is off.
    pub keep_aux: bool,
    /// Run the engine twice (cross references).
    pub twice: bool,
    /// Pass `-dSAFER` to Ghostscript.
    pub safe: bool,
    pub autorotate: bool,
    pub antialias: bool,
    /// Supersampling factor for raster conversion; density is `expand * 72`.
    pub expand: f64,
    /// Interactive session: viewers are polled without blocking.
    pub interactive: bool,
    /// Launch a viewer after a successful shipout.
    pub view: bool,
    pub verbose: u8,
    /// Allow writing outside the working directory.
    pub global_write: bool,
    /// Configured output name; a prefix equal to it keeps its directory.
    pub outname: String,
    /// Format for embedded objects (`pdf` or `png`).
    pub xformat: String,
    pub dvips_options: String,
    pub gs_options: String,
    pub programs: Programs,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            outformat: String::new(),
            tex: TexEngine::Latex,
            inline_tex: false,
            paper_type: PaperType::Letter,
            paper_width: None,
            paper_height: None,
            align: Align::Center,
            offset: Vec2::ZERO,
            keep: false,
            keep_aux: false,
            twice: false,
            safe: true,
            autorotate: false,
            antialias: false,
            expand: 2.0,
            interactive: false,
            view: false,
            verbose: 0,
            global_write: false,
            outname: String::new(),
            xformat: "pdf".to_string(),
            dvips_options: String::new(),
            gs_options: String::new(),
            programs: Programs::default(),
        }
    }
}

impl Settings {
    pub fn from_json_str(s: &str) -> PictorResult<Self> {
        let settings: Settings = serde_json::from_str(s)
            .map_err(|e| PictorError::config(format!("invalid settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: &Path) -> PictorResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> PictorResult<()> {
        if !(self.expand.is_finite() && self.expand > 0.0) {
            return Err(PictorError::config("expand must be a positive number"));
        }
        let (w, h) = self.paper_dimensions();
        if !(w.is_finite() && w > 0.0 && h.is_finite() && h > 0.0) {
            return Err(PictorError::config(format!(
                "paper dimensions must be positive, got {w}x{h}"
            )));
        }
        if !matches!(self.xformat.as_str(), "pdf" | "png") {
            return Err(PictorError::config(format!(
                "xformat must be 'pdf' or 'png', got '{}'",
                self.xformat
            )));
        }
        Ok(())
    }

    /// Paper size in bp; explicit width/height override the named type.
    pub fn paper_dimensions(&self) -> (f64, f64) {
        let (w, h) = self.paper_type.dimensions();
        (self.paper_width.unwrap_or(w), self.paper_height.unwrap_or(h))
    }

    /// Program that runs the configured engine.
    pub fn tex_program(&self) -> &str {
        self.programs
            .tex
            .as_deref()
            .unwrap_or_else(|| self.tex.name())
    }

    /// Format of the files the drawing stage produces before conversion.
    pub fn native_format(&self) -> &'static str {
        if self.tex.produces_pdf() { "pdf" } else { "eps" }
    }

    pub fn default_format(&self) -> String {
        if self.outformat.is_empty() {
            self.native_format().to_string()
        } else {
            self.outformat.clone()
        }
    }

    /// Labels are typeset inline and never run through the engine.
    pub fn inline_tex_mode(&self) -> bool {
        self.inline_tex && !self.tex.is_none()
    }

    /// Tool output is suppressed at low verbosity.
    pub fn quiet(&self) -> bool {
        self.verbose <= 1
    }
}

#[cfg(test)]
#[path = "../../tests/unit/settings/settings.rs"]
mod tests;
