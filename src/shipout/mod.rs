//! Turning a [`Picture`] into output files.
//!
//! A shipout computes the bounds, picks an [`OutputTrack`], draws each layer to its own vector
//! file, runs the typesetting engine when labels are present, converts to the requested format
//! and finally shows the result in a viewer.

pub(crate) mod geometry;
mod pipeline;
pub(crate) mod postprocess;
pub(crate) mod temp;
mod texrun;
pub(crate) mod track;

pub use track::OutputTrack;

use crate::foundation::bbox::BBox;
use crate::foundation::error::PictorResult;
use crate::picture::Picture;
use crate::process::launcher::{ProcessLauncher, SystemLauncher};
use crate::process::viewer::{ViewOutcome, ViewerRegistry};
use crate::settings::Settings;
use crate::typeset::metrics::LabelMetrics;
use crate::typeset::texpipe::TexPipe;

/// Long-lived services a shipout needs: settings, the process launcher, running viewers and the
/// label metrics source.
///
/// Create one per program run and pass it to every shipout so viewers are reused.
pub struct ShipoutContext<L: ProcessLauncher = SystemLauncher> {
    settings: Settings,
    launcher: L,
    viewers: ViewerRegistry,
    metrics: Box<dyn LabelMetrics>,
}

impl ShipoutContext<SystemLauncher> {
    /// Context driving the real programs, measuring labels with a persistent engine.
    pub fn new(settings: Settings) -> Self {
        let metrics = Box::new(TexPipe::new(&settings));
        Self::with_launcher(settings, SystemLauncher::new(), metrics)
    }
}

impl<L: ProcessLauncher> ShipoutContext<L> {
    pub fn with_launcher(settings: Settings, launcher: L, metrics: Box<dyn LabelMetrics>) -> Self {
        Self {
            settings,
            launcher,
            viewers: ViewerRegistry::new(),
            metrics,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn launcher_mut(&mut self) -> &mut L {
        &mut self.launcher
    }

    pub fn viewers(&self) -> &ViewerRegistry {
        &self.viewers
    }

    pub fn metrics_mut(&mut self) -> &mut dyn LabelMetrics {
        &mut *self.metrics
    }
}

/// One shipout call.
#[derive(Clone, Copy, Debug)]
pub struct ShipoutRequest<'a> {
    /// Output prefix; `-` writes to standard output.
    pub prefix: &'a str,
    /// Output format; empty selects the configured default.
    pub format: &'a str,
    /// Positive for embedded objects.
    pub magnification: f64,
    /// Wait for the viewer to exit.
    pub wait: bool,
    /// Show the result (also requires the `view` setting).
    pub view: bool,
    /// PostScript drawn ahead of the first layer.
    pub preamble: Option<&'a Picture>,
}

impl<'a> ShipoutRequest<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self {
            prefix,
            format: "",
            magnification: 0.0,
            wait: false,
            view: true,
            preamble: None,
        }
    }

    pub fn format(mut self, format: &'a str) -> Self {
        self.format = format;
        self
    }

    pub fn magnification(mut self, magnification: f64) -> Self {
        self.magnification = magnification;
        self
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    pub fn view(mut self, view: bool) -> Self {
        self.view = view;
        self
    }

    pub fn preamble(mut self, preamble: &'a Picture) -> Self {
        self.preamble = Some(preamble);
        self
    }
}

/// What a successful shipout produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipoutReport {
    /// Final file name, `-` for standard output.
    pub outname: String,
    pub track: OutputTrack,
    /// Box the output was written for (the placeholder box for empty pictures).
    pub bbox: BBox,
    pub labels: bool,
    /// Number of layer files drawn.
    pub layers: usize,
    pub transparency: bool,
    pub view: Option<ViewOutcome>,
}

impl Picture {
    /// Ship the picture out. Failures are reported once and turn into `false`.
    pub fn shipout<L: ProcessLauncher>(
        &mut self,
        ctx: &mut ShipoutContext<L>,
        req: &ShipoutRequest<'_>,
    ) -> bool {
        match self.try_shipout(ctx, req) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "shipout failed");
                false
            }
        }
    }

    /// Like [`Picture::shipout`], returning the error instead of reporting it.
    #[tracing::instrument(skip_all, fields(prefix = req.prefix, format = req.format))]
    pub fn try_shipout<L: ProcessLauncher>(
        &mut self,
        ctx: &mut ShipoutContext<L>,
        req: &ShipoutRequest<'_>,
    ) -> PictorResult<ShipoutReport> {
        pipeline::ship(self, ctx, req)
    }
}
