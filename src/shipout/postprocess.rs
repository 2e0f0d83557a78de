//! Final conversion of the pre-final file and viewer handling.

use anyhow::Context as _;

use crate::foundation::bbox::BBox;
use crate::foundation::core::fmt_num;
use crate::foundation::error::{PictorError, PictorResult};
use crate::process::launcher::{ProcessLauncher, RunOpts, ToolCommand};
use crate::process::viewer::{ViewOutcome, ViewRequest, ViewerRegistry};
use crate::settings::Settings;
use crate::shipout::temp::TempFiles;
use crate::shipout::track::OutputTrack;

/// Run `cmd` to completion; a nonzero exit is a [`PictorError::ToolInvocation`].
pub(crate) fn run_tool<L: ProcessLauncher + ?Sized>(
    launcher: &mut L,
    cmd: &ToolCommand,
    opts: &RunOpts<'_>,
) -> PictorResult<()> {
    let outcome = launcher.run(cmd, opts)?;
    if outcome.status != 0 {
        return Err(PictorError::tool(opts.key, outcome.status));
    }
    Ok(())
}

/// Distill `epsname` into `pdfname` with Ghostscript; `b` sizes the device.
pub(crate) fn epstopdf<L: ProcessLauncher + ?Sized>(
    settings: &Settings,
    launcher: &mut L,
    epsname: &str,
    pdfname: &str,
    b: &BBox,
) -> PictorResult<()> {
    let (paper_width, paper_height) = settings.paper_dimensions();
    let mut cmd = ToolCommand::new(&settings.programs.gs)
        .arg("-q")
        .arg("-dNOPAUSE")
        .arg("-dBATCH")
        .arg("-sDEVICE=pdfwrite")
        .arg("-dEPSCrop")
        .arg("-dSubsetFonts=true")
        .arg("-dEmbedAllFonts=true")
        .arg("-dMaxSubsetPct=100")
        .arg("-dPDFSETTINGS=/prepress")
        .arg("-dCompatibilityLevel=1.4");
    if settings.safe {
        cmd = cmd.arg("-dSAFER");
    }
    if !settings.autorotate {
        cmd = cmd.arg("-dAutoRotatePages=/None");
    }
    let cmd = cmd
        .arg(format!(
            "-g{}x{}",
            fmt_num(paper_width.ceil().max(1.0)),
            fmt_num(paper_height.ceil().max(1.0))
        ))
        .arg(format!("-dDEVICEWIDTHPOINTS={}", fmt_num(b.width().max(3.0))))
        .arg(format!("-dDEVICEHEIGHTPOINTS={}", fmt_num(b.height().max(3.0))))
        .options(&settings.gs_options)
        .arg(format!("-sOutputFile={pdfname}"))
        .arg(epsname);
    run_tool(launcher, &cmd, &RunOpts::waiting("gs", "Ghostscript"))
}

fn convert<L: ProcessLauncher + ?Sized>(
    settings: &Settings,
    launcher: &mut L,
    job: &PostJob<'_>,
) -> PictorResult<()> {
    let res = fmt_num(settings.expand * 72.0);
    let cmd = ToolCommand::new(&settings.programs.convert)
        .arg("-density")
        .arg(format!("{res}x{res}"))
        .arg(if settings.antialias {
            "-antialias"
        } else {
            "+antialias"
        })
        .arg("-geometry")
        .arg(format!("{}%x", fmt_num(100.0 / settings.expand)))
        .arg(format!("{}:{}", job.pre_format, job.prename))
        .arg(format!("{}:{}", job.format, job.outname));
    run_tool(launcher, &cmd, &RunOpts::waiting("convert", "ImageMagick"))
}

/// Inputs of the postprocess stage.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PostJob<'a> {
    pub prename: &'a str,
    /// Format of `prename` (`eps` or `pdf`).
    pub pre_format: &'a str,
    pub outname: &'a str,
    pub format: &'a str,
    pub track: OutputTrack,
    /// Box used to size distilled pages.
    pub page: BBox,
    /// The picture itself had no extent.
    pub empty: bool,
    pub wait: bool,
    pub view: bool,
}

/// Convert the pre-final file into the output, then show it.
pub(crate) fn postprocess<L: ProcessLauncher + ?Sized>(
    settings: &Settings,
    launcher: &mut L,
    viewers: &mut ViewerRegistry,
    temps: &mut TempFiles,
    job: &PostJob<'_>,
) -> PictorResult<Option<ViewOutcome>> {
    if job.track.converts() {
        temps.track(job.prename);
        match job.track {
            OutputTrack::RenameFromEngine => std::fs::rename(job.prename, job.outname)
                .with_context(|| format!("rename '{}' to '{}'", job.prename, job.outname))?,
            OutputTrack::Distill => {
                epstopdf(settings, launcher, job.prename, job.outname, &job.page)?
            }
            OutputTrack::Convert => convert(settings, launcher, job)?,
            OutputTrack::EpsDirect | OutputTrack::EpsLabels => {}
        }
    }
    tracing::info!(file = job.outname, "wrote");

    if !(settings.view && job.view) {
        return Ok(None);
    }

    let pdf = job.format == "pdf";
    if pdf || job.format == "eps" {
        let (viewer, key, description) = if pdf {
            (&settings.programs.pdfviewer, "pdfviewer", "your PDF viewer")
        } else {
            (&settings.programs.psviewer, "psviewer", "your PostScript viewer")
        };
        let req = ViewRequest {
            outname: job.outname,
            viewer,
            key,
            description,
            pdf,
            empty: job.empty,
            interactive: settings.interactive,
            wait: job.wait,
        };
        return viewers.show(launcher, &req).map(Some);
    }

    let description = format!("your {} viewer", job.format);
    let cmd = ToolCommand::new(&settings.programs.display).arg(job.outname);
    let opts = RunOpts::waiting("display", &description).wait(job.wait);
    run_tool(launcher, &cmd, &opts).map_err(|e| match e {
        PictorError::Launch { .. } => PictorError::viewer(e.to_string()),
        other => other,
    })?;
    Ok(Some(ViewOutcome::Launched))
}
