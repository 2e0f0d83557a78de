//! Running the typesetting engine over the label document, and dvips after it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::bbox::BBox;
use crate::foundation::core::{Affine, Vec2, fmt_num};
use crate::foundation::error::{PictorError, PictorResult};
use crate::output::filter::filter_dvips_output;
use crate::output::naming::aux_name;
use crate::output::psfile::PsFile;
use crate::process::launcher::{ProcessLauncher, RunOpts, ToolCommand};
use crate::settings::Settings;
use crate::shipout::geometry::dvips_offsets;
use crate::shipout::postprocess::run_tool;
use crate::shipout::temp::TempFiles;

pub(crate) struct TexJob<'a> {
    pub texname: &'a str,
    /// Prefix the auxiliary names are built from.
    pub prefix: &'a str,
    pub strip: bool,
    /// File the dvips output is filtered into.
    pub prename: &'a str,
    pub bbox: BBox,
    pub shift: Vec2,
    /// Accumulated transform of the picture.
    pub transform: Affine,
}

/// Typeset `job.texname`. On failure a quiet run is repeated in `\scrollmode` so the engine's
/// diagnostics reach the user; the result is still a failure.
#[tracing::instrument(skip_all, fields(texname = job.texname))]
pub(crate) fn texprocess<L: ProcessLauncher + ?Sized>(
    settings: &Settings,
    launcher: &mut L,
    temps: &mut TempFiles,
    job: &TexJob<'_>,
) -> PictorResult<()> {
    let path = Path::new(job.texname);
    if !path.is_file() {
        return Err(PictorError::validation(format!(
            "typesetting document '{}' is missing",
            job.texname
        )));
    }
    // The engine writes its output next to the document.
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| job.texname.to_string());

    let program = settings.tex_program();
    let description = format!("the {} engine", settings.tex.name());
    let quiet = settings.quiet();
    let opts = RunOpts::waiting("tex", &description)
        .quiet(quiet)
        .in_dir(dir);
    let cmd = ToolCommand::new(program)
        .arg("\\nonstopmode\\input")
        .arg(&file);

    let mut status = launcher.run(&cmd, &opts)?.status;
    if status == 0 && settings.twice {
        status = launcher.run(&cmd, &opts)?.status;
    }
    if status != 0 {
        if quiet {
            let rerun = ToolCommand::new(program)
                .arg("\\scrollmode\\input")
                .arg(&file);
            if let Err(e) = launcher.run(&rerun, &opts.quiet(false)) {
                tracing::warn!(error = %e, "diagnostic rerun failed");
            }
        }
        return Err(PictorError::tool("tex", status));
    }

    if !settings.tex.produces_pdf() {
        dvips(settings, launcher, temps, job)?;
    }
    Ok(())
}

fn dvips<L: ProcessLauncher + ?Sized>(
    settings: &Settings,
    launcher: &mut L,
    temps: &mut TempFiles,
    job: &TexJob<'_>,
) -> PictorResult<()> {
    let dviname = aux_name(job.prefix, "dvi", job.strip);
    let psname = aux_name(job.prefix, "ps", job.strip);
    temps.track(&dviname);
    temps.track(&psname);

    let (paper_width, paper_height) = settings.paper_dimensions();
    let (hoffset, voffset) =
        dvips_offsets(&job.bbox, job.shift, paper_height, settings.tex.is_latex());
    let mut cmd = ToolCommand::new(&settings.programs.dvips)
        .arg("-R")
        .arg("-Pdownload35")
        .arg("-D600")
        .arg("-O")
        .arg(format!("{}bp,{}bp", fmt_num(hoffset), fmt_num(voffset)))
        .arg("-T")
        .arg(format!(
            "{}bp,{}bp",
            fmt_num(paper_width),
            fmt_num(paper_height)
        ))
        .options(&settings.dvips_options);
    if settings.quiet() {
        cmd = cmd.arg("-q");
    }
    let cmd = cmd.arg("-o").arg(&psname).arg(&dviname);
    run_tool(launcher, &cmd, &RunOpts::waiting("dvips", "dvips"))?;

    let input = File::open(&psname).with_context(|| format!("open dvips output '{psname}'"))?;
    let mut out = PsFile::open(job.prename, false)?;
    let shifted = job.bbox.shifted(job.shift);
    filter_dvips_output(
        BufReader::new(input),
        &mut out,
        &shifted,
        Affine::translate(job.shift) * job.transform,
    )?;
    out.close()?;
    Ok(())
}
