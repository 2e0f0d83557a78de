//! The staged shipout: bounds, layer loop, typesetting, conversion.

use std::path::Path;

use crate::draw::node::NodeRef;
use crate::foundation::bbox::BBox;
use crate::foundation::error::{PictorError, PictorResult};
use crate::output::naming::{aux_name, build_name, out_name, space_to_underscore, strips_dir};
use crate::output::psfile::{PsFile, VectorSink};
use crate::output::texfile::{LabelSink, TexFile};
use crate::picture::Picture;
use crate::process::launcher::ProcessLauncher;
use crate::shipout::geometry::{bbox_shift, null_box, png_fuzz};
use crate::shipout::postprocess::{PostJob, epstopdf, postprocess};
use crate::shipout::temp::TempFiles;
use crate::shipout::texrun::{TexJob, texprocess};
use crate::shipout::track::OutputTrack;
use crate::shipout::{ShipoutContext, ShipoutReport, ShipoutRequest};

/// Draw and label-write failures seen during the layer loop.
#[derive(Debug, Default)]
struct Failures {
    count: usize,
    first: Option<PictorError>,
}

impl Failures {
    fn record(&mut self, result: PictorResult<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "node failed");
            self.count += 1;
            if self.first.is_none() {
                self.first = Some(e);
            }
        }
    }

    fn is_clean(&self) -> bool {
        self.count == 0
    }

    fn into_result(self) -> PictorResult<()> {
        match self.first {
            None => Ok(()),
            Some(e) if self.count == 1 => Err(e),
            Some(e) => Err(PictorError::draw(format!(
                "{} nodes failed, the first with: {e}",
                self.count
            ))),
        }
    }
}

fn file_part(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(name)
}

fn write_null(epsname: &str, b: &BBox) -> PictorResult<()> {
    let mut out = PsFile::open(epsname, false)?;
    out.prologue(b)?;
    out.epilogue()?;
    out.close()?;
    Ok(())
}

pub(crate) fn ship<L: ProcessLauncher>(
    pic: &mut Picture,
    ctx: &mut ShipoutContext<L>,
    req: &ShipoutRequest<'_>,
) -> PictorResult<ShipoutReport> {
    let ShipoutContext {
        settings,
        launcher,
        viewers,
        metrics,
    } = ctx;

    let mut b = pic.bounds(&mut **metrics);
    let engine = settings.tex;
    let inline = settings.inline_tex_mode();
    let labels = pic.has_labels(engine) || inline;
    let pdf_engine = engine.produces_pdf();

    let standard_out = req.prefix == "-";
    let prefix = if standard_out { "out" } else { req.prefix };
    let format = if req.format.is_empty() {
        settings.default_format()
    } else {
        req.format.to_string()
    };
    let eps_format = format == "eps";
    let pdf_format = format == "pdf";
    let xobject = req.magnification > 0.0;
    let strip = strips_dir(prefix, settings);

    let outname = out_name(prefix, &format, standard_out, settings);
    let epsname = match (eps_format, standard_out) {
        (true, true) => String::new(),
        (true, false) => outname.clone(),
        (false, _) => aux_name(prefix, "eps", strip),
    };
    let tex_prefix = if labels {
        space_to_underscore(prefix)
    } else {
        prefix.to_string()
    };
    let engine_output = labels && pdf_engine;
    let pre_format = if engine_output { "pdf" } else { "eps" };
    let prename = if engine_output {
        // Written by the engine, next to its document.
        aux_name(&tex_prefix, pre_format, strip)
    } else {
        epsname.clone()
    };
    let track = OutputTrack::select(&format, labels, pdf_engine);
    tracing::debug!(?track, %outname, %prename, labels, "shipout plan");

    let mut temps = TempFiles::new(settings.keep);

    if b.empty && !labels {
        let null = null_box(xobject);
        write_null(&epsname, &null)?;
        let job = PostJob {
            prename: &epsname,
            pre_format: "eps",
            outname: &outname,
            format: &format,
            track,
            page: null,
            empty: true,
            wait: req.wait,
            view: req.view,
        };
        let view = postprocess(settings, launcher, viewers, &mut temps, &job)?;
        return Ok(ShipoutReport {
            outname,
            track,
            bbox: null,
            labels,
            layers: 0,
            transparency: false,
            view,
        });
    }

    let png_xformat = xobject && settings.xformat == "png";
    if png_xformat {
        png_fuzz(&mut b, req.magnification);
    }

    let paper = settings.paper_dimensions();
    let shift = bbox_shift(&b, settings.align, pdf_format, settings.offset, paper);

    let texname = aux_name(&tex_prefix, "tex", strip);
    let mut tex = if labels {
        let mut t = TexFile::create(Path::new(&texname), engine, b, inline)?;
        t.prologue()?;
        if !inline {
            temps.track(&texname);
            temps.track(aux_name(&tex_prefix, "log", strip));
            temps.track(aux_name(&tex_prefix, "out", strip));
            if !settings.keep_aux {
                temps.track(aux_name(&tex_prefix, "aux", strip));
            }
        }
        Some(t)
    } else {
        None
    };

    let nodes: Vec<NodeRef> = pic.nodes().to_vec();
    let segments = pic.layer_segments(labels);
    let mut failures = Failures::default();
    let mut transparency = false;

    for (layer, segment) in segments.iter().enumerate() {
        let (psname, pdfname, bshift) = if labels {
            let base = format!("{tex_prefix}_{layer}");
            let pdfname = pdf_engine.then(|| build_name(&base, "pdf", "", strip));
            (build_name(&base, "eps", "", strip), pdfname, b)
        } else {
            (epsname.clone(), None, b.shifted(shift))
        };
        if labels && !inline {
            temps.track(&psname);
            if let Some(pdfname) = &pdfname {
                temps.track(pdfname);
            }
        }

        let mut out = PsFile::open(&psname, pdf_format)?;
        out.prologue(&bshift)?;
        if let Some(tex) = tex.as_mut() {
            tex.begin_layer(file_part(pdfname.as_deref().unwrap_or(&psname)))?;
        } else {
            out.gsave()?;
            out.translate(shift)?;
        }

        if layer == 0
            && let Some(preamble) = req.preamble
            && !preamble.is_empty()
        {
            out.reset_pen();
            for node in preamble.nodes() {
                failures.record(node.draw(&mut out));
            }
        }
        out.reset_pen();

        for node in &nodes[segment.clone()] {
            failures.record(node.draw(&mut out));
        }
        if tex.is_none() {
            out.grestore()?;
        }
        out.epilogue()?;
        transparency |= out.transparency();
        out.close()?;

        if let Some(tex) = tex.as_mut() {
            tex.reset_pen();
            if failures.is_clean()
                && !b.empty
                && let Some(pdfname) = &pdfname
            {
                failures.record(epstopdf(settings, launcher, &psname, pdfname, &b));
            }
            if failures.is_clean() {
                for node in &nodes[segment.clone()] {
                    failures.record(node.write(tex, &b));
                }
            }
            tex.end_layer()?;
        }
    }
    failures.into_result()?;

    let report = |view| ShipoutReport {
        outname: outname.clone(),
        track,
        bbox: b,
        labels,
        layers: segments.len(),
        transparency,
        view,
    };

    if let Some(mut tex) = tex {
        tex.epilogue()?;
        tex.close()?;
        if inline {
            tracing::info!(file = %texname, "wrote");
            return Ok(report(None));
        }
        let job = TexJob {
            texname: &texname,
            prefix: &tex_prefix,
            strip,
            prename: &prename,
            bbox: b,
            shift,
            transform: pic.transform(),
        };
        texprocess(settings, launcher, &mut temps, &job)?;
    }

    if xobject {
        if transparency && png_xformat {
            let pdfname = out_name(prefix, "pdf", standard_out, settings);
            epstopdf(settings, launcher, &prename, &pdfname, &b)?;
            tracing::info!(file = %pdfname, "wrote");
        }
        return Ok(report(None));
    }

    let job = PostJob {
        prename: &prename,
        pre_format,
        outname: &outname,
        format: &format,
        track,
        page: b,
        empty: b.empty,
        wait: req.wait,
        view: req.view,
    };
    let view = postprocess(settings, launcher, viewers, &mut temps, &job)?;
    Ok(report(view))
}
