//! Label measurement through a running typesetting engine.

use std::io::{BufReader, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::foundation::core::fmt_num;
use crate::foundation::error::{PictorError, PictorResult};
use crate::settings::{Settings, TexEngine};
use crate::typeset::metrics::{EstimatedMetrics, LabelExtent, LabelMetrics};

const PROMPT: &str = "\n*";
const PT_TO_BP: f64 = 72.0 / 72.27;

/// A long-running engine in `\scrollmode` that measures labels with `\showthe`.
///
/// Only `> <dimen>pt.` lines of the engine's terminal output are interpreted.
pub struct TexPipe {
    engine: TexEngine,
    program: String,
    keep: bool,
    proc: Option<PipeProc>,
}

struct PipeProc {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl TexPipe {
    pub fn new(settings: &Settings) -> Self {
        Self {
            engine: settings.tex,
            program: settings.tex_program().to_string(),
            keep: settings.keep,
            proc: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.proc.is_some()
    }

    fn proc_mut(&mut self) -> PictorResult<&mut PipeProc> {
        self.proc
            .as_mut()
            .ok_or_else(|| PictorError::validation("typesetting pipe is not running"))
    }

    fn send(&mut self, line: &str) -> PictorResult<String> {
        let proc = self.proc_mut()?;
        tracing::trace!(line, "tex pipe <-");
        proc.stdin.write_all(line.as_bytes())?;
        proc.stdin.write_all(b"\n")?;
        proc.stdin.flush()?;
        read_until_prompt(&mut proc.stdout)
    }

    fn measure_command(&self, text: &str, size: f64) -> String {
        let font = if self.engine.is_latex() {
            format!(
                "\\fontsize{{{}}}{{{}}}\\selectfont ",
                fmt_num(size),
                fmt_num(size * 1.2)
            )
        } else {
            String::new()
        };
        format!("\\setbox0\\hbox{{{font}{text}}}\\showthe\\wd0\\showthe\\ht0\\showthe\\dp0")
    }
}

fn read_until_prompt<R: Read>(r: &mut R) -> PictorResult<String> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = r.read(&mut byte)?;
        if n == 0 {
            return Err(PictorError::validation(format!(
                "typesetting engine exited unexpectedly: {}",
                String::from_utf8_lossy(&buf).trim()
            )));
        }
        buf.push(byte[0]);
        if buf.ends_with(PROMPT.as_bytes()) {
            return Ok(String::from_utf8_lossy(&buf).into_owned());
        }
    }
}

/// Dimensions reported by `\showthe`, converted to bp.
pub fn parse_shown_dimensions(output: &str) -> Vec<f64> {
    output
        .lines()
        .filter_map(|l| l.trim_end().strip_prefix("> "))
        .filter_map(|l| l.strip_suffix("pt."))
        .filter_map(|v| v.parse::<f64>().ok())
        .map(|pt| pt * PT_TO_BP)
        .collect()
}

impl LabelMetrics for TexPipe {
    fn engine(&self) -> TexEngine {
        self.engine
    }

    #[tracing::instrument(skip(self), fields(program = %self.program))]
    fn init(&mut self) -> PictorResult<()> {
        if self.proc.is_some() {
            return Ok(());
        }
        let mut child = Command::new(&self.program)
            .arg("\\scrollmode")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PictorError::Launch {
                tool: "tex".to_string(),
                description: format!("the {} engine", self.engine.name()),
                message: e.to_string(),
            })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PictorError::validation("failed to open engine stdin (unexpected)"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PictorError::validation("failed to open engine stdout (unexpected)"))?;
        let mut proc = PipeProc {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };
        read_until_prompt(&mut proc.stdout)?;
        self.proc = Some(proc);

        if self.engine.is_latex() {
            self.send("\\documentclass[12pt]{article}")?;
            self.send("\\begin{document}")?;
        } else {
            self.send("\\relax")?;
        }
        Ok(())
    }

    fn measure(&mut self, text: &str, size: f64) -> PictorResult<LabelExtent> {
        if self.engine.is_none() {
            return Ok(EstimatedMetrics::estimate(text, size));
        }
        self.init()?;
        let cmd = self.measure_command(text, size);
        let reply = self.send(&cmd)?;
        match parse_shown_dimensions(&reply)[..] {
            [width, height, depth, ..] => Ok(LabelExtent {
                width,
                height,
                depth,
            }),
            _ => Err(PictorError::validation(format!(
                "could not measure label '{text}': {}",
                reply.trim()
            ))),
        }
    }
}

impl Drop for TexPipe {
    fn drop(&mut self) {
        let Some(mut proc) = self.proc.take() else {
            return;
        };
        let _ = proc.stdin.write_all(b"\\end\n");
        let _ = proc.child.kill();
        let _ = proc.child.wait();
        if self.keep {
            return;
        }
        let mut leftovers = vec!["texput.log", "texput.out", "texput.aux"];
        if self.engine.produces_pdf() {
            leftovers.push("texput.pdf");
        }
        for f in leftovers {
            if let Err(e) = std::fs::remove_file(f)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(file = f, error = %e, "failed to remove engine leftover");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/typeset/texpipe.rs"]
mod tests;
