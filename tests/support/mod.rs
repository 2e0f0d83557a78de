#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kurbo::Shape as _;
use pictor::{
    EstimatedMetrics, NodeRef, PathNode, PictorError, PictorResult, ProcessHandle,
    ProcessLauncher, Rect, Rgb, RunOpts, RunOutcome, Settings, ShipoutContext, Signal,
    ToolCommand,
};

/// One recorded program start.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub key: String,
    pub program: String,
    pub args: Vec<String>,
    pub dir: Option<PathBuf>,
    pub quiet: bool,
    pub wait: bool,
}

/// Launcher that records every command and fakes the files each tool would write.
#[derive(Debug, Default)]
pub struct FakeLauncher {
    pub calls: Vec<Invocation>,
    pub signals: Vec<(ProcessHandle, Signal)>,
    pub waited: Vec<ProcessHandle>,
    /// Exit status per settings key; missing keys succeed.
    pub statuses: HashMap<String, i32>,
    /// Keys whose program cannot be started.
    pub missing: Vec<String>,
    /// Whether background processes report as exited.
    pub exited: bool,
    /// Signals fail as if the process were already gone.
    pub signal_fails: bool,
    next: u32,
}

pub const DVIPS_OUTPUT: &str = "%!PS-Adobe-2.0\n\
%%Creator: dvips(k)\n\
%%BoundingBox: 0 0 612 792\n\
%%DocumentPaperSizes: Letter\n\
%%EndComments\n\
TeXDict begin @defspecial\n\
%special\n\
@fedspecial end\n\
%%EOF\n";

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, key: &str, status: i32) -> Self {
        self.statuses.insert(key.to_string(), status);
        self
    }

    pub fn keys(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.key.as_str()).collect()
    }

    pub fn calls_for(&self, key: &str) -> Vec<&Invocation> {
        self.calls.iter().filter(|c| c.key == key).collect()
    }

    fn produce(&self, inv: &Invocation) {
        match inv.key.as_str() {
            "tex" => {
                let Some(file) = inv.args.last() else { return };
                let stem = Path::new(file)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let ext = if matches!(inv.program.as_str(), "latex" | "tex") {
                    "dvi"
                } else {
                    "pdf"
                };
                let dir = inv.dir.clone().unwrap_or_default();
                write(&dir.join(format!("{stem}.{ext}")), "fake engine output\n");
            }
            "dvips" => {
                if let Some(i) = inv.args.iter().position(|a| a == "-o") {
                    write(Path::new(&inv.args[i + 1]), DVIPS_OUTPUT);
                }
            }
            "gs" => {
                if let Some(out) = inv.args.iter().find_map(|a| a.strip_prefix("-sOutputFile=")) {
                    write(Path::new(out), "%PDF-1.4\n% fake\n");
                }
            }
            "convert" => {
                if let Some((_, out)) = inv.args.last().and_then(|a| a.split_once(':')) {
                    write(Path::new(out), "fake raster\n");
                }
            }
            _ => {}
        }
    }
}

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

impl ProcessLauncher for FakeLauncher {
    fn run(&mut self, cmd: &ToolCommand, opts: &RunOpts<'_>) -> PictorResult<RunOutcome> {
        if self.missing.iter().any(|k| k == opts.key) {
            return Err(PictorError::Launch {
                tool: opts.key.to_string(),
                description: opts.description.to_string(),
                message: "No such file or directory".to_string(),
            });
        }
        let inv = Invocation {
            key: opts.key.to_string(),
            program: cmd.program.clone(),
            args: cmd.args.clone(),
            dir: opts.dir.map(Path::to_path_buf),
            quiet: opts.quiet,
            wait: opts.wait,
        };
        let status = self.statuses.get(opts.key).copied().unwrap_or(0);
        if status == 0 {
            self.produce(&inv);
        }
        self.calls.push(inv);
        if !opts.wait {
            self.next += 1;
            return Ok(RunOutcome {
                status: 0,
                handle: Some(ProcessHandle(self.next)),
            });
        }
        Ok(RunOutcome {
            status,
            handle: None,
        })
    }

    fn wait(&mut self, handle: ProcessHandle) -> PictorResult<i32> {
        self.waited.push(handle);
        Ok(0)
    }

    fn try_wait(&mut self, _handle: ProcessHandle) -> PictorResult<Option<i32>> {
        Ok(self.exited.then_some(0))
    }

    fn signal(&mut self, handle: ProcessHandle, signal: Signal) -> PictorResult<()> {
        if self.signal_fails {
            return Err(PictorError::viewer(format!("unknown process {}", handle.0)));
        }
        self.signals.push((handle, signal));
        Ok(())
    }
}

/// Settings that keep every file inside the prefix's directory.
pub fn settings() -> Settings {
    Settings {
        global_write: true,
        ..Settings::default()
    }
}

pub fn context(settings: Settings) -> ShipoutContext<FakeLauncher> {
    let metrics = Box::new(EstimatedMetrics::new(settings.tex));
    ShipoutContext::with_launcher(settings, FakeLauncher::new(), metrics)
}

pub fn prefix(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> NodeRef {
    PathNode::fill(Rect::new(x0, y0, x1, y1).to_path(0.1), Rgb::BLACK).into_node()
}

pub fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("read {}: {e}", path.as_ref().display()))
}

pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
