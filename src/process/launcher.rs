//! Running the external programs the pipeline drives.
//!
//! Only exit statuses are observed; tool output is never parsed here.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::foundation::error::{PictorError, PictorResult};

/// Program plus arguments, passed to the OS without a shell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append whitespace-separated user options (e.g. `dvips_options`).
    pub fn options(mut self, options: &str) -> Self {
        self.args
            .extend(options.split_whitespace().map(str::to_string));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.program)?;
        for a in &self.args {
            write!(f, " '{a}'")?;
        }
        Ok(())
    }
}

/// How a command is run and how failures are described.
#[derive(Clone, Copy, Debug)]
pub struct RunOpts<'a> {
    /// Discard the program's standard output and error.
    pub quiet: bool,
    /// Block until the program exits.
    pub wait: bool,
    /// Settings key naming the program (`tex`, `dvips`, `gs`, ...).
    pub key: &'a str,
    /// Human readable program description for error messages.
    pub description: &'a str,
    /// Working directory; the caller's when `None`.
    pub dir: Option<&'a Path>,
}

impl<'a> RunOpts<'a> {
    pub fn waiting(key: &'a str, description: &'a str) -> Self {
        Self {
            quiet: false,
            wait: true,
            key,
            description,
            dir: None,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    pub fn in_dir(mut self, dir: Option<&'a Path>) -> Self {
        self.dir = dir;
        self
    }
}

/// Opaque identifier of a process started without waiting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcessHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Ask the process to reread its input.
    Hangup,
    Interrupt,
}

/// Result of [`ProcessLauncher::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit status when waited for, `0` for a process left running.
    pub status: i32,
    /// Present when the process was left running.
    pub handle: Option<ProcessHandle>,
}

/// Process launching and supervision as seen by the pipeline.
pub trait ProcessLauncher {
    /// Start `cmd`. A program that cannot be started at all yields [`PictorError::Launch`].
    fn run(&mut self, cmd: &ToolCommand, opts: &RunOpts<'_>) -> PictorResult<RunOutcome>;

    /// Block until `handle` exits and return its status.
    fn wait(&mut self, handle: ProcessHandle) -> PictorResult<i32>;

    /// Exit status if `handle` has exited, without blocking.
    fn try_wait(&mut self, handle: ProcessHandle) -> PictorResult<Option<i32>>;

    fn signal(&mut self, handle: ProcessHandle, signal: Signal) -> PictorResult<()>;
}

/// Launcher backed by [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemLauncher {
    children: HashMap<u32, Child>,
}

impl SystemLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    fn child(&mut self, handle: ProcessHandle) -> PictorResult<&mut Child> {
        self.children
            .get_mut(&handle.0)
            .ok_or_else(|| PictorError::viewer(format!("unknown process {}", handle.0)))
    }
}

fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

impl ProcessLauncher for SystemLauncher {
    fn run(&mut self, cmd: &ToolCommand, opts: &RunOpts<'_>) -> PictorResult<RunOutcome> {
        tracing::debug!(command = %cmd, wait = opts.wait, "running");
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(dir) = opts.dir {
            command.current_dir(dir);
        }
        if opts.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        let mut child = command.spawn().map_err(|e| PictorError::Launch {
            tool: opts.key.to_string(),
            description: opts.description.to_string(),
            message: e.to_string(),
        })?;

        if opts.wait {
            let status = child.wait().map_err(|e| {
                PictorError::Other(anyhow::anyhow!("failed to wait for {}: {e}", cmd.program))
            })?;
            return Ok(RunOutcome {
                status: exit_code(status),
                handle: None,
            });
        }

        let handle = ProcessHandle(child.id());
        self.children.insert(handle.0, child);
        Ok(RunOutcome {
            status: 0,
            handle: Some(handle),
        })
    }

    fn wait(&mut self, handle: ProcessHandle) -> PictorResult<i32> {
        let mut child = self
            .children
            .remove(&handle.0)
            .ok_or_else(|| PictorError::viewer(format!("unknown process {}", handle.0)))?;
        Ok(exit_code(child.wait()?))
    }

    fn try_wait(&mut self, handle: ProcessHandle) -> PictorResult<Option<i32>> {
        let exited = self.child(handle)?.try_wait()?;
        if exited.is_some() {
            self.children.remove(&handle.0);
        }
        Ok(exited.map(exit_code))
    }

    fn signal(&mut self, handle: ProcessHandle, signal: Signal) -> PictorResult<()> {
        let child = self.child(handle)?;
        send_signal(child, signal)
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn send_signal(child: &mut Child, signal: Signal) -> PictorResult<()> {
    let sig = match signal {
        Signal::Hangup => libc::SIGHUP,
        Signal::Interrupt => libc::SIGINT,
    };
    let pid = libc::pid_t::try_from(child.id())
        .map_err(|_| PictorError::viewer(format!("process id {} out of range", child.id())))?;
    // SAFETY: `pid` names a child we spawned and have not reaped yet.
    let rc = unsafe { libc::kill(pid, sig) };
    if rc == -1 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

#[cfg(not(unix))]
fn send_signal(child: &mut Child, signal: Signal) -> PictorResult<()> {
    match signal {
        Signal::Interrupt => Ok(child.kill()?),
        Signal::Hangup => Err(PictorError::viewer(
            "reload signals are not supported on this platform",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/process/launcher.rs"]
mod tests;
