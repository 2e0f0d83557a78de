//! Tracking of running viewers so repeated shipouts refresh instead of spawning again.

use std::collections::HashMap;
use std::path::Path;

use crate::foundation::error::{PictorError, PictorResult};
use crate::process::launcher::{ProcessHandle, ProcessLauncher, RunOpts, Signal, ToolCommand};

/// What to do with a viewer that is still showing a file that was just rewritten.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// The viewer rereads the file on this signal.
    Signal(Signal),
    /// Interrupt the viewer, wait for it, then start a new one.
    Relaunch,
    /// Leave the viewer alone.
    Keep,
}

impl ReloadPolicy {
    /// `gv` rereads on hangup. PDF viewers cannot reload in place, so they are restarted, but
    /// only when there is something to show.
    pub fn for_viewer(viewer: &str, pdf: bool, empty: bool) -> Self {
        let name = Path::new(viewer)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(viewer);
        if name == "gv" {
            Self::Signal(Signal::Hangup)
        } else if pdf && !empty {
            Self::Relaunch
        } else {
            Self::Keep
        }
    }
}

/// What [`ViewerRegistry::show`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewOutcome {
    Launched,
    Signalled,
    Relaunched,
    Unchanged,
}

/// Parameters of a view request.
#[derive(Clone, Copy, Debug)]
pub struct ViewRequest<'a> {
    pub outname: &'a str,
    pub viewer: &'a str,
    /// Settings key of the viewer program.
    pub key: &'a str,
    pub description: &'a str,
    pub pdf: bool,
    /// The shipped picture had an empty bounding box.
    pub empty: bool,
    pub interactive: bool,
    /// Block until the viewer exits.
    pub wait: bool,
}

/// Output file name -> viewer process showing it.
///
/// Lives as long as the [`crate::ShipoutContext`] that owns it; entries are replaced when a
/// viewer is relaunched.
#[derive(Debug, Default)]
pub struct ViewerRegistry {
    viewers: HashMap<String, ProcessHandle>,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<ProcessHandle> {
        self.viewers.get(name).copied()
    }

    pub fn register(&mut self, name: impl Into<String>, handle: ProcessHandle) {
        self.viewers.insert(name.into(), handle);
    }

    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    /// Never blocks. Interactive sessions need a positive "still running" answer; batch sessions
    /// count a viewer as running unless it is known to have exited, and one that vanished later
    /// shows up as a failed signal and is started again.
    pub fn is_alive<L: ProcessLauncher + ?Sized>(
        &self,
        handle: ProcessHandle,
        launcher: &mut L,
        interactive: bool,
    ) -> bool {
        match launcher.try_wait(handle) {
            Ok(None) => true,
            Ok(Some(_)) => false,
            Err(_) => !interactive,
        }
    }

    /// Refresh the viewer already showing `req.outname`, or start one.
    #[tracing::instrument(skip(self, launcher, req), fields(outname = req.outname, viewer = req.viewer))]
    pub fn show<L: ProcessLauncher + ?Sized>(
        &mut self,
        launcher: &mut L,
        req: &ViewRequest<'_>,
    ) -> PictorResult<ViewOutcome> {
        let mut outcome = ViewOutcome::Launched;
        if let Some(handle) = self.lookup(req.outname)
            && self.is_alive(handle, launcher, req.interactive)
        {
            match ReloadPolicy::for_viewer(req.viewer, req.pdf, req.empty) {
                ReloadPolicy::Keep => return Ok(ViewOutcome::Unchanged),
                ReloadPolicy::Signal(sig) => match launcher.signal(handle, sig) {
                    Ok(()) => return Ok(ViewOutcome::Signalled),
                    Err(e) => {
                        tracing::warn!(error = %e, "could not signal viewer; starting a new one");
                    }
                },
                ReloadPolicy::Relaunch => match launcher.signal(handle, Signal::Interrupt) {
                    Ok(()) => {
                        if let Err(e) = launcher.wait(handle) {
                            tracing::debug!(error = %e, "viewer status unavailable");
                        }
                        outcome = ViewOutcome::Relaunched;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "could not stop viewer; starting a new one");
                    }
                },
            }
        }

        let cmd = ToolCommand::new(req.viewer).arg(req.outname);
        let opts = RunOpts::waiting(req.key, req.description).wait(req.wait);
        let run = launcher.run(&cmd, &opts).map_err(|e| match e {
            PictorError::Launch { .. } => PictorError::viewer(e.to_string()),
            other => other,
        })?;
        if let Some(handle) = run.handle {
            self.register(req.outname, handle);
        }
        if run.status != 0 {
            return Err(PictorError::tool(req.key, run.status));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/process/viewer.rs"]
mod tests;
