use super::*;
use crate::process::launcher::RunOutcome;

#[derive(Default)]
struct Fake {
    spawned: Vec<ToolCommand>,
    signals: Vec<(ProcessHandle, Signal)>,
    waited: Vec<ProcessHandle>,
    exited: bool,
    next: u32,
    fail_spawn: bool,
    fail_signal: bool,
}

impl ProcessLauncher for Fake {
    fn run(&mut self, cmd: &ToolCommand, opts: &RunOpts<'_>) -> PictorResult<RunOutcome> {
        if self.fail_spawn {
            return Err(PictorError::Launch {
                tool: opts.key.to_string(),
                description: opts.description.to_string(),
                message: "not found".to_string(),
            });
        }
        self.spawned.push(cmd.clone());
        self.next += 1;
        Ok(RunOutcome {
            status: 0,
            handle: (!opts.wait).then_some(ProcessHandle(self.next)),
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
        if self.fail_signal {
            return Err(PictorError::viewer(format!("unknown process {}", handle.0)));
        }
        self.signals.push((handle, signal));
        Ok(())
    }
}

fn request<'a>(viewer: &'a str, pdf: bool) -> ViewRequest<'a> {
    ViewRequest {
        outname: "out.eps",
        viewer,
        key: "psviewer",
        description: "your PostScript viewer",
        pdf,
        empty: false,
        interactive: true,
        wait: false,
    }
}

#[test]
fn reload_policy_depends_on_viewer_and_content() {
    assert_eq!(
        ReloadPolicy::for_viewer("gv", false, false),
        ReloadPolicy::Signal(Signal::Hangup)
    );
    assert_eq!(
        ReloadPolicy::for_viewer("/usr/bin/gv", true, true),
        ReloadPolicy::Signal(Signal::Hangup)
    );
    assert_eq!(ReloadPolicy::for_viewer("acroread", true, false), ReloadPolicy::Relaunch);
    assert_eq!(ReloadPolicy::for_viewer("acroread", true, true), ReloadPolicy::Keep);
    assert_eq!(ReloadPolicy::for_viewer("evince", false, false), ReloadPolicy::Keep);
}

#[test]
fn second_view_signals_instead_of_spawning() {
    let mut reg = ViewerRegistry::new();
    let mut fake = Fake::default();
    let req = request("gv", false);

    assert_eq!(reg.show(&mut fake, &req).unwrap(), ViewOutcome::Launched);
    assert_eq!(reg.show(&mut fake, &req).unwrap(), ViewOutcome::Signalled);
    assert_eq!(fake.spawned.len(), 1);
    assert_eq!(fake.signals, [(ProcessHandle(1), Signal::Hangup)]);
    assert_eq!(fake.spawned[0].args, ["out.eps"]);
    assert_eq!(reg.lookup("out.eps"), Some(ProcessHandle(1)));
}

#[test]
fn pdf_viewer_is_relaunched() {
    let mut reg = ViewerRegistry::new();
    let mut fake = Fake::default();
    let req = ViewRequest {
        outname: "out.pdf",
        key: "pdfviewer",
        ..request("acroread", true)
    };

    reg.show(&mut fake, &req).unwrap();
    assert_eq!(reg.show(&mut fake, &req).unwrap(), ViewOutcome::Relaunched);
    assert_eq!(fake.signals, [(ProcessHandle(1), Signal::Interrupt)]);
    assert_eq!(fake.waited, [ProcessHandle(1)]);
    assert_eq!(fake.spawned.len(), 2);
    assert_eq!(reg.lookup("out.pdf"), Some(ProcessHandle(2)));
    assert_eq!(reg.len(), 1);
}

#[test]
fn pdf_viewer_is_left_alone_for_empty_output() {
    let mut reg = ViewerRegistry::new();
    let mut fake = Fake::default();
    let req = ViewRequest {
        empty: true,
        ..request("acroread", true)
    };
    reg.show(&mut fake, &req).unwrap();
    assert_eq!(reg.show(&mut fake, &req).unwrap(), ViewOutcome::Unchanged);
    assert_eq!(fake.spawned.len(), 1);
    assert!(fake.signals.is_empty());
}

#[test]
fn exited_viewer_is_started_again() {
    let mut reg = ViewerRegistry::new();
    let mut fake = Fake::default();
    let req = request("gv", false);
    reg.show(&mut fake, &req).unwrap();
    fake.exited = true;
    assert_eq!(reg.show(&mut fake, &req).unwrap(), ViewOutcome::Launched);
    assert_eq!(fake.spawned.len(), 2);
    assert!(fake.signals.is_empty());
}

#[test]
fn batch_mode_reloads_without_blocking() {
    let mut reg = ViewerRegistry::new();
    let mut fake = Fake::default();
    let req = ViewRequest {
        interactive: false,
        ..request("gv", false)
    };
    reg.show(&mut fake, &req).unwrap();
    assert_eq!(reg.show(&mut fake, &req).unwrap(), ViewOutcome::Signalled);
    assert!(fake.waited.is_empty());
    assert_eq!(fake.spawned.len(), 1);
    assert_eq!(fake.signals, [(ProcessHandle(1), Signal::Hangup)]);
}

#[test]
fn batch_mode_restarts_a_viewer_known_to_have_exited() {
    let mut reg = ViewerRegistry::new();
    let mut fake = Fake::default();
    let req = ViewRequest {
        interactive: false,
        ..request("gv", false)
    };
    reg.show(&mut fake, &req).unwrap();
    fake.exited = true;
    assert_eq!(reg.show(&mut fake, &req).unwrap(), ViewOutcome::Launched);
    assert!(fake.waited.is_empty());
    assert_eq!(fake.spawned.len(), 2);
}

#[test]
fn vanished_pdf_viewer_is_started_fresh() {
    let mut reg = ViewerRegistry::new();
    let mut fake = Fake::default();
    let req = ViewRequest {
        outname: "out.pdf",
        key: "pdfviewer",
        ..request("acroread", true)
    };
    reg.show(&mut fake, &req).unwrap();
    fake.fail_signal = true;
    assert_eq!(reg.show(&mut fake, &req).unwrap(), ViewOutcome::Launched);
    assert!(fake.waited.is_empty());
    assert_eq!(fake.spawned.len(), 2);
    assert_eq!(reg.lookup("out.pdf"), Some(ProcessHandle(2)));
}

#[test]
fn unsignallable_gv_is_started_fresh() {
    let mut reg = ViewerRegistry::new();
    let mut fake = Fake::default();
    let req = request("gv", false);
    reg.show(&mut fake, &req).unwrap();
    fake.fail_signal = true;
    assert_eq!(reg.show(&mut fake, &req).unwrap(), ViewOutcome::Launched);
    assert_eq!(fake.spawned.len(), 2);
}

#[test]
fn spawn_failure_is_viewer_unavailable() {
    let mut reg = ViewerRegistry::new();
    let mut fake = Fake {
        fail_spawn: true,
        ..Fake::default()
    };
    let err = reg.show(&mut fake, &request("gv", false)).unwrap_err();
    assert!(matches!(err, PictorError::ViewerUnavailable(_)));
    assert!(reg.is_empty());
}
