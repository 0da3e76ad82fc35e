use jsh_protocol::{Pipeline, ShellError, ShellResult};
use jsh_system::{job_table, terminal, wait_foreground, JobState, SignalGuard};
use nix::sys::signal::{killpg, Signal};

use crate::{notify_job, single_number_arg, Action, Builtin};

/// Continues a job and hands it the terminal, then waits like a fresh
/// foreground launch would.
pub struct Fg;

impl Builtin for Fg {
    fn name(&self) -> &str {
        "fg"
    }

    fn usage(&self) -> &'static str {
        "fg <jobid>"
    }

    fn run(&self, pipeline: &Pipeline) -> ShellResult<Action> {
        let num = single_number_arg(pipeline).ok_or(ShellError::Usage {
            usage: self.usage(),
        })?;

        let guard = SignalGuard::block();
        let table = job_table();
        let pgid = table.pgid_of(num).ok_or(ShellError::NoSuchJob {
            builtin: "fg",
            num,
        })?;
        log::debug!("bringing job {num} (group {pgid}) to the foreground");

        terminal::give_terminal_to(pgid).map_err(|err| ShellError::os("fg", &err))?;
        if let Err(err) = killpg(pgid, Signal::SIGCONT) {
            terminal::take_terminal_back();
            return Err(ShellError::os("fg", &err));
        }
        // no reconciliation here: the members still read Stopped until
        // their SIGCONT is reaped, and reconciling a foreground job with
        // no running member would demote it straight back; the wait loop
        // below folds the continue events in
        table.set_job_state(num, JobState::Foreground);

        wait_foreground(&guard);
        drop(guard);

        if job_table().contains_job(num) {
            notify_job(num);
        }
        Ok(Action::Continue)
    }
}
