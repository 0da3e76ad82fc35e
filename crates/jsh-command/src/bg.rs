use jsh_protocol::{Pipeline, ShellError, ShellResult};
use jsh_system::{job_table, JobState, SignalGuard};
use nix::sys::signal::{killpg, Signal};

use crate::{single_number_arg, Action, Builtin};

/// Continues a stopped job without giving it the terminal.
pub struct Bg;

impl Builtin for Bg {
    fn name(&self) -> &str {
        "bg"
    }

    fn usage(&self) -> &'static str {
        "bg <jobid>"
    }

    fn run(&self, pipeline: &Pipeline) -> ShellResult<Action> {
        let num = single_number_arg(pipeline).ok_or(ShellError::Usage {
            usage: self.usage(),
        })?;

        let _guard = SignalGuard::block();
        let table = job_table();
        let pgid = table.pgid_of(num).ok_or(ShellError::NoSuchJob {
            builtin: "bg",
            num,
        })?;
        log::debug!("continuing job {num} (group {pgid}) in the background");

        killpg(pgid, Signal::SIGCONT).map_err(|err| ShellError::os("bg", &err))?;
        table.set_job_state(num, JobState::Background);
        table.synchronize(num);
        Ok(Action::Continue)
    }
}
