use jsh_protocol::{Pipeline, ShellResult};
use jsh_system::{job_table, SignalGuard};

use crate::{Action, Builtin};

/// Prints the job table. Pending child events are folded in first so the
/// listing never shows a job the kernel already finished.
pub struct Jobs;

impl Builtin for Jobs {
    fn name(&self) -> &str {
        "jobs"
    }

    fn usage(&self) -> &'static str {
        "jobs"
    }

    fn run(&self, _pipeline: &Pipeline) -> ShellResult<Action> {
        let _guard = SignalGuard::block();
        let table = job_table();
        table.reap();
        print!("{}", table.render_jobs());
        Ok(Action::Continue)
    }
}
