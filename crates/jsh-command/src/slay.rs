use jsh_protocol::{Pipeline, ShellError, ShellResult};
use jsh_system::{job_table, SignalGuard};
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;

use crate::{parse_number, Action, Builtin};

/// The three process-signalling builtins share one implementation; they
/// differ only in the signal they deliver.
///
/// `slay <pid>` targets one known pid; if no process has that pid but a
/// job carries that number, the whole job's group is signalled instead.
/// `slay <jobid> <index>` targets the process at a zero-based position in
/// the job's pipeline order.
pub struct SignalBuiltin {
    name: &'static str,
    usage: &'static str,
    signal: Signal,
}

pub const SLAY: SignalBuiltin = SignalBuiltin {
    name: "slay",
    usage: "slay <jobid> <index> | slay <pid>",
    signal: Signal::SIGKILL,
};

pub const HALT: SignalBuiltin = SignalBuiltin {
    name: "halt",
    usage: "halt <jobid> <index> | halt <pid>",
    signal: Signal::SIGSTOP,
};

pub const CONT: SignalBuiltin = SignalBuiltin {
    name: "cont",
    usage: "cont <jobid> <index> | cont <pid>",
    signal: Signal::SIGCONT,
};

impl Builtin for SignalBuiltin {
    fn name(&self) -> &str {
        self.name
    }

    fn usage(&self) -> &'static str {
        self.usage
    }

    fn run(&self, pipeline: &Pipeline) -> ShellResult<Action> {
        let usage = ShellError::Usage { usage: self.usage };
        let args = pipeline.head().args.as_slice();

        let _guard = SignalGuard::block();
        let table = job_table();
        match args {
            [target] => {
                let target = parse_number(target).ok_or(usage)?;
                let pid = Pid::from_raw(target as i32);
                if let Some(num) = table.job_with_pid(pid) {
                    log::debug!("sending {} to pid {pid} of job {num}", self.signal);
                    kill(pid, self.signal).map_err(|err| ShellError::os(self.name, &err))?;
                    table.synchronize(num);
                } else if table.contains_job(target) {
                    // a bare job number; signal the whole group
                    let pgid = table.pgid_of(target).ok_or(ShellError::NoSuchJob {
                        builtin: self.name,
                        num: target,
                    })?;
                    log::debug!("sending {} to group {pgid} of job {target}", self.signal);
                    killpg(pgid, self.signal).map_err(|err| ShellError::os(self.name, &err))?;
                    table.synchronize(target);
                } else {
                    return Err(ShellError::NoSuchProcess { pid: target as i32 });
                }
            }
            [num, index] => {
                let num = parse_number(num).ok_or(usage.clone())?;
                let index = parse_number(index).ok_or(usage)?;
                if !table.contains_job(num) {
                    return Err(ShellError::NoSuchJob {
                        builtin: self.name,
                        num,
                    });
                }
                let pid = table
                    .pid_at(num, index)
                    .ok_or(ShellError::NoProcessAtIndex { num, index })?;
                log::debug!("sending {} to pid {pid} of job {num}", self.signal);
                kill(pid, self.signal).map_err(|err| ShellError::os(self.name, &err))?;
                table.synchronize(num);
            }
            _ => return Err(usage),
        }
        Ok(Action::Continue)
    }
}
