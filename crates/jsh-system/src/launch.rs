//! Turning a prepared list of commands into a job: spawn each stage into a
//! shared process group, wire the pipe chain, and wait if the job owns the
//! terminal.

use std::io;
use std::os::unix::process::CommandExt;
use std::process::{ChildStdout, Command, Stdio};

use jsh_protocol::ShellError;
use nix::sys::signal::{sigaction, sigprocmask, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use nix::unistd::{self, Pid};

use crate::job::{JobId, JobState};
use crate::signal::{wait_for_signal, SignalGuard};
use crate::table::job_table;
use crate::terminal::{give_terminal_to, stdin_fd, take_terminal_back};

/// How a launched pipeline left the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launched {
    /// A foreground job that ran to completion; nothing remains in the table.
    Completed,
    /// A foreground job that stopped; it remains in the table, demoted.
    Stopped(JobId),
    /// A background job, announced and left running.
    Background { job: JobId, pids: Vec<Pid> },
    /// No stage could be spawned; diagnostics were already printed and the
    /// empty job was removed.
    NothingSpawned,
}

/// Launches `commands` as one job.
///
/// Interior pipe ends are created here; endpoint redirections (stdin of the
/// first stage, stdout of the last) are whatever the caller already set on
/// the commands. Every stage joins the process group of the first spawned
/// stage; a foreground job is handed the terminal as soon as that group
/// exists and the call does not return until the job is done or stopped.
pub fn launch(commands: Vec<Command>, background: bool) -> Launched {
    let guard = SignalGuard::block();
    let table = job_table();
    let initial = if background {
        JobState::Background
    } else {
        JobState::Foreground
    };
    let job = table.create(initial);
    let count = commands.len();
    log::trace!("launching {count}-stage pipeline as job {job}");

    let mut pgid: Option<Pid> = None;
    let mut pids = Vec::with_capacity(count);
    let mut previous_stdout: Option<ChildStdout> = None;

    // each command is consumed and dropped inside its own iteration, so
    // the pipe ends and redirection files it holds close as soon as the
    // stage is spawned; a pipe fd surviving in the shell would rob the
    // next stage of its end-of-file
    for (index, mut command) in commands.into_iter().enumerate() {
        if index > 0 {
            match previous_stdout.take() {
                Some(out) => command.stdin(Stdio::from(out)),
                // the stage that should feed this one never started; hand
                // it immediate end-of-file instead of the terminal
                None => command.stdin(Stdio::null()),
            };
        }
        if index + 1 < count {
            command.stdout(Stdio::piped());
        }
        prepare_stage(&mut command, pgid, !background);

        let display = render_argv(&command);
        match command.spawn() {
            Ok(mut child) => {
                let pid = Pid::from_raw(child.id() as i32);
                let group = pgid.unwrap_or(pid);
                // the child does this too in pre_exec; doing it on both
                // sides closes the race either way it is scheduled
                let _ = unistd::setpgid(pid, group);
                if pgid.is_none() {
                    pgid = Some(group);
                    if !background {
                        let _ = give_terminal_to(group);
                    }
                }
                log::debug!("spawned {pid} into group {group} for job {job}");
                table.add_process(job, pid, display);
                pids.push(pid);
                previous_stdout = child.stdout.take();
            }
            Err(err) => {
                report_spawn_error(&display, &err);
                previous_stdout = None;
            }
        }
    }

    if pids.is_empty() {
        table.remove(job);
        return Launched::NothingSpawned;
    }

    if background {
        return Launched::Background { job, pids };
    }

    wait_foreground(&guard);
    drop(guard);
    if table.contains_job(job) {
        Launched::Stopped(job)
    } else {
        Launched::Completed
    }
}

/// Drains child events and suspends until no foreground job remains, then
/// reclaims the terminal.
///
/// The guard argument is the caller's proof that the job-control set is
/// blocked: the drain, the foreground check, and the suspension must
/// happen under one continuous block or a child event could slip between
/// them and never wake the shell. A SIGCHLD pending while blocked ends
/// the suspension immediately; wakeups for unrelated signals loop back to
/// the drain.
pub fn wait_foreground(_guard: &SignalGuard) {
    let table = job_table();
    loop {
        table.reap();
        if !table.has_foreground_job() {
            break;
        }
        wait_for_signal();
    }
    take_terminal_back();
}

/// Everything the child must do between fork and exec.
fn prepare_stage(command: &mut Command, pgroup: Option<Pid>, foreground: bool) {
    unsafe {
        // Safety: only async-signal-safe calls are made after fork
        // (getpid, setpgid, tcsetpgrp, sigaction, sigprocmask), per
        // https://manpages.ubuntu.com/manpages/bionic/man7/signal-safety.7.html
        command.pre_exec(move || {
            let pid = unistd::getpid();
            let pgroup = pgroup.unwrap_or(pid);
            // Both parent and child perform this, per glibc's job control
            // manual:
            // https://www.gnu.org/software/libc/manual/html_node/Launching-Jobs.html
            let _ = unistd::setpgid(pid, pgroup);
            if foreground {
                let _ = unistd::tcsetpgrp(stdin_fd(), pgroup);
            }

            // the shell's dispositions must not leak into children; the
            // ignored SIGTTIN/SIGTTOU would otherwise survive exec
            let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
            let _ = sigaction(Signal::SIGINT, &default);
            let _ = sigaction(Signal::SIGQUIT, &default);
            let _ = sigaction(Signal::SIGTSTP, &default);
            let _ = sigaction(Signal::SIGTTIN, &default);
            let _ = sigaction(Signal::SIGTTOU, &default);

            // nor must the blocked job-control set
            let _ = sigprocmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None);
            Ok(())
        });
    }
}

fn render_argv(command: &Command) -> String {
    let mut display = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        display.push(' ');
        display.push_str(&arg.to_string_lossy());
    }
    display
}

/// The diagnostic a stage leaves behind when it cannot be started. Printed
/// immediately so a failed interior stage does not silence the rest of the
/// pipeline.
fn report_spawn_error(display: &str, err: &io::Error) {
    let name = display.split_whitespace().next().unwrap_or(display);
    let error = if err.kind() == io::ErrorKind::NotFound {
        ShellError::CommandNotFound {
            command: name.into(),
        }
    } else {
        ShellError::os(name, err)
    };
    eprintln!("{error}");
}
