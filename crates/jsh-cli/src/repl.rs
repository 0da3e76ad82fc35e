use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

use jsh_command::{find, run_external, Action};
use jsh_parser::parse_line;
use nix::unistd::{self, Pid};
use reedline::{FileBackedHistory, Reedline, Signal};

use crate::prompt::JshPrompt;

pub struct ReplConfig {
    pub history_file: Option<PathBuf>,
}

/// Runs the read-eval loop until EOF or a quit builtin; returns the
/// shell's exit code.
///
/// A terminal on stdin gets the line editor; anything else gets a plain
/// buffered line loop, which is what scripted and piped invocations want.
pub fn evaluate_repl(config: ReplConfig) -> i32 {
    let shell_pid = unistd::getpid();
    if io::stdin().is_terminal() {
        interactive_loop(config, shell_pid)
    } else {
        piped_loop(shell_pid)
    }
}

fn interactive_loop(config: ReplConfig, shell_pid: Pid) -> i32 {
    let mut editor = Reedline::create();
    if let Some(path) = config.history_file {
        match FileBackedHistory::with_file(1000, path) {
            Ok(history) => editor = editor.with_history(Box::new(history)),
            Err(err) => log::warn!("history file unavailable: {err}"),
        }
    }

    loop {
        // fold in whatever children changed state while the shell was
        // idle, so finished jobs leave the table and zombies are reaped
        jsh_system::job_table().reap();
        match editor.read_line(&JshPrompt) {
            Ok(Signal::Success(line)) => match evaluate_line(&line, shell_pid) {
                Action::Continue => {}
                Action::Exit(code) => return code,
            },
            Ok(Signal::CtrlC) => {}
            Ok(Signal::CtrlD) => return 0,
            Err(err) => {
                // a dead input stream is an EOF, not a crash
                log::warn!("line editor failed: {err}");
                return 0;
            }
        }
    }
}

fn piped_loop(shell_pid: Pid) -> i32 {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { return 0 };
        jsh_system::job_table().reap();
        match evaluate_line(&line, shell_pid) {
            Action::Continue => {}
            Action::Exit(code) => return code,
        }
    }
    0
}

fn evaluate_line(line: &str, shell_pid: Pid) -> Action {
    if line.trim().is_empty() {
        return Action::Continue;
    }
    log::trace!("evaluating: {line}");

    let pipeline = match parse_line(line) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            eprintln!("{err}");
            return Action::Continue;
        }
    };

    let result = match find(&pipeline.head().name) {
        Some(builtin) => builtin.run(&pipeline),
        None => run_external(&pipeline).map(|()| Action::Continue),
    };

    match result {
        Ok(action) => action,
        Err(err) => {
            // only the shell itself may report and carry on; a child that
            // somehow unwound to here must die before touching the loop
            if unistd::getpid() != shell_pid {
                unsafe { libc::_exit(0) }
            }
            eprintln!("{err}");
            Action::Continue
        }
    }
}
