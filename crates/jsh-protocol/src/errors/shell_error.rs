use std::fmt::Display;

use miette::Diagnostic;
use thiserror::Error;

pub type ShellResult<T> = Result<T, ShellError>;

/// Every error the shell reports at the top of the read-eval loop.
///
/// The `Display` output of each variant is the exact diagnostic printed to
/// stderr, so tests can assert on it verbatim.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum ShellError {
    #[error("{builtin} {num}:  No such job.")]
    #[diagnostic(code(jsh::shell::no_such_job))]
    NoSuchJob { builtin: &'static str, num: usize },

    #[error("No process with pid {pid}.")]
    #[diagnostic(code(jsh::shell::no_such_process))]
    NoSuchProcess { pid: i32 },

    #[error("No process at index {index} in job {num}.")]
    #[diagnostic(code(jsh::shell::no_process_at_index))]
    NoProcessAtIndex { num: usize, index: usize },

    #[error("Usage: {usage}.")]
    #[diagnostic(code(jsh::shell::usage))]
    Usage { usage: &'static str },

    #[error("{command}: Command not found.")]
    #[diagnostic(
        code(jsh::shell::command_not_found),
        help("Check the spelling, or whether the program is on your PATH.")
    )]
    CommandNotFound { command: String },

    #[error("{context}: {message}")]
    #[diagnostic(code(jsh::shell::os_error))]
    Os { context: String, message: String },
}

impl ShellError {
    /// Wraps a failed syscall or I/O operation together with what the shell
    /// was doing at the time.
    pub fn os(context: impl Into<String>, error: &dyn Display) -> Self {
        Self::Os {
            context: context.into(),
            message: error.to_string(),
        }
    }
}
