//! The shell's builtins and the dispatch path for external pipelines.

mod bg;
mod external;
mod fg;
mod jobs;
mod quit;
mod slay;

pub use external::run_external;

use jsh_protocol::{Pipeline, ShellResult};

/// What the read-eval loop should do after a builtin ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Exit(i32),
}

/// A command the shell runs itself, without forking.
pub trait Builtin: Send + Sync {
    fn name(&self) -> &str;

    /// The argument synopsis shown in usage diagnostics.
    fn usage(&self) -> &'static str;

    fn run(&self, pipeline: &Pipeline) -> ShellResult<Action>;
}

static BUILTINS: &[&dyn Builtin] = &[
    &quit::Quit("quit"),
    &quit::Quit("exit"),
    &jobs::Jobs,
    &fg::Fg,
    &bg::Bg,
    &slay::SLAY,
    &slay::HALT,
    &slay::CONT,
];

/// Looks a builtin up by its leading word.
pub fn find(name: &str) -> Option<&'static dyn Builtin> {
    BUILTINS.iter().copied().find(|builtin| builtin.name() == name)
}

/// Strict argument numbers: every byte a digit, no sign, no suffix.
fn parse_number(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// The lone `<jobid>` argument of fg and bg.
fn single_number_arg(pipeline: &Pipeline) -> Option<usize> {
    match pipeline.head().args.as_slice() {
        [arg] => parse_number(arg),
        _ => None,
    }
}

/// Reports a job the user should know is still around, stopped.
fn notify_job(num: jsh_system::JobId) {
    if let Some(block) = jsh_system::job_table().describe_job(num) {
        print!("{block}");
    }
}

#[cfg(test)]
mod tests {
    use jsh_protocol::Stage;

    use super::*;

    #[test]
    fn every_builtin_is_found_by_name() {
        for name in ["quit", "exit", "jobs", "fg", "bg", "slay", "halt", "cont"] {
            let builtin = find(name).unwrap_or_else(|| panic!("missing builtin {name}"));
            assert_eq!(builtin.name(), name);
        }
        assert!(find("echo").is_none());
    }

    #[test]
    fn numbers_must_be_bare_digits() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("0"), Some(0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-1"), None);
        assert_eq!(parse_number("+1"), None);
        assert_eq!(parse_number("3x"), None);
        assert_eq!(parse_number("1 2"), None);
    }

    #[test]
    fn single_number_arg_rejects_extra_tokens() {
        let mut stage = Stage::new("fg");
        stage.args = vec!["2".into()];
        let pipeline = Pipeline::new(vec![stage]);
        assert_eq!(single_number_arg(&pipeline), Some(2));

        let mut stage = Stage::new("fg");
        stage.args = vec!["2".into(), "3".into()];
        let pipeline = Pipeline::new(vec![stage]);
        assert_eq!(single_number_arg(&pipeline), None);

        let pipeline = Pipeline::new(vec![Stage::new("fg")]);
        assert_eq!(single_number_arg(&pipeline), None);
    }
}
