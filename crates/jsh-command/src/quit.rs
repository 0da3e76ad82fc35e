use jsh_protocol::{Pipeline, ShellResult};

use crate::{Action, Builtin};

/// Ends the shell with status 0. Registered twice, as `quit` and `exit`.
pub struct Quit(pub &'static str);

impl Builtin for Quit {
    fn name(&self) -> &str {
        self.0
    }

    fn usage(&self) -> &'static str {
        self.0
    }

    fn run(&self, _pipeline: &Pipeline) -> ShellResult<Action> {
        Ok(Action::Exit(0))
    }
}
