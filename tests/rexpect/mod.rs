use std::{io::Write, process::Command};

use rexpect::{
    error::Error,
    session::{spawn_command, PtyReplSession},
};

mod signals;

fn jsh_binary() -> &'static str {
    env!("CARGO_BIN_EXE_jsh")
}

fn spawn_jsh(timeout: Option<u64>) -> Result<PtyReplSession, Error> {
    let command = Command::new(jsh_binary());
    Ok(PtyReplSession {
        prompt: "jsh".into(),
        pty_session: spawn_command(command, timeout)?,
        quit_command: Some("quit".into()),
        echo_on: false,
    })
}

trait JshReplExt {
    fn send_jsh_line(&mut self, line: &str) -> Result<usize, Error>;

    fn handle_prompt(&mut self) -> Result<(), Error>;

    fn exit(&mut self) -> Result<(), Error>;
}

impl JshReplExt for PtyReplSession {
    fn send_jsh_line(&mut self, line: &str) -> Result<usize, Error> {
        let len = self.send(line)?;
        let len = len + self.writer.write(&[b'\r'])?;
        self.flush()?;
        if self.echo_on {
            self.exp_string(line)?;
        }
        Ok(len)
    }

    fn handle_prompt(&mut self) -> Result<(), Error> {
        // reedline queries the cursor position before drawing the prompt
        self.exp_string("\x1B[6n")?;

        // always reply with (1, 1)
        self.send("\x1B[1;1R")?;
        self.flush()?;

        // prompt will be drawn after responding to the query
        self.wait_for_prompt()?;

        Ok(())
    }

    fn exit(&mut self) -> Result<(), Error> {
        self.send_jsh_line("quit")?;
        Ok(())
    }
}

#[test]
fn echo_back() -> Result<(), Error> {
    let mut p = spawn_jsh(Some(5000))?;
    p.handle_prompt()?;

    p.send_jsh_line("echo hello")?;
    p.exp_string("hello")?;
    p.handle_prompt()?;

    p.exit()
}
