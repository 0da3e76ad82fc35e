use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::process::{Command, Stdio};

use jsh_protocol::{Pipeline, ShellError, ShellResult};
use jsh_system::{launch, Launched};

use crate::notify_job;

/// Runs a pipeline of external programs as one job.
///
/// Redirection files are opened here, before anything is spawned, so a
/// missing input file fails the whole command. Output files are created
/// with mode 0644 and truncated.
pub fn run_external(pipeline: &Pipeline) -> ShellResult<()> {
    let mut commands: Vec<Command> = pipeline
        .stages
        .iter()
        .map(|stage| {
            let mut command = Command::new(&stage.name);
            command.args(&stage.args);
            command
        })
        .collect();

    if let Some(path) = &pipeline.input {
        let file = File::open(path).map_err(|err| ShellError::os(path, &err))?;
        if let Some(first) = commands.first_mut() {
            first.stdin(Stdio::from(file));
        }
    }
    if let Some(path) = &pipeline.output {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(path)
            .map_err(|err| ShellError::os(path, &err))?;
        if let Some(last) = commands.last_mut() {
            last.stdout(Stdio::from(file));
        }
    }

    match launch(commands, pipeline.background) {
        Launched::Background { job, pids } => {
            let pids: Vec<String> = pids.iter().map(|pid| pid.to_string()).collect();
            println!("[{}] {}", job, pids.join(" "));
        }
        Launched::Stopped(job) => notify_job(job),
        Launched::Completed | Launched::NothingSpawned => {}
    }
    Ok(())
}
