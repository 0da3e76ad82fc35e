//! Job-control scenarios that need a real terminal: stopping the
//! foreground job from the keyboard, resuming it, and interrupting it.

use std::{thread::sleep, time::Duration};

use rexpect::error::Error;

use super::{spawn_jsh, JshReplExt};

// give a freshly launched child time to own the terminal
fn settle() {
    sleep(Duration::from_millis(400));
}

#[test]
fn ctrl_z_stops_the_foreground_job_and_returns_the_prompt() -> Result<(), Error> {
    let mut p = spawn_jsh(Some(10000))?;
    p.handle_prompt()?;

    p.send_jsh_line("sleep 30")?;
    settle();
    p.send_control('z')?;

    // the demoted job is reported before the next prompt
    p.exp_string("Stopped")?;
    p.handle_prompt()?;

    p.send_jsh_line("jobs")?;
    p.exp_string("Background")?;
    p.exp_string("Stopped")?;
    p.handle_prompt()?;

    p.send_jsh_line("slay 1")?;
    p.handle_prompt()?;
    p.exit()
}

#[test]
fn stopped_job_resumes_in_the_background_and_foreground() -> Result<(), Error> {
    let mut p = spawn_jsh(Some(10000))?;
    p.handle_prompt()?;

    p.send_jsh_line("sleep 30")?;
    settle();
    p.send_control('z')?;
    p.exp_string("Stopped")?;
    p.handle_prompt()?;

    p.send_jsh_line("bg 1")?;
    p.handle_prompt()?;
    settle();
    p.send_jsh_line("jobs")?;
    p.exp_string("Running")?;
    p.handle_prompt()?;

    p.send_jsh_line("fg 1")?;
    settle();
    // the job owns the terminal again, so the keyboard interrupt is its
    p.send_control('c')?;
    p.handle_prompt()?;

    p.send_jsh_line("jobs")?;
    p.handle_prompt()?;
    p.exit()
}

#[test]
fn fg_resumes_a_stopped_job_and_keeps_waiting() -> Result<(), Error> {
    let mut p = spawn_jsh(Some(10000))?;
    p.handle_prompt()?;

    p.send_jsh_line("sleep 30")?;
    settle();
    p.send_control('z')?;
    p.exp_string("Stopped")?;
    p.handle_prompt()?;

    p.send_jsh_line("fg 1")?;
    settle();
    // a second keyboard stop only reaches the job if fg really handed it
    // the terminal and sat waiting on it
    p.send_control('z')?;
    p.exp_string("Stopped")?;
    p.handle_prompt()?;

    p.send_jsh_line("slay 1")?;
    p.handle_prompt()?;
    p.exit()
}

#[test]
fn background_launch_is_announced_with_its_pids() -> Result<(), Error> {
    let mut p = spawn_jsh(Some(10000))?;
    p.handle_prompt()?;

    p.send_jsh_line("sleep 30 &")?;
    p.exp_string("[1]")?;
    p.handle_prompt()?;

    p.send_jsh_line("slay 1")?;
    p.handle_prompt()?;
    p.exit()
}
