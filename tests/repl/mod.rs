//! End-to-end runs with commands piped on stdin. Without a terminal the
//! shell takes its plain line loop and terminal handoff degrades to a
//! no-op, but launching, reaping, and the builtins behave the same.

use assert_cmd::assert::Assert;
use assert_cmd::Command;

fn jsh_with_input(input: &str) -> Assert {
    Command::cargo_bin("jsh")
        .expect("jsh binary")
        .write_stdin(input)
        .timeout(std::time::Duration::from_secs(30))
        .assert()
}

fn stdout_of(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

fn stderr_of(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

#[test]
fn foreground_command_writes_through() {
    let assert = jsh_with_input("echo hello\n").success();
    assert!(stdout_of(&assert).contains("hello\n"));
}

#[test]
fn eof_exits_cleanly_with_status_zero() {
    jsh_with_input("").success();
}

#[test]
fn quit_and_exit_both_end_the_shell() {
    jsh_with_input("quit\necho unreachable\n").success();
    let assert = jsh_with_input("exit\necho unreachable\n").success();
    assert!(!stdout_of(&assert).contains("unreachable"));
}

#[test]
fn pipeline_with_output_redirection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("counts.txt");
    let script = format!("echo one two three | wc -w > {}\n", path.display());

    let assert = jsh_with_input(&script).success();
    let contents = std::fs::read_to_string(&path).expect("redirected output");
    assert_eq!(contents.trim(), "3");
    // the pipeline wrote to the file, not the terminal
    assert!(!stdout_of(&assert).contains('3'));
}

#[test]
fn input_redirection_feeds_the_first_stage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("words.txt");
    std::fs::write(&path, "alpha beta\n").expect("write input");

    let script = format!("wc -w < {}\n", path.display());
    let assert = jsh_with_input(&script).success();
    assert!(stdout_of(&assert).contains('2'));
}

#[test]
fn missing_input_file_fails_before_spawning() {
    let assert = jsh_with_input("wc -w < /no/such/file\necho still-alive\n").success();
    assert!(stderr_of(&assert).contains("/no/such/file"));
    assert!(stdout_of(&assert).contains("still-alive"));
}

#[test]
fn unknown_command_reports_and_continues() {
    let assert = jsh_with_input("nosuchprog\necho still-alive\n").success();
    assert!(stderr_of(&assert).contains("nosuchprog: Command not found."));
    assert!(stdout_of(&assert).contains("still-alive"));
}

#[test]
fn unknown_interior_stage_does_not_kill_the_pipeline() {
    let assert = jsh_with_input("echo hi | nosuchprog | cat\n").success();
    assert!(stderr_of(&assert).contains("nosuchprog: Command not found."));
}

#[test]
fn bad_builtin_usage_prints_the_synopsis() {
    let assert = jsh_with_input("fg\n").success();
    assert!(stderr_of(&assert).contains("Usage: fg <jobid>."));

    let assert = jsh_with_input("fg 1x\n").success();
    assert!(stderr_of(&assert).contains("Usage: fg <jobid>."));
}

#[test]
fn fg_on_a_missing_job_is_reported() {
    let assert = jsh_with_input("fg 3\n").success();
    assert!(stderr_of(&assert).contains("fg 3:  No such job."));
}

#[test]
fn slay_requires_a_known_pid() {
    let assert = jsh_with_input("slay 999999\n").success();
    assert!(stderr_of(&assert).contains("No process with pid 999999."));
}

#[test]
fn jobs_listing_starts_empty() {
    let assert = jsh_with_input("jobs\n").success();
    assert_eq!(stdout_of(&assert), "");
}

#[test]
fn background_job_is_announced_listed_and_slain() {
    let script = "sleep 30 &\njobs\nslay 1 0\nsleep 0.3\njobs\n";
    let assert = jsh_with_input(script).success();
    let stdout = stdout_of(&assert);

    // announcement, then exactly one listing block before the kill
    assert!(stdout.contains("[1] "));
    assert_eq!(stdout.matches("Background").count(), 1);
    assert_eq!(stdout.matches("Running sleep 30").count(), 1);
}

#[test]
fn background_jobs_get_distinct_numbers() {
    let script = "sleep 30 &\nsleep 30 &\njobs\nslay 1 0\nslay 2 0\nsleep 0.3\njobs\n";
    let assert = jsh_with_input(script).success();
    let stdout = stdout_of(&assert);

    assert_eq!(stdout.matches("Background").count(), 2);
    assert!(stdout.contains("[1] ("));
    assert!(stdout.contains("[2] ("));
}

#[test]
fn halt_and_cont_toggle_a_background_job() {
    let script = "sleep 30 &\nhalt 1 0\nsleep 0.3\njobs\ncont 1 0\nsleep 0.3\njobs\nslay 1 0\n";
    let assert = jsh_with_input(script).success();
    let stdout = stdout_of(&assert);

    assert!(stdout.contains("Stopped sleep 30"));
    assert!(stdout.contains("Running sleep 30"));
}

#[test]
fn slaying_by_bare_job_number_kills_the_whole_job() {
    let script = "sleep 30 | sleep 30 &\nslay 1\nsleep 0.3\njobs\n";
    let assert = jsh_with_input(script).success();
    assert_eq!(stdout_of(&assert).matches("Background").count(), 0);
}

#[test]
fn parse_errors_do_not_stop_the_loop() {
    let assert = jsh_with_input("| wc\necho still-alive\n").success();
    assert!(stderr_of(&assert).contains("Missing command."));
    assert!(stdout_of(&assert).contains("still-alive"));
}
