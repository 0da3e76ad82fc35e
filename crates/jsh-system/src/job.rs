use std::fmt::{self, Display};

use nix::unistd::Pid;

pub type JobId = usize;

/// What the kernel last told us about one child process.
///
/// Running and Stopped convert back and forth (SIGSTOP and SIGCONT);
/// Terminated is final. Only the reaper mutates this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Stopped,
    Terminated,
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcessState::Running => "Running",
            ProcessState::Stopped => "Stopped",
            ProcessState::Terminated => "Terminated",
        })
    }
}

/// One child of the shell: a pid fixed at spawn time, the command line it
/// runs, and the live state the reaper keeps current.
#[derive(Debug, Clone)]
pub struct Process {
    pid: Pid,
    command: String,
    state: ProcessState,
}

impl Process {
    pub fn new(pid: Pid, command: String) -> Self {
        Self {
            pid,
            command,
            state: ProcessState::Running,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }
}

/// Whether a job owns the terminal or runs behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Foreground,
    Background,
}

impl Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobState::Foreground => "Foreground",
            JobState::Background => "Background",
        })
    }
}

/// The shell-level unit tracking one launched pipeline.
///
/// All members share one process group; the group id is the pid of the
/// first process added and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Job {
    num: JobId,
    pgid: Option<Pid>,
    state: JobState,
    processes: Vec<Process>,
}

impl Job {
    pub(crate) fn new(num: JobId, state: JobState) -> Self {
        Self {
            num,
            pgid: None,
            state,
            processes: Vec::new(),
        }
    }

    pub fn num(&self) -> JobId {
        self.num
    }

    pub fn pgid(&self) -> Option<Pid> {
        self.pgid
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: JobState) {
        self.state = state;
    }

    /// Members in pipeline order: index 0 feeds index 1, and so on.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub(crate) fn add_process(&mut self, pid: Pid, command: String) {
        if self.pgid.is_none() {
            self.pgid = Some(pid);
        }
        self.processes.push(Process::new(pid, command));
    }

    pub fn contains_pid(&self, pid: Pid) -> bool {
        self.processes.iter().any(|p| p.pid() == pid)
    }

    pub(crate) fn process_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.iter_mut().find(|p| p.pid() == pid)
    }

    /// True once every member has terminated; the table then reclaims the job.
    pub fn is_done(&self) -> bool {
        self.processes
            .iter()
            .all(|p| p.state() == ProcessState::Terminated)
    }

    pub fn has_running_process(&self) -> bool {
        self.processes
            .iter()
            .any(|p| p.state() == ProcessState::Running)
    }
}

impl Display for Job {
    /// The `jobs` listing block: a header line and one indented line per
    /// member.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pgid = self.pgid.map(Pid::as_raw).unwrap_or(0);
        writeln!(f, "[{}] ({}) {}", self.num, pgid, self.state)?;
        for process in &self.processes {
            writeln!(f, "    {} {} {}", process.pid(), process.state(), process.command())?;
        }
        Ok(())
    }
}
