//! The job table: exclusive owner of every live job, and the reaper that
//! keeps it synchronized with what the kernel reports.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use indexmap::IndexMap;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use once_cell::sync::Lazy;

use crate::job::{Job, JobId, JobState, ProcessState};
use crate::signal::SignalGuard;
use crate::terminal;

/// The one table every part of the shell mutates. Process-wide because
/// the launcher, the builtins, and the read-eval loop all feed the same
/// job bookkeeping, and the forwarding handlers consult its foreground
/// mirror.
pub fn job_table() -> &'static JobTable {
    static TABLE: Lazy<JobTable> = Lazy::new(JobTable::new);
    &TABLE
}

struct TableState {
    jobs: IndexMap<JobId, Job>,
}

/// All bookkeeping for launched pipelines.
///
/// Signal handlers never take the lock; the only thing they read is the
/// atomic `foreground` mirror, refreshed on every access. Every method
/// still blocks the job-control signal set around its critical section,
/// which is what makes the foreground check-then-suspend protocol sound:
/// a child event arriving mid-access stays pending until the access is
/// over.
pub struct JobTable {
    state: Mutex<TableState>,
    /// Group id of the unique foreground job, 0 when there is none.
    foreground: AtomicI32,
}

impl JobTable {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TableState {
                jobs: IndexMap::new(),
            }),
            foreground: AtomicI32::new(0),
        }
    }

    fn locked<R>(&self, f: impl FnOnce(&mut TableState) -> R) -> R {
        let _guard = SignalGuard::block();
        let mut state = self.state.lock().expect("unpoisoned");
        let result = f(&mut state);
        let foreground = state
            .jobs
            .values()
            .find(|job| job.state() == JobState::Foreground)
            .and_then(Job::pgid)
            .map(Pid::as_raw)
            .unwrap_or(0);
        self.foreground.store(foreground, Ordering::SeqCst);
        result
    }

    /// The forwarding target for SIGINT/SIGTSTP. An atomic load and
    /// nothing else, so handlers may call it.
    pub(crate) fn foreground_pgid_mirror(&self) -> Option<Pid> {
        let raw = self.foreground.load(Ordering::SeqCst);
        (raw != 0).then(|| Pid::from_raw(raw))
    }

    /// Allocates the smallest free job number and inserts an empty job.
    pub fn create(&self, state: JobState) -> JobId {
        self.locked(|table| {
            let mut num = 1;
            while table.jobs.contains_key(&num) {
                num += 1;
            }
            table.jobs.insert(num, Job::new(num, state));
            num
        })
    }

    /// Drops a job outright. Only for jobs that never got a process; jobs
    /// with members are reclaimed by synchronization instead.
    pub fn remove(&self, num: JobId) {
        self.locked(|table| {
            table.jobs.shift_remove(&num);
        });
    }

    pub fn add_process(&self, num: JobId, pid: Pid, command: String) {
        self.locked(|table| {
            if let Some(job) = table.jobs.get_mut(&num) {
                job.add_process(pid, command);
            }
        });
    }

    pub fn contains_job(&self, num: JobId) -> bool {
        self.locked(|table| table.jobs.contains_key(&num))
    }

    pub fn pgid_of(&self, num: JobId) -> Option<Pid> {
        self.locked(|table| table.jobs.get(&num).and_then(Job::pgid))
    }

    /// The job owning `pid`, if the pid is known to the table at all.
    pub fn job_with_pid(&self, pid: Pid) -> Option<JobId> {
        self.locked(|table| {
            table
                .jobs
                .values()
                .find(|job| job.contains_pid(pid))
                .map(Job::num)
        })
    }

    /// The pid at `index` in job `num`'s pipeline order.
    pub fn pid_at(&self, num: JobId, index: usize) -> Option<Pid> {
        self.locked(|table| {
            table
                .jobs
                .get(&num)
                .and_then(|job| job.processes().get(index))
                .map(|process| process.pid())
        })
    }

    pub fn has_foreground_job(&self) -> bool {
        self.locked(|table| {
            table
                .jobs
                .values()
                .any(|job| job.state() == JobState::Foreground)
        })
    }

    pub fn set_job_state(&self, num: JobId, state: JobState) {
        self.locked(|table| {
            if let Some(job) = table.jobs.get_mut(&num) {
                job.set_state(state);
            }
        });
    }

    /// Reconciles one job with the states of its members: a job whose
    /// members have all terminated is reclaimed and its number freed; a
    /// foreground job with no running member left loses the terminal and
    /// becomes a background job.
    ///
    /// Calling this again with no intervening process event is a no-op.
    pub fn synchronize(&self, num: JobId) {
        self.locked(|table| synchronize_locked(table, num));
    }

    /// Drains every pending child event without blocking and folds each one
    /// into the table.
    ///
    /// Always called from ordinary code, never from a handler: the
    /// foreground wait drains before every check, the read-eval loop
    /// drains once per iteration, and listings drain first so they never
    /// show already-dead jobs. SIGCHLD's only role is to end a
    /// suspension so one of those call sites runs.
    pub fn reap(&self) {
        self.locked(|table| {
            let flags = Some(
                WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED,
            );
            loop {
                let (pid, state) = match waitpid(None, flags) {
                    Ok(WaitStatus::Exited(pid, _)) => (pid, ProcessState::Terminated),
                    Ok(WaitStatus::Signaled(pid, _, _)) => (pid, ProcessState::Terminated),
                    Ok(WaitStatus::Stopped(pid, _)) => (pid, ProcessState::Stopped),
                    Ok(WaitStatus::Continued(pid)) => (pid, ProcessState::Running),
                    #[cfg(any(target_os = "linux", target_os = "android"))]
                    Ok(WaitStatus::PtraceEvent(pid, _, _) | WaitStatus::PtraceSyscall(pid)) => {
                        (pid, ProcessState::Stopped)
                    }
                    // no more events, or no children at all (ECHILD)
                    Ok(WaitStatus::StillAlive) | Err(_) => break,
                };
                note_process_event(table, pid, state);
            }
        });
    }

    /// The `jobs` listing, in job-number order. Empty when no jobs live.
    pub fn render_jobs(&self) -> String {
        self.locked(|table| {
            let mut nums: Vec<JobId> = table.jobs.keys().copied().collect();
            nums.sort_unstable();
            let mut out = String::new();
            for num in nums {
                let _ = write!(out, "{}", table.jobs[&num]);
            }
            out
        })
    }

    /// The listing block for a single job, if it still exists.
    pub fn describe_job(&self, num: JobId) -> Option<String> {
        self.locked(|table| table.jobs.get(&num).map(Job::to_string))
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

fn note_process_event(table: &mut TableState, pid: Pid, state: ProcessState) {
    let Some(num) = table
        .jobs
        .values()
        .find(|job| job.contains_pid(pid))
        .map(Job::num)
    else {
        // not ours; some library child, already forgotten
        return;
    };
    if let Some(job) = table.jobs.get_mut(&num) {
        if let Some(process) = job.process_mut(pid) {
            process.set_state(state);
        }
    }
    synchronize_locked(table, num);
}

fn synchronize_locked(table: &mut TableState, num: JobId) {
    let Some(job) = table.jobs.get_mut(&num) else {
        return;
    };
    if job.is_done() {
        table.jobs.shift_remove(&num);
        return;
    }
    if job.state() == JobState::Foreground && !job.has_running_process() {
        job.set_state(JobState::Background);
        terminal::take_terminal_back();
    }
}
