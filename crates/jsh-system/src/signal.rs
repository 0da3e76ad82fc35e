//! Handler installation and the blocking discipline for the job-control
//! signal set.
//!
//! The handlers themselves do almost nothing: SIGCHLD exists only so a
//! suspended shell wakes up, and SIGINT/SIGTSTP forward to an atomic
//! mirror of the foreground process group. Every piece of real job
//! bookkeeping, the `waitpid` drain included, runs in ordinary code with
//! {SIGCHLD, SIGINT, SIGTSTP, SIGCONT} blocked, so delivery is deferred
//! to [`wait_for_signal`] or to the drop of the outermost [`SignalGuard`]
//! and a signal can never land inside a half-finished mutation.

use nix::sys::signal::{
    killpg, sigaction, sigprocmask, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal,
};
use std::io;

const JOB_CONTROL_SIGNALS: [Signal; 4] = [
    Signal::SIGCHLD,
    Signal::SIGINT,
    Signal::SIGTSTP,
    Signal::SIGCONT,
];

pub(crate) fn job_control_set() -> SigSet {
    let mut set = SigSet::empty();
    for signal in JOB_CONTROL_SIGNALS {
        set.add(signal);
    }
    set
}

/// Blocks the job-control signal set for as long as the guard lives and
/// restores the exact previous mask on drop, on every exit path.
///
/// Guards nest: an inner guard restores the outer guard's mask, so the
/// signals stay blocked until the outermost guard drops.
pub struct SignalGuard {
    previous: SigSet,
}

impl SignalGuard {
    pub fn block() -> Self {
        let mut previous = SigSet::empty();
        // sigprocmask only fails for an invalid `how`
        let _ = sigprocmask(
            SigmaskHow::SIG_BLOCK,
            Some(&job_control_set()),
            Some(&mut previous),
        );
        Self { previous }
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        let _ = sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None);
    }
}

/// Atomically lifts the blocked mask and sleeps until a handler has run,
/// then re-blocks before returning.
///
/// Callers must hold a [`SignalGuard`] across the state check and this
/// call; checking with the set unblocked would let a wakeup slip in between
/// and leave the shell suspended on an event that already happened.
pub fn wait_for_signal() {
    // sigsuspend reporting EINTR is its way of saying a handler ran
    let _ = SigSet::empty().suspend();
}

/// Installs the shell's signal dispositions. Must run before the first
/// child is spawned; failure is fatal to startup.
///
/// SIGCHLD wakes suspended waits, SIGINT and SIGTSTP are forwarded to the
/// foreground job, SIGQUIT ends the shell, and SIGTTIN/SIGTTOU are ignored
/// so terminal handoff never stops the shell itself.
pub fn install_handlers() -> io::Result<()> {
    // the table (and its mirror) must exist before the first signal can
    // consult it; after this, a handler's access is a plain atomic load
    crate::table::job_table();

    let wake = SigAction::new(
        SigHandler::Handler(handle_sigchld),
        SaFlags::SA_RESTART,
        job_control_set(),
    );
    let forward = SigAction::new(
        SigHandler::Handler(handle_forward),
        SaFlags::SA_RESTART,
        job_control_set(),
    );
    let quit = SigAction::new(
        SigHandler::Handler(handle_sigquit),
        SaFlags::empty(),
        SigSet::empty(),
    );
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());

    // Safety: the handlers below only use async-signal-safe operations
    // (an atomic load, kill, killpg, _exit), per
    // https://manpages.ubuntu.com/manpages/bionic/man7/signal-safety.7.html
    unsafe {
        sigaction(Signal::SIGCHLD, &wake)?;
        sigaction(Signal::SIGINT, &forward)?;
        sigaction(Signal::SIGTSTP, &forward)?;
        sigaction(Signal::SIGQUIT, &quit)?;
        sigaction(Signal::SIGTTIN, &ignore)?;
        sigaction(Signal::SIGTTOU, &ignore)?;
    }
    Ok(())
}

/// Empty on purpose: a delivered SIGCHLD makes `sigsuspend` return, and
/// the woken caller drains `waitpid` itself in ordinary code. A handler
/// still has to be installed, since an ignored signal would not end the
/// suspension.
extern "C" fn handle_sigchld(_signo: libc::c_int) {}

/// Relays a terminal-style signal to the foreground job's process group,
/// read from the atomic mirror the job table maintains. With no
/// foreground job the signal is dropped.
extern "C" fn handle_forward(signo: libc::c_int) {
    let Ok(signal) = Signal::try_from(signo) else {
        return;
    };
    if let Some(pgid) = crate::table::job_table().foreground_pgid_mirror() {
        let _ = killpg(pgid, signal);
    }
}

extern "C" fn handle_sigquit(_signo: libc::c_int) {
    // only _exit is safe here
    unsafe { libc::_exit(0) }
}
