//! Ownership of the controlling terminal.
//!
//! Only the shell ever calls `tcsetpgrp`; children are placed in their
//! process group and simply inherit whatever the shell handed over. The
//! shell holds the terminal except while a specific foreground job runs.

use std::io::{self, IsTerminal};
use std::os::fd::{AsFd, BorrowedFd};

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::{self, Pid};

/// The stdin file descriptor without going through `std::io::stdin()`.
///
/// # Safety
/// I/O safety of borrowing `STDIN_FILENO` is unclear; only used to reach
/// `tcsetpgrp` and `tcgetpgrp` through the I/O safe `nix` interface.
pub(crate) unsafe fn stdin_fd() -> impl AsFd {
    unsafe { BorrowedFd::borrow_raw(libc::STDIN_FILENO) }
}

/// Makes `pgid` the terminal's foreground process group.
///
/// Running without a controlling terminal is fine (ENOTTY is swallowed);
/// any other failure aborts the current command.
pub fn give_terminal_to(pgid: Pid) -> io::Result<()> {
    match unistd::tcsetpgrp(unsafe { stdin_fd() }, pgid) {
        Ok(()) | Err(Errno::ENOTTY) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Returns the terminal to the shell's own process group.
///
/// Also called from the SIGCHLD handler when a foreground job stops, so
/// this must stay async-signal-safe: tcsetpgrp and getpgrp only, no
/// reporting.
pub fn take_terminal_back() {
    let _ = unistd::tcsetpgrp(unsafe { stdin_fd() }, unistd::getpgrp());
}

/// Startup sequence: wait until the shell is in the terminal's foreground
/// process group, move it into a group of its own, and take the terminal.
///
/// Runs before any signal customization so that, if the shell was started
/// in the background, the SIGTTIN kick stops it the way the kernel expects.
pub fn claim_for_shell() -> io::Result<()> {
    if !io::stdin().is_terminal() {
        return Ok(());
    }

    loop {
        let shell_pgrp = unistd::getpgrp();
        match unistd::tcgetpgrp(unsafe { stdin_fd() }) {
            Ok(foreground) if foreground == shell_pgrp => break,
            Ok(_) => {
                let _ = killpg(shell_pgrp, Signal::SIGTTIN);
            }
            Err(Errno::ENOTTY) => return Ok(()),
            Err(err) => return Err(err.into()),
        }
    }

    // EPERM here means the shell already leads its own group
    let pid = unistd::getpid();
    let _ = unistd::setpgid(pid, pid);
    give_terminal_to(unistd::getpgrp())
}
