use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
	jobs::JobState,
	libsh::error::{fatal, ShResult},
	prelude::*,
	procfs,
	state::{read_jobs, write_jobs},
};

/// Pending signals, one bit per signal number. The handlers do nothing
/// but set a bit here; every other effect of a signal happens on the
/// control thread when it drains this mask.
static SIGNALS: AtomicU64 = AtomicU64::new(0);

extern "C" fn handle_signal(sig: libc::c_int) {
	SIGNALS.fetch_or(1 << sig, Ordering::SeqCst);
}

pub fn sig_setup() {
	let action = SigAction::new(
		SigHandler::Handler(handle_signal),
		SaFlags::SA_RESTART,
		SigSet::empty(),
	);
	unsafe {
		sigaction(Signal::SIGINT, &action).unwrap(); // ctrl-c
		sigaction(Signal::SIGTSTP, &action).unwrap(); // ctrl-z
		sigaction(Signal::SIGCHLD, &action).unwrap(); // terminated or stopped child
		sigaction(Signal::SIGQUIT, &action).unwrap(); // clean external kill
	}
}

/// Block every signal, returning the mask to restore afterwards. Job
/// table mutation windows run under this.
pub fn block_all() -> SigSet {
	let mut prev = SigSet::empty();
	if let Err(e) = pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&SigSet::all()), Some(&mut prev)) {
		fatal("sigprocmask", e.into());
	}
	prev
}

pub fn restore_mask(prev: &SigSet) {
	if let Err(e) = pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(prev), None) {
		fatal("sigprocmask", e.into());
	}
}

/// Drop the temporary mask entirely. A forked child does this first; it
/// must not inherit the launch window's mask across exec.
pub fn unblock_all() {
	pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None).ok();
}

/// sigsuspend(2): atomically install `mask` and sleep until a signal not
/// in it is delivered and handled
pub fn suspend(mask: &SigSet) {
	unsafe { libc::sigsuspend(mask.as_ref()) };
}

fn got(pending: u64, sig: Signal) -> bool {
	pending & (1 << sig as u64) != 0
}

/// Drain every pending signal flag. Called from the read loop between
/// lines and from wait_fg between suspensions; these two drain points are
/// the only places signals take effect.
pub fn check_signals() -> ShResult<()> {
	let pending = SIGNALS.swap(0, Ordering::SeqCst);
	if pending == 0 {
		return Ok(());
	}
	if got(pending, Signal::SIGQUIT) {
		println!("Terminating after receipt of SIGQUIT signal");
		exit(1);
	}
	if got(pending, Signal::SIGINT) {
		forward_to_fg(Signal::SIGINT)?;
	}
	if got(pending, Signal::SIGTSTP) {
		forward_to_fg(Signal::SIGTSTP)?;
	}
	if got(pending, Signal::SIGCHLD) {
		reap_children()?;
	}
	Ok(())
}

/// A user interrupt or stop request goes to the whole process group of
/// the foreground job, so every member receives it. No-op without a
/// foreground job.
fn forward_to_fg(sig: Signal) -> ShResult<()> {
	let Some(pgid) = read_jobs(|j| j.fg_pgid()) else {
		return Ok(());
	};
	flog!(DEBUG, "forwarding {} to pgid {}", sig, pgid);
	match killpg(pgid, sig) {
		// The group can be gone before the request lands
		Err(Errno::ESRCH) | Ok(_) => Ok(()),
		Err(e) => Err(e.into()),
	}
}

/// The reaper: collect every child whose state changed, without waiting
/// for the others, and fold the changes into the job table.
pub fn reap_children() -> ShResult<()> {
	loop {
		match waitpid(None, Some(WtFlag::WNOHANG | WtFlag::WUNTRACED)) {
			Ok(WtStat::StillAlive) => break,
			Ok(status) => handle_child_status(status)?,
			Err(Errno::ECHILD) => break,
			Err(Errno::EINTR) => continue,
			Err(e) => return Err(e.into()),
		}
	}
	Ok(())
}

fn handle_child_status(status: WtStat) -> ShResult<()> {
	match status {
		WtStat::Stopped(pid, _sig) => child_stopped(pid),
		WtStat::Signaled(pid, sig, _core) => {
			println!(
				"process {} terminated due to uncaught signal {}: {}",
				pid, sig as i32, sig
			);
			child_terminated(pid)
		}
		WtStat::Exited(pid, _code) => child_terminated(pid),
		_ => Ok(()),
	}
}

fn child_stopped(pid: Pid) -> ShResult<()> {
	flog!(DEBUG, "child {} stopped", pid);
	write_jobs(|j| {
		// The stopped member's job, not its group: other members may
		// already be dead
		if let Some(job) = j.by_pid_mut(pid) {
			job.set_state(JobState::Stopped);
		}
	});
	procfs::change_stat(pid, "T").ok();
	Ok(())
}

fn child_terminated(pid: Pid) -> ShResult<()> {
	flog!(DEBUG, "child {} terminated", pid);
	write_jobs(|j| {
		let Some(job) = j.by_pid_mut(pid) else {
			// Job already removed by another path; stale notification
			return;
		};
		job.note_reaped();
		let pgid = job.pgid();
		if job.all_reaped() {
			j.remove(pgid);
			flog!(DEBUG, "job {} complete", pgid);
		}
	});
	procfs::remove(pid).ok();
	Ok(())
}

/// Block the control thread until the job owning `pgid` is removed or
/// leaves the Foreground state. Signals are blocked everywhere in this
/// loop except inside sigsuspend, so a state change can never slip
/// between checking the job and suspending.
pub fn wait_fg(pgid: Pid) -> ShResult<()> {
	let prev = block_all();
	let result = wait_fg_inner(pgid, &prev);
	restore_mask(&prev);
	result
}

fn wait_fg_inner(pgid: Pid, prev: &SigSet) -> ShResult<()> {
	loop {
		check_signals()?;
		let in_fg = read_jobs(|j| {
			j.by_pgid(pgid)
				.is_some_and(|job| job.state() == JobState::Foreground)
		});
		if !in_fg {
			return Ok(());
		}
		suspend(prev);
	}
}
