use crate::{
	jobs::JobState,
	libsh::error::{ShErr, ShErrKind, ShResult},
	prelude::*,
	procfs, signal,
	state::{self, read_jobs, write_jobs},
};

/// The `jobs` builtin: list every live job in table order
pub fn jobs(argv: &[String]) -> ShResult<()> {
	if argv.len() > 1 {
		return Err(ShErr::simple(ShErrKind::ExecFail, "too many arguments"));
	}
	let listing = read_jobs(|j| j.render_list());
	print!("{listing}");
	Ok(())
}

/// The `bg` and `fg` builtins. Both resolve a job token, continue the
/// group if it was stopped, and move it to the requested state; fg then
/// blocks until the job leaves the foreground again.
pub fn continue_job(argv: &[String], fg: bool) -> ShResult<()> {
	if argv.len() < 2 {
		return Err(ShErr::simple(ShErrKind::ExecFail, "need more arguments"));
	}
	if argv.len() > 2 {
		return Err(ShErr::simple(ShErrKind::ExecFail, "too many arguments"));
	}

	// The whole transition happens with the reaper held off
	let prev = signal::block_all();
	let result = transition(&argv[1], fg);
	signal::restore_mask(&prev);
	let pgid = result?;

	if fg {
		signal::wait_fg(pgid)?;
		procfs::change_stat(state::shell_pid(), "Rs+").ok();
	}
	Ok(())
}

fn transition(token: &str, fg: bool) -> ShResult<Pid> {
	write_jobs(|j| {
		let Some(job) = j.by_token(token) else {
			return Err(ShErr::simple(
				ShErrKind::ExecFail,
				"no such job or process group",
			));
		};
		let pgid = job.pgid();
		let old_state = job.state();
		let pids = job.pids().to_vec();

		if fg {
			procfs::change_stat(state::shell_pid(), "Ss").ok();
			if old_state == JobState::Stopped {
				killpg(pgid, Signal::SIGCONT)?;
			}
			j.by_pgid_mut(pgid).unwrap().set_state(JobState::Foreground);
			for pid in pids {
				procfs::change_stat(pid, "R+").ok();
			}
		} else if old_state != JobState::Background {
			killpg(pgid, Signal::SIGCONT)?;
			j.by_pgid_mut(pgid).unwrap().set_state(JobState::Background);
			for pid in pids {
				procfs::change_stat(pid, "R").ok();
			}
		}
		Ok(pgid)
	})
}

/// The `logout` builtin: like quit, but refuses to strand stopped jobs
pub fn logout() -> ShResult<()> {
	if read_jobs(|j| j.any_stopped()) {
		return Err(ShErr::simple(
			ShErrKind::ExecFail,
			"There are suspended jobs.",
		));
	}
	quit()
}

/// The `quit` builtin: kill every live job's process group, drain the
/// table, clean up the interpreter's own status entry, and leave
pub fn quit() -> ShResult<()> {
	let prev = signal::block_all();

	write_jobs(|j| {
		for job in j.jobs() {
			job.killpg(Signal::SIGKILL).ok();
		}
	});

	loop {
		if let Err(e) = signal::reap_children() {
			signal::restore_mask(&prev);
			return Err(e);
		}
		if read_jobs(|j| j.is_empty()) {
			break;
		}
		signal::suspend(&prev);
	}
	signal::restore_mask(&prev);

	procfs::remove(state::shell_pid()).ok();
	println!("reed quit :)");
	exit(0);
}
