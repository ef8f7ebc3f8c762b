use crate::{
	builtin,
	jobs::JobState,
	libsh::{
		error::{fatal, ShErr, ShErrKind, ShResult},
		term::{Style, Styled},
	},
	parse::{self, LineFlags, Redir, RedirMode, RedirSrc, Stage},
	prelude::*,
	procfs, signal,
	state::{self, write_history, write_jobs},
};

/// Descriptor region where fds 0/1/2 are parked while a builtin runs with
/// redirections applied. Nothing else in the execution environment uses
/// descriptors this high.
const RESERVED_FD: RawFd = 36;

/// Evaluate one command line: parse it, record it, launch it, and if it
/// runs in the foreground, wait for it to leave the foreground state.
pub fn eval(line: &str) -> ShResult<()> {
	let parsed = parse::parse(line)?;
	if parsed.is_blank() {
		return Ok(());
	}

	// A replayed `!n` must not re-append, or replaying a recorded `!n`
	// would loop forever
	if !parsed.flags.contains(LineFlags::SKIP_HISTORY) {
		write_history(|h| h.add(line))?;
	}

	let background = parsed.background();
	let all_builtin = parsed.extern_count() == 0;
	let stages = &parsed.stages;

	// One pipe per adjacent pair of stages; stage i reads pipes[i-1] and
	// writes pipes[i]
	let mut pipes = vec![];
	for _ in 1..stages.len() {
		match pipe() {
			Ok(ends) => pipes.push(ends),
			Err(e) => fatal("pipe", e.into()),
		}
	}

	let (job_state, member_stat) = if background {
		(JobState::Background, "R")
	} else {
		(JobState::Foreground, "R+")
	};

	// Keep the reaper out from the first fork until the job is registered:
	// a child's exit must not be collected before its pid is recorded
	let mut launch_mask = None;
	if !all_builtin {
		launch_mask = Some(signal::block_all());
		if !background {
			procfs::change_stat(state::shell_pid(), "Ss").ok();
		}
	}

	let mut pgid: Option<Pid> = None;
	let mut pids = vec![];

	for (i, stage) in stages.iter().enumerate() {
		if stage.builtin {
			if let Err(e) = run_builtin_stage(stages, i, &pipes) {
				e.print();
			}
			continue;
		}

		match unsafe { fork() } {
			Ok(ForkResult::Child) => {
				exec_child(stages, i, &pipes, pgid);
			}
			Ok(ForkResult::Parent { child }) => {
				if pgid.is_none() {
					pgid = Some(child);
				}
				pids.push(child);
				procfs::add(stage.cmd(), child, state::shell_pid(), member_stat).ok();
			}
			Err(e) => fatal("fork", e.into()),
		}
	}

	// Every stage has its copies wired by now
	drop(pipes);

	if !all_builtin {
		let pgid = pgid.unwrap();
		let added = write_jobs(|j| j.add(pgid, pids, job_state, line.trim()));
		if let Some(prev) = launch_mask {
			signal::restore_mask(&prev);
		}
		if let Err(e) = added {
			e.print();
		}
		if !background {
			signal::wait_fg(pgid)?;
			procfs::change_stat(state::shell_pid(), "Rs+").ok();
		}
	}

	Ok(())
}

/// The forked half of an external stage. Never returns: either the image
/// is replaced or the child reports and exits on its own.
fn exec_child(stages: &[Stage], idx: usize, pipes: &[(OwnedFd, OwnedFd)], pgid: Option<Pid>) -> ! {
	// The launch window's mask must not survive into the new image
	signal::unblock_all();

	if let Err(e) = wire_stage(idx, stages.len(), &stages[idx].redirs, pipes) {
		e.print();
		exit(1);
	}

	// dup2 already made the copies this stage needs
	for (rpipe, wpipe) in pipes {
		close(rpipe.as_raw_fd()).ok();
		close(wpipe.as_raw_fd()).ok();
	}

	// First fork leads the group; everyone after joins it
	setpgid(Pid::from_raw(0), pgid.unwrap_or(Pid::from_raw(0))).ok();

	let argv = &stages[idx].argv;
	let cmd = CString::new(argv[0].as_str()).unwrap();
	let c_argv = argv
		.iter()
		.map(|arg| CString::new(arg.as_str()).unwrap())
		.collect::<Vec<_>>();
	let c_envp = env::vars()
		.map(|(key, val)| CString::new(format!("{key}={val}")).unwrap())
		.collect::<Vec<_>>();

	let Err(e) = execvpe(&cmd, &c_argv, &c_envp);

	// This failure belongs to the child alone; report it and leave with a
	// status only the reaper will see
	match e {
		Errno::ENOENT => {
			eprintln!(
				"{}",
				format!("{}: Command not found.", argv[0]).styled(Style::Red)
			);
		}
		_ => ShErr::simple(ShErrKind::CmdNotFound, format!("{}: {}", argv[0], e.desc())).print(),
	}
	exit(127);
}

/// Builtins execute in the interpreter process itself, with fds 0/1/2
/// temporarily replaced by the stage's pipe and file redirections.
fn run_builtin_stage(stages: &[Stage], idx: usize, pipes: &[(OwnedFd, OwnedFd)]) -> ShResult<()> {
	let frame = IoFrame::save();
	let result = wire_stage(idx, stages.len(), &stages[idx].redirs, pipes)
		.and_then(|_| builtin::dispatch(&stages[idx]));
	frame.restore();
	result
}

/// Apply one stage's pipe wiring and its redirections, in source order
fn wire_stage(
	idx: usize,
	stage_count: usize,
	redirs: &[Redir],
	pipes: &[(OwnedFd, OwnedFd)],
) -> ShResult<()> {
	if idx > 0 {
		dup2(pipes[idx - 1].0.as_raw_fd(), STDIN_FILENO)?;
	}
	if idx + 1 < stage_count {
		dup2(pipes[idx].1.as_raw_fd(), STDOUT_FILENO)?;
	}
	for redir in redirs {
		apply_redir(redir)?;
	}
	Ok(())
}

fn apply_redir(redir: &Redir) -> ShResult<()> {
	match &redir.src {
		RedirSrc::Fd(fd) => {
			dup2(*fd, redir.tgt_fd)?;
		}
		RedirSrc::File(path) => {
			let file = match redir.mode {
				RedirMode::Input => OpenOptions::new().read(true).open(path),
				RedirMode::Output => OpenOptions::new()
					.write(true)
					.create(true)
					.truncate(true)
					.open(path),
			}
			.map_err(|e| {
				ShErr::simple(ShErrKind::IoErr(e.kind()), format!("{}: {e}", path.display()))
			})?;
			dup2(file.as_raw_fd(), redir.tgt_fd)?;
			// `file` drops here; tgt_fd keeps the open description
		}
	}
	Ok(())
}

/// Saved copies of the three standard descriptors, parked in the reserved
/// region while a builtin runs and put back afterwards, including on
/// early-return paths.
struct IoFrame {
	saved: [RawFd; 3],
}

impl IoFrame {
	// Losing track of the shell's own stdio is not recoverable, so both
	// directions die loudly instead of unwinding
	fn save() -> Self {
		let mut saved = [0; 3];
		for (i, fd) in [STDIN_FILENO, STDOUT_FILENO, STDERR_FILENO]
			.into_iter()
			.enumerate()
		{
			match fcntl(fd, FcntlArg::F_DUPFD(RESERVED_FD + i as RawFd)) {
				Ok(parked) => saved[i] = parked,
				Err(e) => fatal("dup", e.into()),
			}
		}
		Self { saved }
	}

	fn restore(self) {
		for (i, fd) in [STDIN_FILENO, STDOUT_FILENO, STDERR_FILENO]
			.into_iter()
			.enumerate()
		{
			if let Err(e) = dup2(self.saved[i], fd) {
				fatal("dup2", e.into());
			}
			close(self.saved[i]).ok();
		}
	}
}
