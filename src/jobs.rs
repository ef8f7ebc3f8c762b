use crate::{
	libsh::error::{ShErr, ShErrKind, ShResult},
	prelude::*,
};

/// Max jobs at any point in time
pub const MAXJOBS: usize = 16;

/// Job states and their transitions:
///     Foreground -> Stopped    : ctrl-z
///     Stopped    -> Foreground : fg command
///     Stopped    -> Background : bg command
///     Background -> Foreground : fg command
/// At most one job is in Foreground at any instant. An absent job is an
/// empty table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
	Foreground,
	Background,
	Stopped,
}

impl fmt::Display for JobState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			JobState::Foreground => write!(f, "Foreground"),
			JobState::Background => write!(f, "Running"),
			JobState::Stopped => write!(f, "Stopped"),
		}
	}
}

/// One command line's worth of launched processes, tracked as a unit under
/// one process group
#[derive(Debug, Clone)]
pub struct Job {
	pgid: Pid,
	jid: usize,
	pids: Vec<Pid>,
	reaped: usize,
	state: JobState,
	cmdline: String,
}

impl Job {
	pub fn pgid(&self) -> Pid {
		self.pgid
	}
	pub fn jid(&self) -> usize {
		self.jid
	}
	pub fn pids(&self) -> &[Pid] {
		&self.pids
	}
	pub fn state(&self) -> JobState {
		self.state
	}
	pub fn set_state(&mut self, state: JobState) {
		self.state = state
	}
	pub fn cmdline(&self) -> &str {
		&self.cmdline
	}
	pub fn has_pid(&self, pid: Pid) -> bool {
		self.pids.contains(&pid)
	}
	/// Count one member as terminated. The count never passes the member
	/// total; a job whose counts meet is removed by the reaper.
	pub fn note_reaped(&mut self) {
		if self.reaped < self.pids.len() {
			self.reaped += 1;
		}
	}
	pub fn reaped(&self) -> usize {
		self.reaped
	}
	pub fn all_reaped(&self) -> bool {
		self.reaped == self.pids.len()
	}
	pub fn killpg(&self, sig: Signal) -> ShResult<()> {
		Ok(killpg(self.pgid, sig)?)
	}
}

impl fmt::Display for Job {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] ({}) {} {}", self.jid, self.pgid, self.state, self.cmdline)
	}
}

/// Fixed-capacity registry of live jobs. Slot order is stable for the
/// lifetime of a job and is the order `jobs` lists them in.
#[derive(Debug)]
pub struct JobTab {
	slots: Vec<Option<Job>>,
	next_jid: usize,
}

impl Default for JobTab {
	fn default() -> Self {
		Self::new()
	}
}

impl JobTab {
	pub fn new() -> Self {
		Self { slots: vec![None; MAXJOBS], next_jid: 1 }
	}

	/// Register a launched job. Fails when the table is full or the process
	/// group handle is invalid; the caller reports and carries on.
	pub fn add(
		&mut self,
		pgid: Pid,
		pids: Vec<Pid>,
		state: JobState,
		cmdline: &str,
	) -> ShResult<usize> {
		if pgid.as_raw() < 1 {
			return Err(ShErr::simple(
				ShErrKind::InternalErr,
				"job with an invalid process group",
			));
		}
		debug_assert!(
			state != JobState::Foreground || self.fg_pgid().is_none(),
			"second foreground job"
		);
		let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) else {
			return Err(ShErr::simple(ShErrKind::ExecFail, "Tried to create too many jobs"));
		};
		let jid = self.next_jid;
		self.next_jid += 1;
		if self.next_jid > MAXJOBS {
			self.next_jid = 1;
		}
		*slot = Some(Job {
			pgid,
			jid,
			pids,
			reaped: 0,
			state,
			cmdline: cmdline.to_string(),
		});
		flog!(INFO, "Added job [{}] pgid: {} {}", jid, pgid, cmdline);
		Ok(jid)
	}

	/// Clear the slot holding pgid. Job ids are reallocated densely, so the
	/// next id is recomputed from what is still live.
	pub fn remove(&mut self, pgid: Pid) -> bool {
		for slot in self.slots.iter_mut() {
			if slot.as_ref().is_some_and(|job| job.pgid() == pgid) {
				*slot = None;
				self.next_jid = self.max_jid() + 1;
				return true;
			}
		}
		false
	}

	/// Largest job ID currently allocated
	pub fn max_jid(&self) -> usize {
		self.jobs().map(|job| job.jid()).max().unwrap_or(0)
	}

	pub fn jobs(&self) -> impl Iterator<Item = &Job> {
		self.slots.iter().flatten()
	}

	pub fn by_pgid(&self, pgid: Pid) -> Option<&Job> {
		self.jobs().find(|job| job.pgid() == pgid)
	}

	pub fn by_pgid_mut(&mut self, pgid: Pid) -> Option<&mut Job> {
		self.slots
			.iter_mut()
			.flatten()
			.find(|job| job.pgid() == pgid)
	}

	/// Find the job owning one member process. The reaper resolves reaped
	/// children this way, since a terminated child can no longer answer
	/// getpgid() and other members of its group may still be alive.
	pub fn by_pid(&self, pid: Pid) -> Option<&Job> {
		self.jobs().find(|job| job.has_pid(pid))
	}

	pub fn by_pid_mut(&mut self, pid: Pid) -> Option<&mut Job> {
		self.slots.iter_mut().flatten().find(|job| job.has_pid(pid))
	}

	pub fn by_jid(&self, jid: usize) -> Option<&Job> {
		if jid < 1 {
			return None;
		}
		self.jobs().find(|job| job.jid() == jid)
	}

	/// Resolve a job token: `%<jid>` names a job id, a bare number names a
	/// process group
	pub fn by_token(&self, token: &str) -> Option<&Job> {
		if let Some(jid_str) = token.strip_prefix('%') {
			let jid = jid_str.parse::<usize>().ok()?;
			self.by_jid(jid)
		} else {
			let pgid = token.parse::<i32>().ok()?;
			self.by_pgid(Pid::from_raw(pgid))
		}
	}

	/// Process group of the foreground job, if there is one
	pub fn fg_pgid(&self) -> Option<Pid> {
		self.jobs()
			.find(|job| job.state() == JobState::Foreground)
			.map(|job| job.pgid())
	}

	pub fn any_stopped(&self) -> bool {
		self.jobs().any(|job| job.state() == JobState::Stopped)
	}

	pub fn is_empty(&self) -> bool {
		self.jobs().next().is_none()
	}

	pub fn render_list(&self) -> String {
		let mut output = String::new();
		for job in self.jobs() {
			output.push_str(&job.to_string());
			output.push('\n');
		}
		output
	}
}
