use crate::{
	libsh::error::{ShErr, ShErrKind, ShResult},
	prelude::*,
};

/// Max records of history
pub const MAXHISTORY: usize = 10;

/// Ring buffer of the last MAXHISTORY command lines, mirrored to the
/// user's history file on every append. The write index doubles as the
/// position of the oldest record once the ring has wrapped.
#[derive(Debug, Clone)]
pub struct History {
	entries: Vec<String>,
	idx: usize,
	path: Option<PathBuf>,
}

impl Default for History {
	fn default() -> Self {
		Self::new()
	}
}

pub fn history_path(user: &str) -> PathBuf {
	PathBuf::from(format!("./home/{user}/.reed_history"))
}

/// Load the history for the user that just logged in. A missing file is
/// an empty history; adduser pre-creates it for new users.
pub fn load(user: &str) -> ShResult<History> {
	let path = history_path(user);
	let mut history = History::new();
	if path.exists() {
		let content = fs::read_to_string(&path)?;
		for line in content.lines().take(MAXHISTORY) {
			history.entries[history.idx] = line.to_string();
			history.idx = (history.idx + 1) % MAXHISTORY;
		}
	}
	history.path = Some(path);
	Ok(history)
}

impl History {
	pub fn new() -> Self {
		Self {
			entries: vec![String::new(); MAXHISTORY],
			idx: 0,
			path: None,
		}
	}

	/// Index of the oldest record
	fn start(&self) -> usize {
		if self.entries[self.idx].is_empty() {
			0
		} else {
			self.idx
		}
	}

	pub fn add(&mut self, cmdline: &str) -> ShResult<()> {
		self.entries[self.idx] = cmdline.trim().to_string();
		self.idx = (self.idx + 1) % MAXHISTORY;
		self.save()
	}

	fn save(&self) -> ShResult<()> {
		let Some(path) = &self.path else {
			return Ok(());
		};
		let mut file = File::create(path)?;
		let mut pos = self.start();
		for _ in 0..MAXHISTORY {
			if self.entries[pos].is_empty() {
				break;
			}
			writeln!(file, "{}", self.entries[pos])?;
			pos = (pos + 1) % MAXHISTORY;
		}
		Ok(())
	}

	/// Render the numbered listing, oldest first
	pub fn render_list(&self) -> String {
		let mut output = String::new();
		let mut pos = self.start();
		for count in 0..MAXHISTORY {
			if self.entries[pos].is_empty() {
				break;
			}
			output.push_str(&format!("{} {}\n", count + 1, self.entries[pos]));
			pos = (pos + 1) % MAXHISTORY;
		}
		output
	}

	/// Fetch the nth record, 1-based from the oldest
	pub fn nth(&self, n: usize) -> Option<&str> {
		if n == 0 || n > MAXHISTORY {
			return None;
		}
		let entry = &self.entries[(self.start() + n - 1) % MAXHISTORY];
		if entry.is_empty() {
			None
		} else {
			Some(entry)
		}
	}
}

/// The `history` builtin
pub fn list(argv: &[String]) -> ShResult<()> {
	if argv.len() > 1 {
		return Err(ShErr::simple(ShErrKind::HistoryErr, "too many arguments"));
	}
	let listing = crate::state::read_history(|h| h.render_list());
	print!("{listing}");
	Ok(())
}

/// The `!<n>` builtin: replay a recorded command line through the full
/// evaluate path
pub fn replay(argv: &[String]) -> ShResult<()> {
	let n_str = argv[0].strip_prefix('!').unwrap_or_default();
	let n = n_str.parse::<usize>().unwrap_or(0);
	if n > MAXHISTORY {
		return Err(ShErr::simple(
			ShErrKind::HistoryErr,
			format!("only support the last {MAXHISTORY} commands"),
		));
	}
	let cmdline = crate::state::read_history(|h| h.nth(n).map(|s| s.to_string()));
	let Some(cmdline) = cmdline else {
		return Err(ShErr::simple(
			ShErrKind::HistoryErr,
			format!("no {n}th command yet"),
		));
	};
	crate::exec::eval(&cmdline)
}
