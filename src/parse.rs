use crate::{
	libsh::error::{ShErr, ShErrKind, ShResult},
	prelude::*,
};

pub const BUILTIN_NAMES: [&str; 7] = ["jobs", "bg", "fg", "adduser", "history", "logout", "quit"];

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct LineFlags: u8 {
		const BACKGROUND   = 0b0000_0001;
		const SKIP_HISTORY = 0b0000_0010;
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirMode {
	Input,
	Output,
}

/// Where the redirected data comes from: a path to open, or a descriptor
/// that is already open in the execution environment (`&<fd>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirSrc {
	File(PathBuf),
	Fd(RawFd),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redir {
	pub tgt_fd: RawFd,
	pub mode: RedirMode,
	pub src: RedirSrc,
}

/// One pipeline segment: its argument list, its redirections in source
/// order, and whether it names a builtin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
	pub argv: Vec<String>,
	pub redirs: Vec<Redir>,
	pub builtin: bool,
}

impl Stage {
	pub fn cmd(&self) -> &str {
		self.argv.first().map(|s| s.as_str()).unwrap_or_default()
	}
}

#[derive(Debug, Clone, Default)]
pub struct ParsedLine {
	pub stages: Vec<Stage>,
	pub flags: LineFlags,
}

impl ParsedLine {
	fn blank() -> Self {
		Self::default()
	}
	pub fn is_blank(&self) -> bool {
		self.stages.is_empty()
	}
	pub fn background(&self) -> bool {
		self.flags.contains(LineFlags::BACKGROUND)
	}
	/// Number of stages that will become forked processes
	pub fn extern_count(&self) -> usize {
		self.stages.iter().filter(|stage| !stage.builtin).count()
	}
}

/// Parse one command line into pipeline stages.
///
/// Blank lines and syntactically incomplete pipelines (an empty stage
/// anywhere, e.g. a dangling trailing pipe) come back with no stages and
/// are ignored by the caller.
pub fn parse(line: &str) -> ShResult<ParsedLine> {
	let tokens = tokenize(line);

	let mut stages: Vec<Vec<String>> = vec![vec![]];
	for token in tokens {
		if token == "|" {
			if stages.last().unwrap().is_empty() {
				return Ok(ParsedLine::blank());
			}
			stages.push(vec![]);
		} else {
			stages.last_mut().unwrap().push(token);
		}
	}
	if stages.last().unwrap().is_empty() {
		// Covers both the blank line and the incomplete pipeline
		return Ok(ParsedLine::blank());
	}

	let mut flags = LineFlags::empty();

	let last = stages.last_mut().unwrap();
	if last.last().is_some_and(|tk| tk == "&") {
		last.pop();
		if last.is_empty() {
			return Ok(ParsedLine::blank());
		}
		flags |= LineFlags::BACKGROUND;
	}

	let mut parsed = vec![];
	for tokens in stages {
		let stage = build_stage(tokens)?;
		if stage.cmd().starts_with('!') {
			flags |= LineFlags::SKIP_HISTORY;
		}
		parsed.push(stage);
	}

	Ok(ParsedLine { stages: parsed, flags })
}

/// Split on whitespace, with single- and double-quoted spans kept as one
/// token and their quotes stripped. One quote style is active at a time;
/// there is no nesting and no escaping.
fn tokenize(line: &str) -> Vec<String> {
	let mut tokens = vec![];
	let mut chars = line.chars().peekable();

	while let Some(ch) = chars.peek().copied() {
		if ch.is_whitespace() {
			chars.next();
			continue;
		}
		let mut token = String::new();
		if ch == '\'' || ch == '"' {
			let quote = ch;
			chars.next();
			for span_ch in chars.by_ref() {
				if span_ch == quote {
					break;
				}
				token.push(span_ch);
			}
		} else {
			while let Some(word_ch) = chars.peek().copied() {
				if word_ch.is_whitespace() || word_ch == '\'' || word_ch == '"' {
					break;
				}
				token.push(word_ch);
				chars.next();
			}
		}
		tokens.push(token);
	}

	tokens
}

/*
 * Redirection operations follow the POSIX shell format:
 * [n]redir-op target
 *
 * n is an optional target descriptor with no space before redir-op.
 * redir-op is '>' or '<'; the target descriptor defaults to stdout/stdin.
 * target is a path, or &<fd> naming an already-open descriptor.
 * Spaces between redir-op and target are allowed (the target is then the
 * following token).
 */
fn build_stage(tokens: Vec<String>) -> ShResult<Stage> {
	let mut argv = vec![];
	let mut redirs = vec![];
	let mut tokens = tokens.into_iter();

	while let Some(token) = tokens.next() {
		let op_idx = token.find('>').or_else(|| token.find('<'));
		let Some(op_idx) = op_idx else {
			argv.push(token);
			continue;
		};

		let op = token[op_idx..].chars().next().unwrap();
		let mode = match op {
			'>' => RedirMode::Output,
			_ => RedirMode::Input,
		};

		let prefix = &token[..op_idx];
		let tgt_fd = if prefix.is_empty() {
			match mode {
				RedirMode::Input => STDIN_FILENO,
				RedirMode::Output => STDOUT_FILENO,
			}
		} else {
			parse_fd(prefix)?
		};

		let operand = if op_idx == token.len() - 1 {
			tokens.next().ok_or_else(|| {
				ShErr::simple(ShErrKind::SyntaxErr, format!("`{op}' with no target"))
			})?
		} else {
			token[op_idx + 1..].to_string()
		};

		let src = if let Some(fd_str) = operand.strip_prefix('&') {
			RedirSrc::Fd(parse_fd(fd_str)?)
		} else {
			RedirSrc::File(PathBuf::from(operand))
		};

		redirs.push(Redir { tgt_fd, mode, src });
	}

	if argv.is_empty() {
		return Err(ShErr::simple(
			ShErrKind::SyntaxErr,
			"redirection with no command",
		));
	}

	let builtin = is_builtin(&argv[0]);
	Ok(Stage { argv, redirs, builtin })
}

fn parse_fd(s: &str) -> ShResult<RawFd> {
	s.parse::<RawFd>()
		.map_err(|_| ShErr::simple(ShErrKind::SyntaxErr, format!("bad file descriptor `{s}'")))
}

fn is_builtin(cmd: &str) -> bool {
	BUILTIN_NAMES.contains(&cmd) || cmd.starts_with('!')
}
