use std::fmt::Display;

use crate::{
	libsh::term::{Style, Styled},
	prelude::*,
};

pub type ShResult<T> = Result<T, ShErr>;

#[derive(Debug, Clone)]
pub struct ShErr {
	kind: ShErrKind,
	notes: Vec<String>,
}

impl ShErr {
	pub fn simple(kind: ShErrKind, msg: impl Into<String>) -> Self {
		Self { kind, notes: vec![msg.into()] }
	}
	/// Report a recoverable error to the user and carry on
	pub fn print(&self) {
		eprintln!("{}", self.to_string().styled(Style::Red));
	}
}

impl Display for ShErr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.notes.is_empty() {
			write!(f, "{}", self.kind)
		} else {
			write!(f, "{} - {}", self.kind, self.notes.first().unwrap())
		}
	}
}

impl From<io::Error> for ShErr {
	fn from(e: io::Error) -> Self {
		ShErr::simple(ShErrKind::IoErr(e.kind()), e.to_string())
	}
}

impl From<Errno> for ShErr {
	fn from(value: Errno) -> Self {
		ShErr::simple(ShErrKind::Errno(value), value.desc())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShErrKind {
	IoErr(io::ErrorKind),
	Errno(Errno),
	SyntaxErr,
	CmdNotFound,
	ExecFail,
	HistoryErr,
	AuthErr,
	InternalErr,
}

impl Display for ShErrKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let output = match self {
			Self::IoErr(e) => &format!("I/O Error: {e}"),
			Self::Errno(e) => &format!("Errno: {}", e.desc()),
			Self::SyntaxErr => "Syntax Error",
			Self::CmdNotFound => "Command not found",
			Self::ExecFail => "Execution Failed",
			Self::HistoryErr => "History Error",
			Self::AuthErr => "Authentication Error",
			Self::InternalErr => "Internal Error",
		};
		write!(f, "{output}")
	}
}

/// Unrecoverable system call failure. Report the failing operation and die.
pub fn fatal(op: &str, err: ShErr) -> ! {
	eprintln!("{}", format!("{op}: {err}").styled(Style::Red));
	exit(1);
}
