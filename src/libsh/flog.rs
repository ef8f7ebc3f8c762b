use std::fmt::Display;
use std::sync::atomic::{AtomicU8, Ordering};

use super::term::{Style, Styled};

/// Log level set by the `-v` flag, if any. Overrides the environment.
static LEVEL_OVERRIDE: AtomicU8 = AtomicU8::new(0);

#[derive(Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Debug)]
#[repr(u8)]
pub enum LogLevel {
	NONE = 0,
	ERROR = 1,
	WARN = 2,
	INFO = 3,
	DEBUG = 4,
	TRACE = 5,
}

impl Display for LogLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use LogLevel::*;
		match self {
			ERROR => write!(f, "{}", "ERROR".styled(Style::Red | Style::Bold)),
			WARN => write!(f, "{}", "WARN".styled(Style::Yellow | Style::Bold)),
			INFO => write!(f, "{}", "INFO".styled(Style::Green | Style::Bold)),
			DEBUG => write!(f, "{}", "DEBUG".styled(Style::Magenta | Style::Bold)),
			TRACE => write!(f, "{}", "TRACE".styled(Style::Blue | Style::Bold)),
			NONE => write!(f, ""),
		}
	}
}

pub fn set_log_level(level: LogLevel) {
	LEVEL_OVERRIDE.store(level as u8, Ordering::SeqCst);
}

pub fn log_level() -> LogLevel {
	use LogLevel::*;
	let flag_level = LEVEL_OVERRIDE.load(Ordering::SeqCst);
	if flag_level != 0 {
		return match flag_level {
			1 => ERROR,
			2 => WARN,
			3 => INFO,
			4 => DEBUG,
			_ => TRACE,
		};
	}
	let level = std::env::var("REED_LOG_LEVEL").unwrap_or_default();
	match level.to_lowercase().as_str() {
		"error" => ERROR,
		"warn" => WARN,
		"info" => INFO,
		"debug" => DEBUG,
		"trace" => TRACE,
		_ => NONE,
	}
}

/// A structured logging macro for `reed`.
///
/// Prints log messages with the log level, filename, and line number.
/// The level comes from the `-v` flag or the `REED_LOG_LEVEL` environment
/// variable.
///
/// Supports formatted messages like `println!`:
///
/// ```rust
/// flog!(ERROR, "foo is {}", foo);
/// ```
///
/// bare literals, one line each:
///
/// ```rust
/// flog!(WARN, "foo", "bar");
/// ```
///
/// and expressions, logged as `name = value`:
///
/// ```rust
/// flog!(DEBUG, job);
/// ```
#[macro_export]
macro_rules! flog {
	($level:path, $fmt:literal, $($args:expr),+ $(,)?) => {{
		use $crate::libsh::flog::log_level;
		use $crate::libsh::term::Styled;
		use $crate::libsh::term::Style;

		if $level <= log_level() {
			let file = file!().styled(Style::Cyan);
			let line = line!().to_string().styled(Style::Cyan);

			eprintln!(
				"[{}][{}:{}] {}",
				$level, file, line, format!($fmt, $($args),+)
			);
		}
	}};

	($level:path, $($val:expr),+ $(,)?) => {{
		use $crate::libsh::flog::log_level;
		use $crate::libsh::term::Styled;
		use $crate::libsh::term::Style;

		if $level <= log_level() {
			let file = file!().styled(Style::Cyan);
			let line = line!().to_string().styled(Style::Cyan);

			$(
				let val_name = stringify!($val);
				eprintln!(
					"[{}][{}:{}] {} = {:#?}",
					$level, file, line, val_name, &$val
				);
			)+
		}
	}};

	($level:path, $($lit:literal),+ $(,)?) => {{
		use $crate::libsh::flog::log_level;
		use $crate::libsh::term::Styled;
		use $crate::libsh::term::Style;

		if $level <= log_level() {
			let file = file!().styled(Style::Cyan);
			let line = line!().to_string().styled(Style::Cyan);

			$(
				eprintln!(
					"[{}][{}:{}] {}",
					$level, file, line, $lit
				);
			)+
		}
	}};
}
