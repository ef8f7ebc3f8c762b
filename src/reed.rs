pub mod auth;
pub mod builtin;
pub mod exec;
pub mod history;
pub mod jobs;
pub mod libsh;
pub mod parse;
pub mod prelude;
pub mod procfs;
pub mod signal;
pub mod state;
#[cfg(test)]
pub mod tests;

use clap::Parser;
use libsh::{
	error::fatal,
	flog::{set_log_level, LogLevel},
	term::{Style, Styled},
};

use crate::prelude::*;

/// A tiny login shell with job control
#[derive(Parser, Debug)]
#[command(name = "reed")]
struct Cli {
	/// Print additional diagnostic information
	#[arg(short, long)]
	verbose: bool,
	/// Do not emit a command prompt (handy for automated testing)
	#[arg(short = 'p', long)]
	no_prompt: bool,
}

fn main() {
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(e) => {
			// Covers -h as well; usage always terminates
			let _ = e.print();
			exit(1);
		}
	};
	if cli.verbose {
		set_log_level(LogLevel::DEBUG);
	}

	// The test driver reads everything from the pipe connected to stdout
	if let Err(e) = dup2(STDOUT_FILENO, STDERR_FILENO) {
		fatal("dup2", e.into());
	}

	signal::sig_setup();

	let username = match auth::login() {
		Ok(name) => name,
		Err(e) => fatal("login", e),
	};
	state::set_username(&username);
	flog!(INFO, "logged in as {}", username);

	if let Err(e) = procfs::add("reed", state::shell_pid(), getppid(), "Rs+") {
		fatal("proc", e);
	}

	match history::load(&username) {
		Ok(history) => state::init_history(history),
		Err(e) => fatal("history", e),
	}

	repl(cli.no_prompt);
}

/// The read/eval loop. Pending signals are drained between lines; this
/// and wait_fg are the only points where signals take effect.
fn repl(no_prompt: bool) -> ! {
	loop {
		if let Err(e) = signal::check_signals() {
			e.print();
		}

		if !no_prompt {
			print!("{}", "reed> ".styled(Style::Blue));
			io::stdout().flush().ok();
		}

		let mut line = String::new();
		match io::stdin().lock().read_line(&mut line) {
			Ok(0) => {
				// End of file (ctrl-d)
				io::stdout().flush().ok();
				exit(0);
			}
			Ok(_) => {
				if let Err(e) = exec::eval(&line) {
					e.print();
				}
				io::stdout().flush().ok();
			}
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => fatal("read", e.into()),
		}
	}
}
