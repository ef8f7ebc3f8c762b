use crate::{
	history,
	libsh::{
		error::{ShErr, ShErrKind, ShResult},
		term::{Style, Styled},
	},
	prelude::*,
	state,
};

/// Flat user store, one `name:password:home` line per user
pub const PASSWD_PATH: &str = "./etc/passwd";

/// Look up a user in the passwd file, returning their password
fn lookup(name: &str) -> ShResult<Option<String>> {
	let content = fs::read_to_string(PASSWD_PATH)?;
	for line in content.lines() {
		let mut fields = line.split(':');
		if fields.next() == Some(name) {
			return Ok(fields.next().map(|pass| pass.to_string()));
		}
	}
	Ok(None)
}

pub fn check_auth(name: &str, password: &str) -> ShResult<bool> {
	Ok(lookup(name)?.is_some_and(|stored| stored == password))
}

fn prompt_line(prompt: &str) -> ShResult<String> {
	print!("{prompt}");
	io::stdout().flush()?;
	let mut line = String::new();
	if io::stdin().lock().read_line(&mut line)? == 0 {
		// End of input at a login prompt; leave quietly
		exit(0);
	}
	Ok(line.trim_end_matches('\n').to_string())
}

/// Have a user log into the shell. Loops until a name/password pair checks
/// out against the user store; entering `quit` at either prompt exits.
pub fn login() -> ShResult<String> {
	loop {
		let name = prompt_line("username: ")?;
		if name == "quit" {
			exit(0);
		}
		let password = prompt_line("password: ")?;
		if password == "quit" {
			exit(0);
		}

		if check_auth(&name, &password)? {
			return Ok(name);
		}
		eprintln!(
			"{}",
			"User Authentication failed. Please try again.".styled(Style::Red)
		);
	}
}

/// The `adduser` builtin: append to the user store and seed the new
/// user's home directory with an empty history file
pub fn add_user(argv: &[String]) -> ShResult<()> {
	if state::username() != "root" {
		return Err(ShErr::simple(
			ShErrKind::AuthErr,
			"root privileges required to run adduser.",
		));
	}
	if argv.len() < 3 {
		return Err(ShErr::simple(ShErrKind::AuthErr, "need more arguments"));
	}
	if argv.len() > 3 {
		return Err(ShErr::simple(ShErrKind::AuthErr, "too many arguments"));
	}
	let (name, password) = (&argv[1], &argv[2]);

	if lookup(name)?.is_some() {
		return Err(ShErr::simple(ShErrKind::AuthErr, "User already exists"));
	}

	let mut passwd = OpenOptions::new().append(true).open(PASSWD_PATH)?;
	writeln!(passwd, "{name}:{password}:/home/{name}")?;

	fs::create_dir_all(format!("./home/{name}"))?;
	File::create(history::history_path(name))?;
	Ok(())
}
