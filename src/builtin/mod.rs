pub mod jobctl;

use crate::{
	auth, history,
	libsh::error::{ShErr, ShErrKind, ShResult},
	parse::Stage,
};

/// Execute a command that runs inside the interpreter process itself.
/// The parser has already classified the stage; an unknown name here is a
/// programming error, not user input.
pub fn dispatch(stage: &Stage) -> ShResult<()> {
	let argv = &stage.argv;
	match stage.cmd() {
		"jobs" => jobctl::jobs(argv),
		"bg" => jobctl::continue_job(argv, false),
		"fg" => jobctl::continue_job(argv, true),
		"adduser" => auth::add_user(argv),
		"history" => history::list(argv),
		"logout" => jobctl::logout(),
		"quit" => jobctl::quit(),
		replay if replay.starts_with('!') => history::replay(argv),
		other => Err(ShErr::simple(
			ShErrKind::InternalErr,
			format!("`{other}' dispatched as a builtin"),
		)),
	}
}
