use std::sync::{LazyLock, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{history::History, jobs::JobTab, prelude::*};

pub static JOB_TABLE: LazyLock<RwLock<JobTab>> = LazyLock::new(|| RwLock::new(JobTab::new()));

pub static HISTORY: LazyLock<RwLock<History>> = LazyLock::new(|| RwLock::new(History::new()));

static USERNAME: OnceLock<String> = OnceLock::new();

static SHELL_PID: OnceLock<Pid> = OnceLock::new();

/// Read from the job table
pub fn read_jobs<T, F: FnOnce(RwLockReadGuard<JobTab>) -> T>(f: F) -> T {
	let lock = JOB_TABLE.read().unwrap();
	f(lock)
}

/// Write to the job table
pub fn write_jobs<T, F: FnOnce(&mut RwLockWriteGuard<JobTab>) -> T>(f: F) -> T {
	let lock = &mut JOB_TABLE.write().unwrap();
	f(lock)
}

/// Read from the command history
pub fn read_history<T, F: FnOnce(RwLockReadGuard<History>) -> T>(f: F) -> T {
	let lock = HISTORY.read().unwrap();
	f(lock)
}

/// Write to the command history
pub fn write_history<T, F: FnOnce(&mut RwLockWriteGuard<History>) -> T>(f: F) -> T {
	let lock = &mut HISTORY.write().unwrap();
	f(lock)
}

/// Install the history loaded for the user that logged in
pub fn init_history(history: History) {
	write_history(|h| **h = history);
}

/// Record the user that logged in. Set once, right after login().
pub fn set_username(name: &str) {
	USERNAME.set(name.to_string()).ok();
}

pub fn username() -> String {
	USERNAME.get().cloned().unwrap_or_default()
}

/// The interpreter's own pid, pinned at startup. Forked children exec
/// before they could ever observe it.
pub fn shell_pid() -> Pid {
	*SHELL_PID.get_or_init(getpid)
}
