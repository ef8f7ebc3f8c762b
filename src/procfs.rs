//! Mirror of each managed process's externally visible status, written
//! under ./proc/<pid>/status the way the kernel exposes /proc entries.
//! Pure I/O; nothing in job control reads these back.

use crate::{libsh::error::ShResult, prelude::*, state};

fn proc_dir(pid: Pid) -> PathBuf {
	PathBuf::from(format!("./proc/{pid}"))
}

fn status_path(pid: Pid) -> PathBuf {
	proc_dir(pid).join("status")
}

pub fn add(name: &str, pid: Pid, ppid: Pid, stat: &str) -> ShResult<()> {
	fs::create_dir_all(proc_dir(pid))?;
	write_status(name, pid, ppid, stat)
}

fn write_status(name: &str, pid: Pid, ppid: Pid, stat: &str) -> ShResult<()> {
	let mut file = File::create(status_path(pid))?;
	writeln!(file, "Name: {name}")?;
	writeln!(file, "Pid: {pid}")?;
	writeln!(file, "PPid: {ppid}")?;
	writeln!(file, "PGid: {pid}")?;
	writeln!(file, "Sid: {}", state::shell_pid())?;
	writeln!(file, "STAT: {stat}")?;
	writeln!(file, "Username: {}", state::username())?;
	Ok(())
}

/// Rewrite the STAT line of an existing entry. The entry may already be
/// gone (the member terminated and was reaped); that is not an error.
pub fn change_stat(pid: Pid, stat: &str) -> ShResult<()> {
	let path = status_path(pid);
	if !path.exists() {
		return Ok(());
	}
	let content = fs::read_to_string(&path)?;
	let mut file = File::create(&path)?;
	for line in content.lines().take(5) {
		writeln!(file, "{line}")?;
	}
	writeln!(file, "STAT: {stat}")?;
	writeln!(file, "Username: {}", state::username())?;
	Ok(())
}

pub fn remove(pid: Pid) -> ShResult<()> {
	fs::remove_file(status_path(pid))?;
	fs::remove_dir(proc_dir(pid))?;
	Ok(())
}
