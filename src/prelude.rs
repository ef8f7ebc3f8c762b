// Standard Library Common IO and FS Abstractions
pub use std::env;
pub use std::ffi::{CStr, CString};
pub use std::fmt;
pub use std::fs::{self, File, OpenOptions};
pub use std::io::{self, BufRead, Read, Write};
pub use std::path::{Path, PathBuf};
pub use std::process::exit;

// Unix-specific IO abstractions
pub use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};

// Nix crate for POSIX APIs
pub use bitflags::bitflags;
pub use nix::{
	errno::Errno,
	fcntl::{fcntl, FcntlArg},
	libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO},
	sys::{
		signal::{
			killpg, pthread_sigmask, sigaction, SaFlags, SigAction, SigHandler, SigSet,
			SigmaskHow, Signal,
		},
		wait::{waitpid, WaitPidFlag as WtFlag, WaitStatus as WtStat},
	},
	unistd::{close, dup2, execvpe, fork, getpid, getppid, pipe, setpgid, ForkResult, Pid},
};

pub use crate::flog;
pub use crate::libsh::flog::LogLevel::*;
