//! Rebinding of the process's standard streams.
//!
//! Every descriptor here is an `OwnedFd`: whatever is not installed onto
//! stdin/stdout is closed on drop, whichever path returns.

use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::path::Path;

use nix::fcntl::{self, FcntlArg, FdFlag, OFlag};
use nix::sys::stat::Mode;
use nix::unistd;

use crate::error::ShellError;
use crate::types::Stage;

pub const STDIN: RawFd = libc::STDIN_FILENO;
pub const STDOUT: RawFd = libc::STDOUT_FILENO;

fn open(path: &Path, flags: OFlag, mode: Mode) -> Result<OwnedFd, ShellError> {
	let fd = fcntl::open(path, flags | OFlag::O_CLOEXEC, mode)
		.map_err(|e| ShellError::FileAccess { path: path.to_owned(), source: e })?;
	Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub fn open_input(path: &Path) -> Result<OwnedFd, ShellError> {
	open(path, OFlag::O_RDONLY, Mode::empty())
}

pub fn open_output(path: &Path) -> Result<OwnedFd, ShellError> {
	let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
	open(path, OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC, mode)
}

/// Makes `fd` the descriptor `target` and closes the original.
pub fn rebind(fd: OwnedFd, target: RawFd) -> Result<(), ShellError> {
	if fd.as_raw_fd() == target {
		// dup2 onto itself keeps FD_CLOEXEC set, so clear it by hand.
		fcntl::fcntl(target, FcntlArg::F_SETFD(FdFlag::empty())).map_err(ShellError::Descriptor)?;
		let _ = fd.into_raw_fd();
		return Ok(());
	}
	unistd::dup2(fd.as_raw_fd(), target).map_err(ShellError::Descriptor)?;
	Ok(())
}

/// Close-on-exec duplicate of `fd`.
pub fn duplicate(fd: RawFd) -> Result<OwnedFd, ShellError> {
	let new = fcntl::fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(0)).map_err(ShellError::Descriptor)?;
	Ok(unsafe { OwnedFd::from_raw_fd(new) })
}

/// Files a stage redirects to, opened but not yet installed.
#[derive(Debug, Default)]
pub struct Redirection {
	input: Option<OwnedFd>,
	output: Option<OwnedFd>,
}

impl Redirection {
	/// Opens both targets before anything is rebound, so a failure leaves
	/// the current streams as they were.
	pub fn open(stage: &Stage) -> Result<Redirection, ShellError> {
		let input = match stage.input_file() {
			Some(path) => Some(open_input(path)?),
			None => None,
		};
		let output = match stage.output_file() {
			Some(path) => Some(open_output(path)?),
			None => None,
		};
		Ok(Redirection { input: input, output: output })
	}

	pub fn install(self) -> Result<(), ShellError> {
		if let Some(fd) = self.input {
			rebind(fd, STDIN)?;
		}
		if let Some(fd) = self.output {
			rebind(fd, STDOUT)?;
		}
		Ok(())
	}
}

/// Rebinds stdin/stdout to the stage's files for the rest of the process's
/// life. Callers wanting the old streams back save a `StreamBindings` first.
pub fn apply(stage: &Stage) -> Result<(), ShellError> {
	Redirection::open(stage)?.install()
}

/// Saved copies of the current stdin/stdout.
#[derive(Debug)]
pub struct StreamBindings {
	stdin: OwnedFd,
	stdout: OwnedFd,
}

impl StreamBindings {
	pub fn save() -> Result<StreamBindings, ShellError> {
		let stdin = duplicate(STDIN)?;
		let stdout = duplicate(STDOUT)?;
		Ok(StreamBindings { stdin: stdin, stdout: stdout })
	}

	/// Puts the saved streams back on 0 and 1; the duplicates are closed
	/// even if rebinding fails.
	pub fn restore(self) -> Result<(), ShellError> {
		let stdin = unistd::dup2(self.stdin.as_raw_fd(), STDIN);
		let stdout = unistd::dup2(self.stdout.as_raw_fd(), STDOUT);
		stdin.and(stdout).map(drop).map_err(ShellError::Descriptor)
	}
}
