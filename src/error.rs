use std::ffi;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
	#[error("cannot fork: {0}")]
	Spawn(#[source] Errno),
	#[error("cannot create pipe: {0}")]
	PipeCreation(#[source] Errno),
	#[error("{}: {source}", .path.display())]
	FileAccess { path: PathBuf, source: Errno },
	#[error("{0}: command not found")]
	CommandNotFound(String),
	#[error("{name}: {source}")]
	Exec { name: String, source: Errno },
	#[error("cannot rebind descriptor: {0}")]
	Descriptor(#[source] Errno),
	#[error("wait failed: {0}")]
	Wait(#[source] Errno),
	#[error("argument contains a nul byte")]
	Nul(#[from] ffi::NulError),
}

impl ShellError {
	/// Status a spawned child exits with after reporting this error.
	pub fn child_status(&self) -> u8 {
		match *self {
			ShellError::CommandNotFound(_) => 127,
			ShellError::Exec { source: Errno::ENOENT, .. } => 127,
			ShellError::Exec { .. } => 126,
			_ => 1,
		}
	}
}
