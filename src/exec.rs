use std::convert::Infallible;
use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, ForkResult, Pid};
use tracing::debug;

use crate::error::ShellError;
use crate::redirect::{self, Redirection};
use crate::search::SearchCache;
use crate::types::{Stage, StageIo};

fn do_exec_stage(stage: &Stage, program: Option<&Path>, fds: StageIo) -> Result<Infallible, ShellError> {
	let redirection = Redirection::open(stage)?;
	// A file target replaces the pipe end for that direction.
	if stage.input_file().is_none() {
		if let Some(fd) = fds.input {
			redirect::rebind(fd, redirect::STDIN)?;
		}
	}
	if stage.output_file().is_none() {
		if let Some(fd) = fds.output {
			redirect::rebind(fd, redirect::STDOUT)?;
		}
	}
	redirection.install()?;

	let program = match program {
		Some(p) => p,
		None => return Err(ShellError::CommandNotFound(stage.program().to_owned())),
	};
	let path = CString::new(program.as_os_str().as_bytes())?;
	let argv: Result<Vec<CString>, _> = stage.argv().iter().map(|s| CString::new(s.as_bytes())).collect();
	let argv = argv?;
	// The shell ignores SIGPIPE; programs expect the default disposition.
	let _ = unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) };
	unistd::execv(&path, &argv).map_err(|e| ShellError::Exec { name: stage.program().to_owned(), source: e })
}

fn exec_stage(stage: &Stage, program: Option<&Path>, fds: StageIo) -> ! {
	let status = match do_exec_stage(stage, program, fds) {
		Ok(never) => match never {},
		Err(e) => {
			let _ = writeln!(io::stderr(), "lsh: {}", e);
			e.child_status()
		},
	};
	unsafe { libc::_exit(status as libc::c_int) }
}

/// Forks a process running `stage` with the descriptors in `fds` and returns
/// its pid without waiting. The parent's copies of `fds` are closed before
/// this returns.
pub fn spawn(search: &mut SearchCache, stage: &Stage, fds: StageIo) -> Result<Pid, ShellError> {
	let program = search.lookup(stage.program());
	match unsafe { unistd::fork() }.map_err(ShellError::Spawn)? {
		ForkResult::Parent { child } => {
			drop(fds);
			debug!(pid = %child, program = stage.program(), "spawned");
			Ok(child)
		},
		ForkResult::Child => exec_stage(stage, program.as_deref(), fds),
	}
}
