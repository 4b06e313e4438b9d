use nix::errno::Errno;
use nix::sys::wait::{self, WaitStatus};
use nix::unistd::Pid;
use tracing::debug;

use crate::error::ShellError;
use crate::types::ExitStatus;

trait WaitStatusExt {
	fn get_pid(self) -> Option<Pid>;
	fn exit_status(self) -> Option<ExitStatus>;
}

impl WaitStatusExt for WaitStatus {
	fn get_pid(self) -> Option<Pid> {
		self.pid()
	}

	fn exit_status(self) -> Option<ExitStatus> {
		match self {
			WaitStatus::Exited(_, code) => Some(ExitStatus::Exited(code as u8)),
			WaitStatus::Signaled(_, sig, _) => Some(ExitStatus::Signaled(sig)),
			_ => None,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Process {
	pub pid: Pid,
	/// `None` until the process has been reaped.
	pub status: Option<ExitStatus>,
}

/// Processes spawned for one pipeline, in stage order.
#[derive(Debug, Default)]
pub struct Job {
	processes: Vec<Process>,
}

impl Job {
	pub fn with_capacity(size_hint: usize) -> Job {
		Job { processes: Vec::with_capacity(size_hint) }
	}

	pub fn push(&mut self, pid: Pid) {
		self.processes.push(Process { pid: pid, status: None });
	}

	pub fn processes(&self) -> &[Process] {
		&self.processes
	}

	pub fn is_terminated(&self) -> bool {
		self.processes.iter().all(|pr| pr.status.is_some())
	}

	/// Status of the last stage, once it has been reaped.
	pub fn last_status(&self) -> Option<ExitStatus> {
		self.processes.last().and_then(|pr| pr.status)
	}

	/// Blocks until every tracked process has terminated and been reaped.
	/// Keeps going after a failed wait so later stages are not left behind;
	/// the first failure is returned.
	pub fn wait(&mut self) -> Result<(), ShellError> {
		let mut first_err = None;
		for pr in self.processes.iter_mut().filter(|pr| pr.status.is_none()) {
			match reap(pr.pid) {
				Ok(status) => {
					debug!(pid = %pr.pid, code = status.code(), "reaped");
					pr.status = Some(status);
				},
				Err(e) => {
					first_err.get_or_insert(e);
				},
			}
		}
		match first_err {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}
}

fn reap(pid: Pid) -> Result<ExitStatus, ShellError> {
	loop {
		match wait::waitpid(pid, None) {
			Ok(status) => {
				debug_assert_eq!(status.get_pid(), Some(pid));
				if let Some(s) = status.exit_status() {
					return Ok(s);
				}
			},
			Err(Errno::EINTR) => {},
			Err(e) => return Err(ShellError::Wait(e)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use nix::sys::signal::Signal;

	#[test]
	fn only_terminal_statuses_map() {
		let pid = Pid::from_raw(42);
		assert_eq!(WaitStatus::Exited(pid, 3).exit_status(), Some(ExitStatus::Exited(3)));
		assert_eq!(WaitStatus::Signaled(pid, Signal::SIGTERM, false).exit_status(),
		           Some(ExitStatus::Signaled(Signal::SIGTERM)));
		assert_eq!(WaitStatus::Stopped(pid, Signal::SIGSTOP).exit_status(), None);
		assert_eq!(WaitStatus::StillAlive.exit_status(), None);
	}

	#[test]
	fn empty_job_is_terminated() {
		let mut job = Job::default();
		assert!(job.is_terminated());
		assert!(job.wait().is_ok());
		assert_eq!(job.last_status(), None);
	}
}
