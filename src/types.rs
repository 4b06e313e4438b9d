use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};

use nix::sys::signal::Signal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
	args: Vec<String>,
	input_file: Option<PathBuf>,
	output_file: Option<PathBuf>,
}

impl Stage {
	pub fn new<S: Into<String>>(program: S) -> Stage {
		Stage { args: vec![program.into()], input_file: None, output_file: None }
	}

	pub fn arg<S: Into<String>>(mut self, arg: S) -> Stage {
		self.args.push(arg.into());
		self
	}

	pub fn args<I, S>(mut self, args: I) -> Stage where I: IntoIterator<Item = S>, S: Into<String> {
		self.args.extend(args.into_iter().map(Into::into));
		self
	}

	pub fn input_from<P: Into<PathBuf>>(mut self, path: P) -> Stage {
		self.input_file = Some(path.into());
		self
	}

	pub fn output_to<P: Into<PathBuf>>(mut self, path: P) -> Stage {
		self.output_file = Some(path.into());
		self
	}

	pub fn program(&self) -> &str {
		&self.args[0]
	}

	/// Full argument vector, program name included.
	pub fn argv(&self) -> &[String] {
		&self.args
	}

	/// Arguments after the program name.
	pub fn arguments(&self) -> &[String] {
		&self.args[1..]
	}

	pub fn input_file(&self) -> Option<&Path> {
		self.input_file.as_deref()
	}

	pub fn output_file(&self) -> Option<&Path> {
		self.output_file.as_deref()
	}

	pub fn has_redirects(&self) -> bool {
		self.input_file.is_some() || self.output_file.is_some()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
	stages: Vec<Stage>,
}

impl Pipeline {
	/// Returns `None` for an empty stage list.
	pub fn new(stages: Vec<Stage>) -> Option<Pipeline> {
		if stages.is_empty() {
			None
		} else {
			Some(Pipeline { stages: stages })
		}
	}

	pub fn single(stage: Stage) -> Pipeline {
		Pipeline { stages: vec![stage] }
	}

	pub fn stages(&self) -> &[Stage] {
		&self.stages
	}

	pub fn len(&self) -> usize {
		self.stages.len()
	}
}

/// Descriptors a stage runs with. `None` inherits the shell's stream.
#[derive(Debug, Default)]
pub struct StageIo {
	pub input: Option<OwnedFd>,
	pub output: Option<OwnedFd>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
	Exited(u8),
	Signaled(Signal),
}

impl ExitStatus {
	pub const SUCCESS: ExitStatus = ExitStatus::Exited(0);
	pub const FAILURE: ExitStatus = ExitStatus::Exited(1);

	pub fn success(self) -> bool {
		self == ExitStatus::SUCCESS
	}

	/// Shell convention: signal deaths report as 128 + signal number.
	pub fn code(self) -> i32 {
		match self {
			ExitStatus::Exited(c) => c as i32,
			ExitStatus::Signaled(sig) => 128 + sig as i32,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Continue(ExitStatus),
	Exit(ExitStatus),
}

impl Outcome {
	pub fn status(self) -> ExitStatus {
		match self {
			Outcome::Continue(s) | Outcome::Exit(s) => s,
		}
	}
}
