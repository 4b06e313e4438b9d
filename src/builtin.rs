use std::env;
use std::io::{self, Write};

use tracing::{debug, warn};

use crate::error::ShellError;
use crate::global::State;
use crate::redirect::{self, StreamBindings};
use crate::types::{ExitStatus, Outcome, Stage};

/// Receives the arguments after the command name.
pub type BuiltinFn = fn(&mut State, &[String]) -> Outcome;

pub trait Registry {
	fn lookup(&self, name: &str) -> Option<BuiltinFn>;

	fn is_builtin(&self, name: &str) -> bool {
		self.lookup(name).is_some()
	}
}

/// The shell's own commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct Builtins;

impl Registry for Builtins {
	fn lookup(&self, name: &str) -> Option<BuiltinFn> {
		match_builtin(name)
	}
}

const NAMES: &[&str] = &["cd", "echo", "exit", "help", "pwd", "rehash"];

pub fn builtin_cd(_: &mut State, args: &[String]) -> Outcome {
	let dir = match args.first() {
		Some(dir) => dir.clone(),
		None => match env::var("HOME") {
			Ok(home) => home,
			Err(_) => {
				eprintln!("lsh: cd: HOME not set");
				return Outcome::Continue(ExitStatus::FAILURE);
			},
		},
	};
	match env::set_current_dir(&dir) {
		Ok(()) => Outcome::Continue(ExitStatus::SUCCESS),
		Err(e) => {
			eprintln!("lsh: cd: {}: {}", dir, e);
			Outcome::Continue(ExitStatus::FAILURE)
		},
	}
}

pub fn builtin_pwd(_: &mut State, _: &[String]) -> Outcome {
	let r = env::current_dir().and_then(|dir| writeln!(io::stdout(), "{}", dir.display()));
	match r {
		Ok(()) => Outcome::Continue(ExitStatus::SUCCESS),
		Err(e) => {
			eprintln!("lsh: pwd: {}", e);
			Outcome::Continue(ExitStatus::FAILURE)
		},
	}
}

pub fn builtin_echo(_: &mut State, args: &[String]) -> Outcome {
	match writeln!(io::stdout(), "{}", args.join(" ")) {
		Ok(()) => Outcome::Continue(ExitStatus::SUCCESS),
		Err(_) => Outcome::Continue(ExitStatus::FAILURE),
	}
}

pub fn builtin_exit(state: &mut State, args: &[String]) -> Outcome {
	match args.first() {
		None => Outcome::Exit(state.last_status),
		Some(arg) => match arg.parse::<i64>() {
			Ok(n) => Outcome::Exit(ExitStatus::Exited(n.rem_euclid(256) as u8)),
			Err(_) => {
				eprintln!("lsh: exit: {}: numeric argument required", arg);
				Outcome::Exit(ExitStatus::Exited(2))
			},
		},
	}
}

fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
	writeln!(out, "lsh built-in commands:")?;
	for name in NAMES {
		writeln!(out, "  {}", name)?;
	}
	writeln!(out, "Anything else is looked up in PATH.")
}

pub fn builtin_help(_: &mut State, _: &[String]) -> Outcome {
	match write_help(&mut io::stdout()) {
		Ok(()) => Outcome::Continue(ExitStatus::SUCCESS),
		Err(_) => Outcome::Continue(ExitStatus::FAILURE),
	}
}

pub fn builtin_rehash(state: &mut State, _: &[String]) -> Outcome {
	state.search_cache.rehash();
	Outcome::Continue(ExitStatus::SUCCESS)
}

pub fn match_builtin(name: &str) -> Option<BuiltinFn> {
	match name {
		"cd" => Some(builtin_cd),
		"echo" => Some(builtin_echo),
		"exit" => Some(builtin_exit),
		"help" => Some(builtin_help),
		"pwd" => Some(builtin_pwd),
		"rehash" => Some(builtin_rehash),
		_ => None,
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
	Ran(Outcome),
	NotBuiltin,
}

/// Runs `stage` in the shell process if it names a built-in. Redirection
/// is temporary: the streams in effect before the call are back in place
/// when it returns `Ok`.
pub fn try_run(state: &mut State, stage: &Stage) -> Result<Dispatch, ShellError> {
	let func = match state.builtins.lookup(stage.program()) {
		Some(func) => func,
		None => return Ok(Dispatch::NotBuiltin),
	};
	debug!(name = stage.program(), "running builtin");

	let _ = io::stdout().flush();
	let saved = StreamBindings::save()?;
	let outcome = match redirect::apply(stage) {
		Ok(()) => {
			let outcome = func(state, stage.arguments());
			let _ = io::stdout().flush();
			outcome
		},
		Err(e) => {
			warn!(name = stage.program(), error = %e, "builtin redirection failed");
			eprintln!("lsh: {}", e);
			Outcome::Continue(ExitStatus::FAILURE)
		},
	};
	saved.restore()?;
	Ok(Dispatch::Ran(outcome))
}
