use std::io;
use std::io::{BufRead, Write};
use std::process;

use nix::errno::Errno;
use nix::unistd;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lsh::config::Config;
use lsh::{eval, parser, Outcome, State};

const LOG_KEY: &str = "LSH_LOG";

/// Reads one byte at a time so that commands inheriting stdin see exactly
/// the input after this line.
fn read_line_unbuffered(line: &mut Vec<u8>) -> io::Result<usize> {
	let mut byte = [0u8; 1];
	loop {
		match unistd::read(libc::STDIN_FILENO, &mut byte) {
			Ok(0) => break,
			Ok(_) => {
				line.push(byte[0]);
				if byte[0] == b'\n' {
					break;
				}
			},
			Err(Errno::EINTR) => {},
			Err(e) => return Err(e.into()),
		}
	}
	Ok(line.len())
}

fn main() {
	let filter = EnvFilter::try_from_env(LOG_KEY).unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::registry()
		.with(fmt::layer().with_writer(io::stderr))
		.with(filter)
		.init();

	let mut state = State::new(Config::from_env());
	let mut stdout = io::stdout();
	let stdin = io::stdin();
	let mut stdin_locked = stdin.lock();
	loop {
		if state.config.interactive {
			let _ = stdout.write(state.config.prompt.as_bytes());
			let _ = stdout.flush();
		}
		let mut line: Vec<u8> = vec![];
		let read = if state.config.interactive {
			stdin_locked.read_until(b'\n', &mut line)
		} else {
			read_line_unbuffered(&mut line)
		};
		match read {
			Ok(0) => { break; },
			Ok(_) => {},
			Err(e) => {
				let _ = writeln!(io::stderr(), "lsh: {}", e);
				break;
			},
		}
		let pipeline = match parser::parse(&line) {
			Ok(Some(pipeline)) => pipeline,
			Ok(None) => { continue; },
			Err(e) => {
				let _ = writeln!(io::stderr(), "lsh: syntax error: {}", e);
				state.last_status = lsh::ExitStatus::Exited(2);
				continue;
			},
		};
		if let Outcome::Exit(_) = eval::eval(&mut state, &pipeline) {
			break;
		}
	}
	let _ = stdout.flush();
	process::exit(state.last_status.code())
}
