//! Lowers this process's descriptor limit, so it lives alone in its binary.

#![cfg(target_os = "linux")]

use std::fs::{self, File};
use std::os::fd::AsRawFd;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;

use lsh::eval;
use lsh::search::SearchCache;
use lsh::{Pipeline, ShellError, Stage};

fn highest_open_fd() -> i32 {
	fs::read_dir("/proc/self/fd").unwrap()
		.filter_map(|e| e.unwrap().file_name().to_str().and_then(|s| s.parse().ok()))
		.max()
		.unwrap()
}

fn set_nofile(limit: libc::rlim_t, max: libc::rlim_t) {
	let rl = libc::rlimit { rlim_cur: limit, rlim_max: max };
	assert_eq!(unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &rl) }, 0);
}

#[test]
fn pipe_failure_reaps_spawned_stages() {
	let mut search = SearchCache::new();
	let pipeline = Pipeline::new(vec![
		Stage::new("true"),
		Stage::new("cat"),
		Stage::new("cat").output_to("/dev/null"),
	]).unwrap();
	// Resolve up front; lookups do not open descriptors, but keep the
	// limited section to forks and pipes only.
	for stage in pipeline.stages() {
		assert!(search.lookup(stage.program()).is_some());
	}

	// Fill every hole below the highest descriptor so new ones are numbered
	// from `next` upwards.
	let highest = highest_open_fd();
	let mut fillers = vec![];
	let next = loop {
		let f = File::open("/dev/null").unwrap();
		let fd = f.as_raw_fd();
		if fd > highest {
			break fd;
		}
		fillers.push(f);
	};

	let mut old = libc::rlimit { rlim_cur: 0, rlim_max: 0 };
	assert_eq!(unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut old) }, 0);
	// The first pipe fits (`next`, `next + 1`); once the write end is handed
	// off only the read end stays, so the second pipe needs `next + 2`.
	set_nofile((next + 2) as libc::rlim_t, old.rlim_max);
	let result = eval::run(&mut search, &pipeline);
	set_nofile(old.rlim_cur, old.rlim_max);

	match result {
		Err(ShellError::PipeCreation(e)) => assert_eq!(e, Errno::EMFILE),
		other => panic!("expected pipe creation failure, got {:?}", other),
	}
	assert_eq!(waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)), Err(Errno::ECHILD));
	drop(fillers);
}
