//! Kept as a single test: the open-descriptor count of this process is only
//! meaningful when nothing else in the binary runs alongside it.

#![cfg(target_os = "linux")]

use std::fs;

use lsh::eval;
use lsh::search::SearchCache;
use lsh::{ExitStatus, Pipeline, Stage};

fn open_fds() -> usize {
	fs::read_dir("/proc/self/fd").unwrap().count()
}

#[test]
fn pipelines_leave_no_descriptors_behind() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("in");
	let output = dir.path().join("out");
	fs::write(&input, "a\nb\nc\n").unwrap();
	let mut search = SearchCache::new();

	let pipelines = vec![
		Pipeline::single(Stage::new("cat").input_from(&input).output_to(&output)),
		Pipeline::new(vec![
			Stage::new("cat").input_from(&input),
			Stage::new("grep").arg("b"),
			Stage::new("wc").arg("-l").output_to(&output),
		]).unwrap(),
		Pipeline::new(vec![
			Stage::new("cat").input_from(&input),
			Stage::new("definitely_not_a_real_command_12345").output_to(&output),
		]).unwrap(),
		Pipeline::single(Stage::new("cat").input_from(dir.path().join("absent")).output_to(&output)),
	];

	let baseline = open_fds();
	for _ in 0..10 {
		for pipeline in &pipelines {
			let _ = eval::run(&mut search, pipeline).unwrap();
		}
	}
	assert_eq!(open_fds(), baseline);

	let status = eval::run(&mut search, &pipelines[1]).unwrap();
	assert_eq!(status, ExitStatus::SUCCESS);
	assert_eq!(fs::read_to_string(&output).unwrap().trim(), "1");
}
