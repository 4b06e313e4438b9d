use std::os::fd::OwnedFd;

use nix::fcntl::OFlag;
use nix::unistd;
use tracing::{debug, warn};

use crate::builtin::{self, Dispatch};
use crate::error::ShellError;
use crate::exec;
use crate::global::State;
use crate::job::Job;
use crate::search::SearchCache;
use crate::types::{ExitStatus, Outcome, Pipeline, StageIo};

/// Read end first. Both ends are close-on-exec so stages only ever see the
/// copies dup'ed onto their own stdin/stdout.
fn open_pipe() -> Result<(OwnedFd, OwnedFd), ShellError> {
	unistd::pipe2(OFlag::O_CLOEXEC).map_err(ShellError::PipeCreation)
}

fn spawn_stages(search: &mut SearchCache, pipeline: &Pipeline, job: &mut Job) -> Result<(), ShellError> {
	let stages = pipeline.stages();
	let mut upstream: Option<OwnedFd> = None;
	for (i, stage) in stages.iter().enumerate() {
		let (output, next_upstream) = if i + 1 < stages.len() {
			let (read, write) = open_pipe()?;
			debug!(boundary = i, "pipe created");
			(Some(write), Some(read))
		} else {
			(None, None)
		};
		let fds = StageIo { input: upstream.take(), output: output };
		job.push(exec::spawn(search, stage, fds)?);
		upstream = next_upstream;
	}
	Ok(())
}

/// Spawns every stage, then reaps all of them. On a spawn failure the
/// stages already running are still reaped before the error is returned.
pub fn execute(search: &mut SearchCache, pipeline: &Pipeline) -> Result<Job, ShellError> {
	let mut job = Job::with_capacity(pipeline.len());
	let spawned = spawn_stages(search, pipeline, &mut job);
	let waited = job.wait();
	spawned?;
	waited?;
	Ok(job)
}

/// Status of the pipeline's last stage.
pub fn run(search: &mut SearchCache, pipeline: &Pipeline) -> Result<ExitStatus, ShellError> {
	let job = execute(search, pipeline)?;
	Ok(job.last_status().unwrap_or(ExitStatus::FAILURE))
}

fn eval_pipeline(state: &mut State, pipeline: &Pipeline) -> Result<Outcome, ShellError> {
	if pipeline.len() == 1 {
		if let Dispatch::Ran(outcome) = builtin::try_run(state, &pipeline.stages()[0])? {
			return Ok(outcome);
		}
	}
	run(&mut state.search_cache, pipeline).map(Outcome::Continue)
}

/// Evaluates one parsed line. Failures are reported and turned into a
/// failing status; only the `exit` builtin yields `Outcome::Exit`.
pub fn eval(state: &mut State, pipeline: &Pipeline) -> Outcome {
	let outcome = match eval_pipeline(state, pipeline) {
		Ok(outcome) => outcome,
		Err(e) => {
			warn!(error = %e, "pipeline failed");
			eprintln!("lsh: {}", e);
			Outcome::Continue(ExitStatus::FAILURE)
		},
	};
	state.last_status = outcome.status();
	outcome
}
