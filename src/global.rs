use crate::builtin::{Builtins, Registry};
use crate::config::Config;
use crate::search::SearchCache;
use crate::types::ExitStatus;

pub struct State {
	pub config: Config,
	pub search_cache: SearchCache,
	pub builtins: Box<dyn Registry>,
	pub last_status: ExitStatus,
}

impl State {
	pub fn new(config: Config) -> State {
		State::with_registry(config, Box::new(Builtins))
	}

	pub fn with_registry(config: Config, builtins: Box<dyn Registry>) -> State {
		State {
			config: config,
			search_cache: SearchCache::new(),
			builtins: builtins,
			last_status: ExitStatus::SUCCESS,
		}
	}
}

impl Default for State {
	fn default() -> State {
		State::new(Config::default())
	}
}
