use std::env;
use std::io::{self, IsTerminal};

pub const DEFAULT_PROMPT: &str = ">>> $ ";
const PROMPT_KEY: &str = "LSH_PROMPT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub prompt: String,
	/// Print the prompt before reading each line.
	pub interactive: bool,
}

impl Default for Config {
	fn default() -> Config {
		Config { prompt: DEFAULT_PROMPT.to_owned(), interactive: false }
	}
}

impl Config {
	pub fn from_env() -> Config {
		let prompt = env::var(PROMPT_KEY).unwrap_or_else(|_| DEFAULT_PROMPT.to_owned());
		Config { prompt: prompt, interactive: io::stdin().is_terminal() }
	}
}
