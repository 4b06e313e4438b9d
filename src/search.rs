use std::collections::HashMap;
use std::ffi::OsString;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::{env, fs};

use tracing::debug;

const PATH_KEY: &str = "PATH";

/// Resolves command names against `PATH`, remembering what it found.
#[derive(Debug, Default)]
pub struct SearchCache {
	imp: HashMap<String, PathBuf>,
	path: Option<OsString>,
}

fn is_executable(path: &Path) -> bool {
	match fs::metadata(path) {
		Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
		Err(_) => false,
	}
}

impl SearchCache {
	pub fn new() -> SearchCache {
		SearchCache { imp: HashMap::new(), path: env::var_os(PATH_KEY) }
	}

	/// Searches `path` instead of the environment's `PATH`.
	pub fn with_path<S: Into<OsString>>(path: S) -> SearchCache {
		SearchCache { imp: HashMap::new(), path: Some(path.into()) }
	}

	pub fn rehash(&mut self) {
		self.imp.clear();
		self.path = env::var_os(PATH_KEY);
	}

	fn search(&self, name: &str) -> Option<PathBuf> {
		let path = self.path.as_ref()?;
		env::split_paths(path)
			.map(|dir| dir.join(name))
			.find(|candidate| is_executable(candidate))
	}

	/// Names containing a slash are taken as paths and never cached.
	pub fn lookup(&mut self, name: &str) -> Option<PathBuf> {
		if name.is_empty() {
			return None;
		}
		if name.contains('/') {
			return Some(PathBuf::from(name));
		}
		if let Some(found) = self.imp.get(name) {
			return Some(found.clone());
		}
		let found = self.search(name)?;
		debug!(name, path = %found.display(), "resolved command");
		self.imp.insert(name.to_owned(), found.clone());
		Some(found)
	}
}
