use crate::types::{Pipeline, Stage};

pub type ParseResult<T> = Result<T, String>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum RedirectType { Input, Output }

struct Parser<'a> {
	line: &'a [u8],
	i: usize,
}

impl<'a> Parser<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		matches!(c, b' ' | b'\t' | b'\n' | b'\r')
	}

	fn is_letter(c: u8) -> bool {
		match c {
			b'>' | b'<' | b'|' => false,
			_ => !Parser::is_whitespace(c),
		}
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Parser::is_whitespace);
	}

	fn read_word(&mut self) -> Option<String> {
		let orig = self.i;
		self.proceed_while(Parser::is_letter);
		if orig == self.i {
			None
		} else {
			Some(String::from_utf8_lossy(&self.line[orig .. self.i]).into_owned())
		}
	}

	fn parse_redirect(&mut self) -> ParseResult<Option<(RedirectType, String)>> {
		let typ = match self.line.get(self.i) {
			Some(&b'<') => RedirectType::Input,
			Some(&b'>') => RedirectType::Output,
			_ => return Ok(None),
		};
		self.i += 1;

		self.skip_whitespaces();
		match self.read_word() {
			Some(target) => Ok(Some((typ, target))),
			None => Err("missing redirect target".to_string()),
		}
	}

	fn parse_stage(&mut self) -> ParseResult<Stage> {
		let mut words: Vec<String> = vec![];
		let mut input: Option<String> = None;
		let mut output: Option<String> = None;

		loop {
			self.skip_whitespaces();
			if let Some((typ, target)) = self.parse_redirect()? {
				match typ {
					RedirectType::Input => input = Some(target),
					RedirectType::Output => output = Some(target),
				}
				continue;
			}
			match self.read_word() {
				Some(word) => words.push(word),
				None => break,
			}
		}

		let mut words = words.into_iter();
		let mut stage = match words.next() {
			Some(name) => Stage::new(name).args(words),
			None => return Err("empty command".to_string()),
		};
		if let Some(path) = input {
			stage = stage.input_from(path);
		}
		if let Some(path) = output {
			stage = stage.output_to(path);
		}
		Ok(stage)
	}

	fn parse_pipeline(&mut self) -> ParseResult<Option<Pipeline>> {
		self.skip_whitespaces();
		if self.i == self.line.len() {
			return Ok(None);
		}

		let mut stages: Vec<Stage> = vec![];
		loop {
			stages.push(self.parse_stage()?);
			match self.line.get(self.i) {
				Some(&b'|') => { self.i += 1; },
				Some(&c) => { return Err(format!("unexpected character: '{}'", c as char)); },
				None => { break; },
			}
		}
		Ok(Pipeline::new(stages))
	}
}

/// Splits one input line into pipeline stages. A blank line yields `None`.
pub fn parse(line: &[u8]) -> ParseResult<Option<Pipeline>> {
	let mut parser = Parser { line: line, i: 0 };
	parser.parse_pipeline()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::Path;

	fn parse_ok(line: &str) -> Pipeline {
		parse(line.as_bytes()).unwrap().unwrap()
	}

	#[test]
	fn blank_lines() {
		assert_eq!(parse(b""), Ok(None));
		assert_eq!(parse(b"  \t\n"), Ok(None));
	}

	#[test]
	fn single_command() {
		let p = parse_ok("ls -l  /tmp\n");
		assert_eq!(p.len(), 1);
		assert_eq!(p.stages()[0].argv(), ["ls", "-l", "/tmp"]);
		assert!(!p.stages()[0].has_redirects());
	}

	#[test]
	fn pipeline_stages_in_order() {
		let p = parse_ok("printf a\\nb\\nc\\n|grep b | wc -l");
		let argv: Vec<&[String]> = p.stages().iter().map(|s| s.argv()).collect();
		assert_eq!(argv.len(), 3);
		assert_eq!(argv[0], ["printf", "a\\nb\\nc\\n"]);
		assert_eq!(argv[1], ["grep", "b"]);
		assert_eq!(argv[2], ["wc", "-l"]);
	}

	#[test]
	fn redirects_anywhere_in_stage() {
		let p = parse_ok("<in.txt cat -n >out.txt");
		let stage = &p.stages()[0];
		assert_eq!(stage.argv(), ["cat", "-n"]);
		assert_eq!(stage.input_file(), Some(Path::new("in.txt")));
		assert_eq!(stage.output_file(), Some(Path::new("out.txt")));

		let p = parse_ok("sort < a > b | uniq > c");
		assert_eq!(p.stages()[0].input_file(), Some(Path::new("a")));
		assert_eq!(p.stages()[0].output_file(), Some(Path::new("b")));
		assert_eq!(p.stages()[1].output_file(), Some(Path::new("c")));
	}

	#[test]
	fn last_redirect_wins() {
		let p = parse_ok("echo hi > a > b");
		assert_eq!(p.stages()[0].output_file(), Some(Path::new("b")));
	}

	#[test]
	fn errors() {
		assert_eq!(parse(b"| wc"), Err("empty command".to_string()));
		assert_eq!(parse(b"ls |"), Err("empty command".to_string()));
		assert_eq!(parse(b"ls || wc"), Err("empty command".to_string()));
		assert_eq!(parse(b"cat <"), Err("missing redirect target".to_string()));
		assert_eq!(parse(b"cat > | wc"), Err("missing redirect target".to_string()));
		assert_eq!(parse(b"> out"), Err("empty command".to_string()));
	}
}
