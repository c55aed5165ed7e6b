use std::sync::OnceLock;

use regex::Regex;

static FENCED_JSON: OnceLock<Regex> = OnceLock::new();

fn fenced_json() -> &'static Regex {
	FENCED_JSON.get_or_init(|| {
		Regex::new(r"(?s)```(?:json)?\s*\n?(.*?)\n?```").expect("fenced JSON pattern is valid")
	})
}

/// Returns the part of `text` most likely to be a JSON document.
///
/// The body of the leftmost triple-backtick block (optionally tagged `json`)
/// wins; without a fenced block the whole input is used. Either way the
/// result is trimmed. The result is not guaranteed to parse.
pub fn extract_json(text: &str) -> &str {
	match fenced_json().captures(text).and_then(|caps| caps.get(1)) {
		Some(body) => body.as_str().trim(),
		None => text.trim(),
	}
}
