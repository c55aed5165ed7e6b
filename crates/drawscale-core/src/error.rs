use drawscale_types::ProviderInfo;
use serde_json::Value;

/// Failures while grading a model output. None of them are recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
	#[error("output is not valid JSON: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("expected a JSON object, found {found}")]
	NotAnObject { found: &'static str },

	#[error("expected a JSON array, found {found}")]
	NotAnArray { found: &'static str },

	#[error("expected a non-empty JSON array")]
	EmptyArray,

	#[error("missing required field `{field}`")]
	MissingField { field: &'static str },

	#[error("field `{field}` {reason}")]
	InvalidField { field: &'static str, reason: String },

	#[error("failed to render diagnostics: {0}")]
	Diagnostics(#[source] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
	#[error("unsupported provider: {0}")]
	UnsupportedProvider(ProviderInfo),

	#[error(transparent)]
	Fetch(#[from] FetchError),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
	#[error("failed to fetch image {url}: {source}")]
	Transport {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("image request to {url} returned HTTP {status}")]
	Status { url: String, status: u16 },
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
