use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::{Table, Tabled};

/// Context handed to a grader by the eval framework.
///
/// Graders never inspect it; it is carried so the grading signature matches
/// what the framework supplies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradingContext(pub Value);

impl GradingContext {
	pub fn new(value: Value) -> Self {
		Self(value)
	}
}

/// Outcome of grading one model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
	pub pass: bool,
	pub score: f64,
	pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
struct ResultRow {
	passed: String,
	score: f64,
	verdict: String,
}

impl GradingResult {
	pub fn new(pass: bool, reason: impl Into<String>) -> Self {
		Self {
			pass,
			score: if pass { 1.0 } else { 0.0 },
			reason: reason.into(),
		}
	}

	/// First line of the reason, without the diagnostic payload.
	pub fn verdict(&self) -> &str {
		self.reason.lines().next().unwrap_or_default()
	}

	pub fn summary_table(&self) -> String {
		let row = ResultRow {
			passed: if self.pass { "✓" } else { "✗" }.to_string(),
			score: self.score,
			verdict: self.verdict().to_string(),
		};
		let table = Table::new([row]).to_string();
		let details = self
			.reason
			.split_once("\n\n")
			.map(|(_, rest)| rest)
			.unwrap_or_default();

		if details.is_empty() {
			format!("{}\n", table)
		} else {
			format!("{}\n\n{}\n", table, details)
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVars {
	pub image_url: String,
}

/// Provider identity as the framework reports it, e.g. `anthropic:claude-3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

impl ProviderInfo {
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into(), label: None }
	}

	pub fn with_label(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: Some(label.into()),
		}
	}
}

impl fmt::Display for ProviderInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.label {
			Some(label) => write!(f, "{{id: {:?}, label: {:?}}}", self.id, label),
			None => write!(f, "{{id: {:?}}}", self.id),
		}
	}
}

/// Input to the prompt formatter: `{vars: {image_url}, provider: {id, label?}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptContext {
	pub vars: PromptVars,
	pub provider: ProviderInfo,
}

impl PromptContext {
	pub fn new(provider: ProviderInfo, image_url: impl Into<String>) -> Self {
		Self {
			vars: PromptVars {
				image_url: image_url.into(),
			},
			provider,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	System,
	User,
}

/// One message of a formatted prompt. The shape depends on the provider family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptMessage {
	/// Role/content-block messages (Anthropic, OpenAI).
	Chat(ChatMessage),
	/// Gemini `parts` content.
	Parts(PartsMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
	Text { text: String },
	Image { source: ImageSource },
	ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
	Base64 { media_type: String, data: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
	pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartsMessage {
	pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
	InlineData { inline_data: InlineData },
	Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineData {
	pub mime_type: String,
	pub data: String,
}
