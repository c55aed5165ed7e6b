use std::sync::Arc;

use drawscale_types::{
	ChatMessage, ContentBlock, ImageSource, ImageUrl, InlineData, Part, PartsMessage, PromptContext,
	PromptMessage, ProviderInfo, Role,
};

use crate::error::PromptError;
use crate::fetch::{EncodedImage, HttpImageFetcher, ImageFetcher};

/// Instructions sent alongside the drawing.
pub const MEASUREMENT_PROMPT: &str = r#"
Measure the length of the red rectangle in this drawing. Think step by step.

This PNG is 1344 x 896 pixels.

## Measurement Process
1. Locate the red rectangle
2. Identify the point coordinates of the starting edge of rectangle and the point coordinates of the ending edge of the rectangle
3. Measure its pixel length
4. Multipy the pixel length values by (36 inches / 1344 pixels)
5. Multiply by 8 (1/8 inches = 1 foot) for the feet value
6. Express results in feet and inches (round to nearest inch)

Show your work for each step.

Include a JSON object in the response that contains:
   - "pixel_length": the length in pixels
   - "start_coordinates": the [x, y] coordinates of the starting edge
   - "end_coordinates": the [x, y] coordinates of the ending edge
   - "feet": the feet portion of the measurement
   - "inches": the inches portion of the measurement (rounded to nearest inch)
"#;

/// A provider configured with this label is treated as OpenAI regardless of its id.
pub const CUSTOM_OPENAI_LABEL: &str = "custom label for gpt-4.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
	/// Content blocks with an inline base64 image.
	Anthropic,
	/// `parts` with `inline_data`.
	Gemini,
	/// System text plus a user `image_url`; the image is not downloaded.
	OpenAi,
}

struct Route {
	matches: fn(&ProviderInfo) -> bool,
	family: ProviderFamily,
}

// First match wins.
const ROUTES: &[Route] = &[
	Route {
		matches: is_anthropic,
		family: ProviderFamily::Anthropic,
	},
	Route {
		matches: is_gemini,
		family: ProviderFamily::Gemini,
	},
	Route {
		matches: is_openai,
		family: ProviderFamily::OpenAi,
	},
];

fn is_anthropic(provider: &ProviderInfo) -> bool {
	["bedrock:anthropic", "bedrock:us.anthropic", "anthropic:"]
		.iter()
		.any(|prefix| provider.id.starts_with(prefix))
}

fn is_gemini(provider: &ProviderInfo) -> bool {
	provider.id.starts_with("google:gemini")
}

fn is_openai(provider: &ProviderInfo) -> bool {
	provider.id.starts_with("openai:") || provider.label.as_deref() == Some(CUSTOM_OPENAI_LABEL)
}

/// Resolves the message layout for a provider, or `None` if it is not supported.
pub fn provider_family(provider: &ProviderInfo) -> Option<ProviderFamily> {
	ROUTES
		.iter()
		.find(|route| (route.matches)(provider))
		.map(|route| route.family)
}

/// Builds the measurement prompt in the layout each provider expects.
pub struct PromptFormatter {
	fetcher: Arc<dyn ImageFetcher>,
}

impl PromptFormatter {
	pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
		Self { fetcher }
	}

	pub fn http() -> Self {
		Self::new(Arc::new(HttpImageFetcher::default()))
	}

	pub async fn format(&self, context: &PromptContext) -> Result<Vec<PromptMessage>, PromptError> {
		let provider = &context.provider;
		let family = provider_family(provider).ok_or_else(|| PromptError::UnsupportedProvider(provider.clone()))?;
		tracing::debug!(provider = %provider.id, ?family, "formatting prompt");

		let image_url = context.vars.image_url.as_str();
		let messages = match family {
			ProviderFamily::Anthropic => anthropic_messages(self.fetcher.fetch(image_url).await?),
			ProviderFamily::Gemini => gemini_messages(self.fetcher.fetch(image_url).await?),
			ProviderFamily::OpenAi => openai_messages(image_url),
		};
		Ok(messages)
	}
}

fn anthropic_messages(image: EncodedImage) -> Vec<PromptMessage> {
	vec![PromptMessage::Chat(ChatMessage {
		role: Role::User,
		content: vec![
			ContentBlock::Text {
				text: MEASUREMENT_PROMPT.to_string(),
			},
			ContentBlock::Image {
				source: ImageSource::Base64 {
					media_type: image.media_type,
					data: image.data,
				},
			},
		],
	})]
}

fn gemini_messages(image: EncodedImage) -> Vec<PromptMessage> {
	vec![PromptMessage::Parts(PartsMessage {
		parts: vec![
			Part::InlineData {
				inline_data: InlineData {
					mime_type: image.media_type,
					data: image.data,
				},
			},
			Part::Text {
				text: MEASUREMENT_PROMPT.to_string(),
			},
		],
	})]
}

// TODO: send the instructions as a user text block instead of a system message.
fn openai_messages(image_url: &str) -> Vec<PromptMessage> {
	vec![
		PromptMessage::Chat(ChatMessage {
			role: Role::System,
			content: vec![ContentBlock::Text {
				text: MEASUREMENT_PROMPT.to_string(),
			}],
		}),
		PromptMessage::Chat(ChatMessage {
			role: Role::User,
			content: vec![ContentBlock::ImageUrl {
				image_url: ImageUrl {
					url: image_url.to_string(),
				},
			}],
		}),
	]
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use async_trait::async_trait;

	use crate::error::FetchError;

	struct FakeFetcher {
		media_type: &'static str,
		calls: AtomicUsize,
	}

	impl FakeFetcher {
		fn new(media_type: &'static str) -> Arc<Self> {
			Arc::new(Self {
				media_type,
				calls: AtomicUsize::new(0),
			})
		}
	}

	#[async_trait]
	impl ImageFetcher for FakeFetcher {
		async fn fetch(&self, _url: &str) -> Result<EncodedImage, FetchError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(EncodedImage::encode(b"img", self.media_type))
		}
	}

	fn context(provider: ProviderInfo) -> PromptContext {
		PromptContext::new(provider, "https://example.com/drawing.png")
	}

	#[test]
	fn test_routes_by_prefix() {
		let family = |id: &str| provider_family(&ProviderInfo::new(id));
		assert_eq!(family("anthropic:messages:claude-3-5-sonnet"), Some(ProviderFamily::Anthropic));
		assert_eq!(family("bedrock:anthropic.claude-3"), Some(ProviderFamily::Anthropic));
		assert_eq!(family("bedrock:us.anthropic.claude-3"), Some(ProviderFamily::Anthropic));
		assert_eq!(family("google:gemini-2.0-flash"), Some(ProviderFamily::Gemini));
		assert_eq!(family("openai:gpt-4.1"), Some(ProviderFamily::OpenAi));
		assert_eq!(family("bedrock:meta.llama3"), None);
		assert_eq!(family("google:palm"), None);
		assert_eq!(family("anthropic"), None);
	}

	#[test]
	fn test_custom_label_routes_to_openai() {
		let provider = ProviderInfo::with_label("http://localhost:8080", CUSTOM_OPENAI_LABEL);
		assert_eq!(provider_family(&provider), Some(ProviderFamily::OpenAi));
	}

	#[test]
	fn test_id_prefix_beats_label() {
		let provider = ProviderInfo::with_label("anthropic:claude-3", CUSTOM_OPENAI_LABEL);
		assert_eq!(provider_family(&provider), Some(ProviderFamily::Anthropic));
	}

	#[tokio::test]
	async fn test_anthropic_embeds_fetched_image() {
		let fetcher = FakeFetcher::new("image/jpeg");
		let formatter = PromptFormatter::new(fetcher.clone());
		let messages = formatter.format(&context(ProviderInfo::new("anthropic:claude-3"))).await.unwrap();

		assert_eq!(messages.len(), 1);
		let PromptMessage::Chat(msg) = &messages[0] else {
			panic!("expected a chat message");
		};
		assert_eq!(msg.role, Role::User);
		assert_eq!(msg.content.len(), 2);
		assert_eq!(
			msg.content[0],
			ContentBlock::Text {
				text: MEASUREMENT_PROMPT.to_string()
			}
		);
		assert_eq!(
			msg.content[1],
			ContentBlock::Image {
				source: ImageSource::Base64 {
					media_type: "image/jpeg".into(),
					data: "aW1n".into(),
				}
			}
		);
		assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_gemini_puts_image_first() {
		let fetcher = FakeFetcher::new("image/png");
		let formatter = PromptFormatter::new(fetcher.clone());
		let messages = formatter.format(&context(ProviderInfo::new("google:gemini-pro"))).await.unwrap();

		let value = serde_json::to_value(&messages).unwrap();
		assert_eq!(value[0]["parts"][0]["inline_data"]["mime_type"], "image/png");
		assert_eq!(value[0]["parts"][0]["inline_data"]["data"], "aW1n");
		assert_eq!(value[0]["parts"][1]["text"], MEASUREMENT_PROMPT);
		assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_openai_references_url_without_fetching() {
		let fetcher = FakeFetcher::new("image/png");
		let formatter = PromptFormatter::new(fetcher.clone());
		let messages = formatter.format(&context(ProviderInfo::new("openai:gpt-4.1"))).await.unwrap();

		assert_eq!(messages.len(), 2);
		let value = serde_json::to_value(&messages).unwrap();
		assert_eq!(value[0]["role"], "system");
		assert_eq!(value[0]["content"][0]["text"], MEASUREMENT_PROMPT);
		assert_eq!(value[1]["role"], "user");
		assert_eq!(value[1]["content"][0]["type"], "image_url");
		assert_eq!(value[1]["content"][0]["image_url"]["url"], "https://example.com/drawing.png");
		assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_unknown_provider_is_rejected() {
		let fetcher = FakeFetcher::new("image/png");
		let formatter = PromptFormatter::new(fetcher.clone());
		let provider = ProviderInfo::with_label("unknown:provider", "mine");
		let err = formatter.format(&context(provider.clone())).await.unwrap_err();

		match err {
			PromptError::UnsupportedProvider(p) => assert_eq!(p, provider),
			other => panic!("unexpected error: {other}"),
		}
		assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
	}
}
