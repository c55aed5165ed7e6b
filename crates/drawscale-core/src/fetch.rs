use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header::CONTENT_TYPE;

use crate::error::FetchError;

const DEFAULT_MEDIA_TYPE: &str = "image/png";

/// An image ready to embed in a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
	/// Standard base64, padded.
	pub data: String,
	pub media_type: String,
}

impl EncodedImage {
	pub fn encode(bytes: &[u8], media_type: impl Into<String>) -> Self {
		Self {
			data: BASE64.encode(bytes),
			media_type: media_type.into(),
		}
	}
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
	async fn fetch(&self, url: &str) -> Result<EncodedImage, FetchError>;
}

/// Downloads images over HTTP. No retries; configure timeouts on the client.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
	client: reqwest::Client,
}

impl HttpImageFetcher {
	pub fn new(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
	async fn fetch(&self, url: &str) -> Result<EncodedImage, FetchError> {
		let transport = |source| FetchError::Transport {
			url: url.to_string(),
			source,
		};

		let resp = self.client.get(url).send().await.map_err(transport)?;
		let status = resp.status();
		if !status.is_success() {
			return Err(FetchError::Status {
				url: url.to_string(),
				status: status.as_u16(),
			});
		}

		let media_type = media_type(resp.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()));
		let bytes = resp.bytes().await.map_err(transport)?;
		tracing::debug!(url, media_type = %media_type, bytes = bytes.len(), "fetched image");
		Ok(EncodedImage::encode(&bytes, media_type))
	}
}

/// Media type from a `Content-Type` header value, parameters dropped.
pub fn media_type(content_type: Option<&str>) -> String {
	let value = content_type.unwrap_or(DEFAULT_MEDIA_TYPE);
	value.split(';').next().unwrap_or(value).trim().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_media_type_defaults_to_png() {
		assert_eq!(media_type(None), "image/png");
	}

	#[test]
	fn test_media_type_drops_parameters() {
		assert_eq!(media_type(Some("image/jpeg; charset=binary")), "image/jpeg");
		assert_eq!(media_type(Some("image/webp")), "image/webp");
	}

	#[test]
	fn test_encode_is_standard_padded_base64() {
		let image = EncodedImage::encode(b"\x89PNG", "image/png");
		assert_eq!(image.data, "iVBORw==");
	}
}
