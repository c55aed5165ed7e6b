//! HttpImageFetcher against a mock server.

use drawscale_core::{FetchError, HttpImageFetcher, ImageFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n";

#[tokio::test]
async fn test_fetch_encodes_body_and_strips_parameters() {
	let mock_server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/drawing.jpg"))
		.respond_with(
			ResponseTemplate::new(200)
				.set_body_bytes(b"\xff\xd8\xff".to_vec())
				.insert_header("content-type", "image/jpeg; charset=binary"),
		)
		.expect(1)
		.mount(&mock_server)
		.await;

	let fetcher = HttpImageFetcher::default();
	let image = fetcher
		.fetch(&format!("{}/drawing.jpg", mock_server.uri()))
		.await
		.expect("fetch failed");

	assert_eq!(image.media_type, "image/jpeg");
	assert_eq!(image.data, "/9j/");
}

#[tokio::test]
async fn test_fetch_without_content_type_defaults_to_png() {
	let mock_server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/drawing"))
		.respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_HEADER.to_vec()))
		.mount(&mock_server)
		.await;

	let image = HttpImageFetcher::default()
		.fetch(&format!("{}/drawing", mock_server.uri()))
		.await
		.expect("fetch failed");

	assert_eq!(image.media_type, "image/png");
	assert_eq!(image.data, "iVBORw0KGgo=");
}

#[tokio::test]
async fn test_fetch_not_found_is_error() {
	let mock_server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/missing.png"))
		.respond_with(ResponseTemplate::new(404))
		.mount(&mock_server)
		.await;

	let err = HttpImageFetcher::default()
		.fetch(&format!("{}/missing.png", mock_server.uri()))
		.await
		.unwrap_err();

	match err {
		FetchError::Status { status, url } => {
			assert_eq!(status, 404);
			assert!(url.ends_with("/missing.png"));
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[tokio::test]
async fn test_fetch_transport_error() {
	let err = HttpImageFetcher::default()
		.fetch("http://127.0.0.1:9/unreachable.png")
		.await
		.unwrap_err();

	assert!(matches!(err, FetchError::Transport { .. }));
}
