//! Client tests that never leave the local host.

use scheherazade_core::{GenerateRequest, ScheherazadeDriver};
use scheherazade_error::{FailureClass, ModelErrorKind, ScheherazadeErrorKind};
use scheherazade_models::GeminiClient;

#[tokio::test]
async fn test_unreachable_endpoint_maps_to_api_request_error() {
    // Port 9 (discard) is closed on any sane host; the connection is
    // refused before a request body is ever sent.
    let client = GeminiClient::new("test-key".to_string(), "test-model".to_string())
        .with_base_url("http://127.0.0.1:9");

    let request = GenerateRequest::from_prompt("hello");
    let err = client.generate(&request).await.unwrap_err();

    assert_eq!(err.failure_class(), FailureClass::Other);
    let ScheherazadeErrorKind::Model(model_err) = err.kind() else {
        panic!("expected a model error, got {}", err);
    };
    assert!(matches!(model_err.kind, ModelErrorKind::ApiRequest(_)));
}
