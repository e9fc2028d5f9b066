use super::*;
use crate::config::OllamaConfig;

#[test]
fn client_configuration() {
    let config = OllamaConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        model: "test-model".to_string(),
        embedding_dimension: 768,
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model, "test-model");
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn client_builder_methods() {
    let config = OllamaConfig::default();
    let client = OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5);

    assert_eq!(client.retry_attempts, 5);
}

#[test]
fn embed_request_serialization() {
    let request = EmbedRequest {
        model: "nomic-embed-text:latest".to_string(),
        prompt: "a scanned receipt".to_string(),
    };

    let json = serde_json::to_value(&request).expect("serialize request");
    assert_eq!(json["model"], "nomic-embed-text:latest");
    assert_eq!(json["prompt"], "a scanned receipt");
}

#[test]
fn embed_response_parsing() {
    let response: EmbedResponse =
        serde_json::from_str(r#"{"embedding": [0.25, -0.5, 1.0]}"#).expect("parse response");
    assert_eq!(response.embedding, vec![0.25, -0.5, 1.0]);
}

#[test]
fn models_response_parsing() {
    let raw = r#"{"models": [
        {"name": "nomic-embed-text:latest", "size": 274302450, "digest": "abc123"},
        {"name": "llama3:8b"}
    ]}"#;
    let response: ModelsResponse = serde_json::from_str(raw).expect("parse models");

    assert_eq!(response.models.len(), 2);
    assert_eq!(response.models[0].name, "nomic-embed-text:latest");
    assert_eq!(response.models[1].size, None);
}
