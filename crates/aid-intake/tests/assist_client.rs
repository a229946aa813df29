//! Assist flow against a mocked chat-completions endpoint.

use std::sync::Arc;
use std::time::Duration;

use aid_intake::config::AssistConfig;
use aid_intake::intake::{
    AssistError, AssistRequester, ChatCompletionsClient, Credential, GenerationError,
    GenerationRequest, NarrativeField, TextGenerator,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ChatCompletionsClient {
    let config = AssistConfig {
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        ..AssistConfig::default()
    };
    ChatCompletionsClient::from_config(&config)
        .with_credential(Credential::Static("sk-test".to_string()))
}

fn request() -> GenerationRequest {
    GenerationRequest {
        system: "system prompt".to_string(),
        prompt: "user prompt".to_string(),
    }
}

#[tokio::test]
async fn sends_model_messages_and_bearer_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                { "role": "system", "content": "system prompt" },
                { "role": "user", "content": "user prompt" }
            ]
        })))
        .and(body_string_contains("\"temperature\":0.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Rewritten.  " } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .generate(&request())
        .await
        .expect("generation succeeds");

    assert_eq!(text, "Rewritten.");
    server.verify().await;
}

#[tokio::test]
async fn provider_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached for requests", "type": "requests" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&request())
        .await
        .expect_err("rate limited");

    assert_eq!(
        err,
        GenerationError::Status {
            status: 429,
            message: "Rate limit reached for requests".to_string(),
        }
    );
}

#[tokio::test]
async fn error_without_body_falls_back_to_generic_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&request())
        .await
        .expect_err("server error");

    assert_eq!(err.to_string(), "OpenAI request failed");
}

#[tokio::test]
async fn missing_choices_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&request())
        .await
        .expect_err("no content");

    assert_eq!(err, GenerationError::EmptyResponse);
}

#[tokio::test]
async fn blank_field_never_reaches_the_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let requester = AssistRequester::new(Arc::new(client_for(&server)));
    for text in ["", "   "] {
        let err = requester
            .suggest(NarrativeField::ReasonForApplying, text)
            .await
            .expect_err("blank text");
        assert_eq!(err, AssistError::Empty(NarrativeField::ReasonForApplying));
        assert_eq!(
            err.to_string(),
            "Please write something in \"Reason for Applying\" field first before using AI assistance"
        );
    }

    server.verify().await;
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "choices": [{ "message": { "content": "late" } }]
                }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let requester =
        AssistRequester::with_timeout(Arc::new(client_for(&server)), Duration::from_millis(100));
    let err = requester
        .suggest(NarrativeField::CurrentFinancialSituation, "rent is late")
        .await
        .expect_err("timed out");

    assert_eq!(
        err,
        AssistError::RequestFailed {
            reason: "Request timed out".to_string()
        }
    );
}

#[tokio::test]
async fn suggestion_prompt_quotes_the_user_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains(
            "Explain reasons for applying for financial assistance and hardship context. Here's what the user wrote: \\\"my hours were cut\\\"",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "My working hours were reduced." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let suggestion = AssistRequester::new(Arc::new(client_for(&server)))
        .suggest(NarrativeField::ReasonForApplying, "my hours were cut")
        .await
        .expect("suggestion");

    assert_eq!(suggestion.field, NarrativeField::ReasonForApplying);
    assert_eq!(suggestion.text, "My working hours were reduced.");
    server.verify().await;
}
