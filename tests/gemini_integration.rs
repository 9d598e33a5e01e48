//! End-to-end tests of the assistant over the Gemini REST API
//!
//! A wiremock server stands in for the API; the provider is built through
//! the same factory the CLI uses.

use serde_json::{json, Value};
use std::sync::Arc;
use studymate::config::{GeminiConfig, ProviderConfig};
use studymate::providers::create_provider;
use studymate::{Assistant, Locale, Mode, Studio, Translator};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEXT_MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
const STREAM_PATH: &str = "/v1beta/models/gemini-2.5-flash:streamGenerateContent";

fn assistant_for(server: &MockServer) -> Assistant {
    let config = ProviderConfig {
        provider_type: "gemini".to_string(),
        gemini: GeminiConfig {
            api_key: Some("test-key".to_string()),
            api_base: server.uri(),
            timeout_seconds: 5,
            ..GeminiConfig::default()
        },
    };
    let provider = create_provider(&config.provider_type, &config).unwrap();
    Assistant::new(Arc::from(provider))
}

fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

async fn mount_detection(server: &MockServer, language: &str) {
    Mock::given(method("POST"))
        .and(path(TEXT_MODEL_PATH))
        .and(body_string_contains("language detection expert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(language)))
        .mount(server)
        .await;
}

async fn bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_solve_answers_in_detected_language() {
    let server = MockServer::start().await;
    mount_detection(&server, "Russian").await;
    Mock::given(method("POST"))
        .and(path(TEXT_MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_string_contains("help students with their homework"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("## Ответ\n\n4")))
        .expect(1)
        .mount(&server)
        .await;

    let solution = assistant_for(&server)
        .solve_homework("Сколько будет 2+2?", None, Locale::En)
        .await
        .unwrap();

    assert_eq!(solution, "## Ответ\n\n4");
    let bodies = bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    let instruction = bodies[1]["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(instruction.contains("Russian"));
}

#[tokio::test]
async fn test_failed_detection_falls_back_to_english() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_MODEL_PATH))
        .and(body_string_contains("language detection expert"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TEXT_MODEL_PATH))
        .and(body_string_contains("help students with their homework"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("4")))
        .mount(&server)
        .await;

    let solution = assistant_for(&server)
        .solve_homework("2+2?", None, Locale::Ru)
        .await
        .unwrap();

    assert_eq!(solution, "4");
    let bodies = bodies(&server).await;
    let instruction = bodies[1]["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(instruction.contains("English"));
}

#[tokio::test]
async fn test_schedule_from_structured_reply() {
    let server = MockServer::start().await;
    mount_detection(&server, "English").await;
    let reply = r#"[{"day":"Monday","events":[{"time":"09:00 AM","title":"Math","description":"Algebra"}]}]"#;
    Mock::given(method("POST"))
        .and(path(TEXT_MODEL_PATH))
        .and(body_string_contains("creates daily or weekly schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(reply)))
        .mount(&server)
        .await;

    let schedule = assistant_for(&server)
        .generate_schedule("Math on Monday")
        .await
        .unwrap();

    assert_eq!(schedule.len(), 1);
    let event = &schedule.day(0).unwrap().events[0];
    assert_eq!(event.title, "Math");
    assert!(event.id.starts_with("event-"));

    let body = bodies(&server).await.pop().unwrap();
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert!(body["generationConfig"]["responseSchema"].is_object());
}

#[tokio::test]
async fn test_tutor_turn_streams_reply_into_history() {
    let server = MockServer::start().await;
    mount_detection(&server, "English").await;
    let sse_body = format!(
        "data: {}\r\n\r\ndata: {}\r\n\r\n",
        text_response("Let's think"),
        text_response(" step by step.")
    );
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(query_param("alt", "sse"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body.into_bytes(), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut studio = Studio::new(
        assistant_for(&server),
        Translator::new(Locale::En),
        Mode::Tutor,
    );
    let mut updates = 0;
    studio
        .send_tutor_message("2+2?", |_| updates += 1)
        .await
        .unwrap();

    let history = studio.tutor().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.last().unwrap().text, "Let's think step by step.");
    assert_eq!(studio.tutor().language(), Some("English"));
    assert!(updates >= 3);

    let stream_body = bodies(&server).await.pop().unwrap();
    let persona = stream_body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(persona.contains("AI tutor"));
    assert_eq!(stream_body["contents"][0]["parts"][0]["text"], "2+2?");
}

#[tokio::test]
async fn test_tutor_http_failure_is_recorded() {
    let server = MockServer::start().await;
    mount_detection(&server, "English").await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let mut studio = Studio::new(
        assistant_for(&server),
        Translator::new(Locale::En),
        Mode::Tutor,
    );
    let result = studio.send_tutor_message("hello", |_| {}).await;

    assert!(result.is_err());
    assert_eq!(studio.tutor().history().len(), 1);
    assert!(studio.tutor().error().is_some());
}
