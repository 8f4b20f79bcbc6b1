use fitagent::config::Config;
use fitagent::document::{DocumentExporter, DocumentKind};
use fitagent::profile::{Gender, Goal, PersonalInfo, ProfileStore};
use fitagent::prompt::Persona;
use fitagent::provider::factory::create_client;
use fitagent::provider::http::HttpCompletionClient;
use fitagent::provider::{CompletionClient, CompletionError};
use fitagent::session::{Session, SessionError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "llama3-70b-8192",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn client_for(server: &MockServer) -> HttpCompletionClient {
    HttpCompletionClient::new(
        "test-key".into(),
        server.uri(),
        "llama3-70b-8192".into(),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_completion_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "llama3-70b-8192",
            "messages": [{ "role": "user", "content": "Hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hi there")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let text = client.complete("Hello").await.unwrap();
    assert_eq!(text, "Hi there");
}

#[tokio::test]
async fn test_completion_remote_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).complete("Hello").await.unwrap_err();
    match err {
        CompletionError::RemoteFailure { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("upstream exploded"));
        }
        other => panic!("expected RemoteFailure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_completion_without_choices_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).complete("Hello").await.unwrap_err();
    assert!(matches!(err, CompletionError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_temperature_sent_only_when_set() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "temperature": 0.5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("revised")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let text = client.complete_with("Revise", Some(0.5)).await.unwrap();
    assert_eq!(text, "revised");

    // No mock matches a request without temperature.
    let err = client.complete("Plain").await.unwrap_err();
    assert!(matches!(err, CompletionError::RemoteFailure { status: 404, .. }));
}

#[tokio::test]
async fn test_session_end_to_end() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("certified rehab specialist"))
        .and(body_string_contains("left knee"))
        .and(body_string_contains("Can I squat?"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("Try box squats.")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut cfg = Config::default();
    cfg.completion.api_key = "test-key".into();
    cfg.completion.api_base = mock_server.uri();
    cfg.validate().unwrap();

    let client: Arc<dyn CompletionClient> = Arc::from(create_client(&cfg).unwrap());
    let mut session = Session::start(
        ProfileStore::in_dir(tmp.path()),
        client,
        DocumentExporter::from_config(&cfg.export),
    )
    .unwrap();

    session
        .save_profile(PersonalInfo {
            name: Some("Sam".into()),
            age: Some(41),
            weight: Some(77.5),
            height: Some(172.0),
            gender: Some(Gender::Other),
        })
        .unwrap();
    session.save_goals(vec![Goal::Rehab]).unwrap();
    session.add_note("left knee").unwrap();

    let answer = session
        .request_completion(Persona::Rehab, "Can I squat?")
        .await
        .unwrap();
    assert_eq!(answer, "Try box squats.");

    let doc = session.export_responses();
    assert_eq!(doc.kind, DocumentKind::Pdf);
    assert_eq!(doc.file_name(), "fitness_agent_responses.pdf");
    let text = String::from_utf8_lossy(&doc.bytes);
    assert!(text.contains("(Rehab Advisor) Tj"));
    assert!(text.contains("(Try box squats.) Tj"));

    // A fresh session sees what the first one saved.
    drop(session);
    let stored = ProfileStore::in_dir(tmp.path()).load().unwrap();
    assert_eq!(stored.personal.age, Some(41));
    assert_eq!(stored.goals, vec![Goal::Rehab]);
    assert_eq!(stored.notes, vec!["left knee"]);
}

#[tokio::test]
async fn test_session_survives_remote_failure() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&mock_server)
        .await;

    let client: Arc<dyn CompletionClient> = Arc::new(client_for(&mock_server));
    let mut session = Session::start(
        ProfileStore::in_dir(tmp.path()),
        client,
        DocumentExporter::default(),
    )
    .unwrap();

    let err = session.generate_nutrition_plan().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Completion(CompletionError::RemoteFailure { status: 429, .. })
    ));
    assert!(session.profile().nutrition_plan.is_none());
    assert!(session.responses().is_empty());
}
