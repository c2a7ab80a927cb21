//! End-to-end routing through the real acquisition strategies.
//!
//! The router, backend agents and `BackendClient` run unmodified; only the
//! network edges are replaced by the in-memory adapters, so every test can
//! assert exactly which backend calls were made.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use maf_router::adapters::ai::MockChatModel;
use maf_router::adapters::testing::{
    DirectLineCall, MockActivityStream, MockAnswerService, MockDirectLine, MockOracle,
    RecordingSleeper,
};
use maf_router::application::{
    AcquisitionSettings, BackendAgent, BackendClient, BackendRegistry, ChatOracle, Router,
    Transports,
};
use maf_router::domain::{
    AcquisitionError, ActivitySet, BackendDescriptor, ConversationAccess, RoutingError,
};
use maf_router::ports::{AcquisitionStrategy, StreamFrame};

struct Harness {
    answers: MockAnswerService,
    direct_line: MockDirectLine,
    streams: MockActivityStream,
    sleeper: RecordingSleeper,
}

impl Harness {
    fn new() -> Self {
        Self {
            answers: MockAnswerService::new(),
            direct_line: MockDirectLine::new(),
            streams: MockActivityStream::new(),
            sleeper: RecordingSleeper::new(),
        }
    }

    fn transports(&self) -> Transports {
        Transports {
            answers: Arc::new(self.answers.clone()),
            direct_line: Arc::new(self.direct_line.clone()),
            streams: Arc::new(self.streams.clone()),
            sleeper: Arc::new(self.sleeper.clone()),
        }
    }

    fn registry(&self) -> BackendRegistry {
        BackendRegistry::build(
            descriptors(),
            self.transports(),
            AcquisitionSettings::default(),
            None,
        )
    }

    fn router(&self, oracle_reply: &str) -> Router {
        Router::new(
            Arc::new(MockOracle::new().with_reply(oracle_reply)),
            self.registry(),
        )
    }

    fn client(&self, descriptor: BackendDescriptor) -> BackendClient {
        BackendClient::new(
            descriptor,
            self.transports(),
            Arc::new(AcquisitionSettings::default()),
        )
    }
}

fn access(name: &str) -> ConversationAccess {
    ConversationAccess::new(
        format!("https://{}.directline.test/v3/directline/tokens/generate", name),
        format!("https://{}.directline.test/v3/directline/conversations", name),
        format!("{}-secret", name),
    )
}

fn descriptors() -> Vec<BackendDescriptor> {
    vec![
        BackendDescriptor::direct("aima_agent", "https://aima.test/chat"),
        BackendDescriptor::polling("difa_agent", access("difa")),
        BackendDescriptor::streaming("gino_agent", access("gino")),
    ]
}

fn text_frame(text: &str) -> StreamFrame {
    StreamFrame::Text(json!({"activities": [{"type": "message", "text": text}]}).to_string())
}

fn activities(value: serde_json::Value) -> ActivitySet {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn gino_query_is_answered_from_the_third_stream_frame() {
    let mut harness = Harness::new();
    harness.streams = MockActivityStream::new()
        .with_frame(text_frame("hello"))
        .with_frame(text_frame("..."))
        .with_frame(text_frame("Inspeksi dilakukan oleh PT Surveyor Indonesia."));
    let router = harness.router("{'agent': 'gino_agent', 'message': 'hello'}");

    let outcome = router
        .route_collect("Apa lembaga inspeksi yang melakukan inspeksi untuk DPPU Ahmad Yani?")
        .await
        .unwrap();

    assert_eq!(outcome.label, "GINO");
    assert_eq!(outcome.reply, "Inspeksi dilakukan oleh PT Surveyor Indonesia.");

    let calls = harness.direct_line.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[0],
        DirectLineCall::FetchToken {
            url: "https://gino.directline.test/v3/directline/tokens/generate".to_string(),
            bearer: "gino-secret".to_string(),
        }
    );
    match &calls[2] {
        DirectLineCall::PostActivity { url, bearer, activity } => {
            assert_eq!(
                url,
                "https://gino.directline.test/v3/directline/conversations/conv-1/activities"
            );
            assert_eq!(bearer, "token-1");
            assert_eq!(activity.text, "hello");
        }
        other => panic!("expected the message post, got {:?}", other),
    }
    assert_eq!(harness.streams.frames_consumed(), 3);
    assert!(harness.streams.closed());
    assert_eq!(harness.answers.call_count(), 0);
}

#[tokio::test]
async fn unparseable_oracle_reply_makes_no_backend_calls() {
    let harness = Harness::new();
    let router = harness.router("GINO sounds right for this one.");

    let err = router.route_collect("Apa lembaga inspeksi?").await.unwrap_err();

    assert_eq!(
        err.to_record(),
        json!({
            "Error": "[ORCHESTRATOR] Failed to parse JSON",
            "raw_response": "GINO sounds right for this one."
        })
    );
    assert!(harness.direct_line.calls().is_empty());
    assert_eq!(harness.answers.call_count(), 0);
    assert!(harness.streams.connected_urls().is_empty());
}

#[tokio::test]
async fn unknown_agent_makes_no_backend_calls() {
    let harness = Harness::new();
    let router = harness.router("{'agent': 'hr_agent', 'message': 'cuti'}");

    let err = router.route_collect("Berapa sisa cuti saya?").await.unwrap_err();

    assert!(matches!(err, RoutingError::UnknownAgent { .. }));
    assert_eq!(err.to_record()["Error"], "[ORCHESTRATOR] Unknown agent");
    assert!(harness.direct_line.calls().is_empty());
    assert_eq!(harness.answers.call_count(), 0);
}

#[tokio::test]
async fn difa_query_polls_until_the_reply_arrives() {
    let mut harness = Harness::new();
    let echo = json!({"activities": [{"from": {"id": "azure-agent"}, "text": "Siapa saja?"}]});
    harness.direct_line = MockDirectLine::new()
        .with_activities(activities(echo.clone()))
        .with_activities(activities(echo))
        .with_activities(activities(json!({
            "activities": [
                {"from": {"id": "azure-agent"}, "text": "Siapa saja?"},
                {"from": {"id": "difa-bot"}, "text": "PGN dan Pertagas."}
            ],
            "watermark": "2"
        })));
    let router = harness.router(r#"{"agent": "difa_agent", "message": "Siapa saja?"}"#);

    let outcome = router
        .route_collect("Siapa saja yang tergabung dalam usecase Jargas?")
        .await
        .unwrap();

    assert_eq!(outcome.reply, "PGN dan Pertagas.");
    assert_eq!(harness.direct_line.list_count(), 3);
    assert_eq!(
        harness.sleeper.recorded(),
        vec![Duration::from_secs(2), Duration::from_secs(3), Duration::from_secs(5)]
    );
}

#[tokio::test]
async fn aima_query_posts_once_and_reads_the_first_data_point() {
    let mut harness = Harness::new();
    harness.answers = MockAnswerService::new().with_body(json!({
        "context": {"data_points": {"text": ["Kargo BBM dan LPG.", "ignored"]}}
    }));
    let router = harness.router("{'agent': 'aima_agent', 'message': 'Jenis kargo?'}");

    let outcome = router.route_collect("Jenis kargo apa saja?").await.unwrap();

    assert_eq!(outcome.reply, "Kargo BBM dan LPG.");
    let calls = harness.answers.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, "https://aima.test/chat");
    assert_eq!(calls[0].timeout, Duration::from_secs(40));
    assert!(harness.direct_line.calls().is_empty());
}

#[tokio::test]
async fn transport_failures_become_error_text_on_every_strategy() {
    let mut harness = Harness::new();
    harness.answers =
        MockAnswerService::new().with_error(AcquisitionError::Timeout { timeout_secs: 40 });
    harness.direct_line = MockDirectLine::new()
        .with_token_error(AcquisitionError::transport("connection refused"));

    for (descriptor, label) in descriptors().into_iter().zip(["AIMA", "DIFA", "GINO"]) {
        let reply = harness.client(descriptor).ask("q").await;
        assert!(
            reply.starts_with(&format!("Error accessing {}: ", label)),
            "unexpected reply: {}",
            reply
        );
    }
    assert!(harness.sleeper.recorded().is_empty());
    assert!(harness.streams.connected_urls().is_empty());
}

#[tokio::test]
async fn silent_stream_backend_reports_no_answer() {
    let mut harness = Harness::new();
    harness.streams = MockActivityStream::new().with_frame(text_frame("hello"));
    let client = harness.client(BackendDescriptor::streaming("gino_agent", access("gino")));

    assert_eq!(
        client.ask("hello").await,
        "GINO tidak merespons dalam waktu yang ditentukan."
    );
}

#[tokio::test]
async fn relayed_answers_use_the_backend_instruction() {
    let harness = Harness::new();
    let harness = Harness {
        answers: MockAnswerService::new().with_body(json!({
            "context": {"data_points": {"text": ["BBM"]}}
        })),
        ..harness
    };
    let model = MockChatModel::new()
        .with_response("{'agent': 'aima_agent', 'message': 'Jenis kargo?'}")
        .with_response("Kargo yang diangkut adalah BBM.");

    let descriptor = BackendDescriptor::direct("aima_agent", "https://aima.test/chat")
        .with_instruction("Jawab dengan kalimat lengkap.");
    let mut registry = BackendRegistry::new();
    registry.insert(
        BackendAgent::new(Arc::new(harness.client(descriptor))).with_relay(Arc::new(model.clone())),
    );
    let router = Router::new(
        Arc::new(ChatOracle::new(Arc::new(model.clone()), "Route the query.")),
        registry,
    );

    let mut chunks = Vec::new();
    let outcome = router
        .route("Jenis kargo apa saja?", |chunk| chunks.push(chunk.to_string()))
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Kargo yang diangkut adalah BBM.");
    assert!(chunks.len() > 1);
    let calls = model.get_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].system_prompt.as_deref(), Some("Route the query."));
    assert_eq!(calls[1].system_prompt.as_deref(), Some("Jawab dengan kalimat lengkap."));
}
