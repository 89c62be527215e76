//! HTTP backend integration tests
//!
//! Exercises `HttpBackend` against a `wiremock` mock server: request paths,
//! methods and bodies, response parsing, and the mapping of non-2xx
//! statuses to backend errors.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use common::{http_backend, session_json};
use ragchat::api::{
    ChatBackend, ChatMessage, ChatRequest, KnowledgeRequest, MessageRole, RagChatRequest,
};

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_sessions_parses_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [session_json("s2", "Second", 4), session_json("s1", "First", 0)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = http_backend(&server.uri()).list_sessions().await.unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, "s2");
    assert_eq!(sessions[0].message_count, 4);
    assert_eq!(sessions[1].name, "First");
}

#[tokio::test]
async fn test_list_sessions_tolerates_null_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sessions": null })))
        .mount(&server)
        .await;

    let sessions = http_backend(&server.uri()).list_sessions().await.unwrap();
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_create_session_posts_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sessions"))
        .and(body_json(json!({ "name": "Planning" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "session": session_json("s9", "Planning", 0) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = http_backend(&server.uri())
        .create_session("Planning")
        .await
        .unwrap();
    assert_eq!(session.id, "s9");
    assert_eq!(session.name, "Planning");
}

#[tokio::test]
async fn test_get_messages_keeps_role_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                { "role": "user", "content": "hi" },
                { "role": "assistant", "content": "hello" },
                { "role": "tool", "content": "ignored by the view" }
            ]
        })))
        .mount(&server)
        .await;

    let messages = http_backend(&server.uri()).get_messages("s1").await.unwrap();

    assert_eq!(messages[0], ChatMessage::user("hi"));
    assert_eq!(messages[1], ChatMessage::assistant("hello"));
    assert_eq!(messages[2].role, MessageRole::Other);
}

#[tokio::test]
async fn test_session_id_is_one_encoded_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    http_backend(&server.uri())
        .delete_session("a/b c")
        .await
        .unwrap();

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/api/sessions/a%2Fb%20c");
}

#[tokio::test]
async fn test_rename_session_puts_name() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/sessions/s1"))
        .and(body_json(json!({ "name": "Renamed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    http_backend(&server.uri())
        .rename_session("s1", "Renamed")
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Chat and knowledge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_chat_body_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "message": "hello",
            "role": "coder",
            "session_id": "s1"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "reply": "Hi there", "session_id": "s1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = http_backend(&server.uri())
        .chat(&ChatRequest {
            message: "hello".to_string(),
            role: "coder".to_string(),
            session_id: "s1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(reply.text(), Some("Hi there"));
}

#[tokio::test]
async fn test_rag_chat_omits_missing_namespace() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rag/chat"))
        .and(body_json(json!({
            "query": "leave policy?",
            "mode": "rag",
            "top_k": 3,
            "debug": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Ten days.",
            "mode": "rag",
            "docs_count": 1,
            "hit_docs": ["Leave policy"],
            "fallback": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = http_backend(&server.uri())
        .rag_chat(&RagChatRequest {
            query: "leave policy?".to_string(),
            mode: "rag".to_string(),
            namespace: None,
            top_k: 3,
            debug: true,
        })
        .await
        .unwrap();
    assert_eq!(reply.text(), Some("Ten days."));
    assert_eq!(reply.hit_docs(), ["Leave policy".to_string()]);
    assert!(!reply.fallback);
}

#[tokio::test]
async fn test_ingest_counts_knowledges_when_chunks_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rag/knowledge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "knowledges": [{ "id": 1 }, { "id": 2 }]
        })))
        .mount(&server)
        .await;

    let receipt = http_backend(&server.uri())
        .ingest_knowledge(&KnowledgeRequest {
            title: "t".to_string(),
            content: "c".to_string(),
            source: "manual".to_string(),
            namespace: "default".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(receipt.chunk_count(), 2);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_error_status_keeps_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "session not found" })),
        )
        .mount(&server)
        .await;

    let err = http_backend(&server.uri())
        .get_session("missing")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Backend error: HTTP 404: session not found");
}

#[tokio::test]
async fn test_error_status_without_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = http_backend(&server.uri())
        .list_sessions()
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Backend error: HTTP 502");
}

#[tokio::test]
async fn test_unparseable_success_body_is_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = http_backend(&server.uri())
        .create_session("x")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to parse create session response"));
}

#[tokio::test]
async fn test_unreachable_server_is_backend_error() {
    // Nothing listens on the discard port
    let err = http_backend("http://127.0.0.1:9")
        .list_sessions()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to reach chat backend"));
}
