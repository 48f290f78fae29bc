//! Chat endpoint integration tests: streaming relay, single-shot chat, history

use axum::http::{header, Method, StatusCode};
use compass_llm::mock::{MockEvent, MockLlmService};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::{body_text, parse_body, parse_sse, user_request, ChatTestApp};

fn data(json: Value) -> MockEvent {
    MockEvent::Line(format!("data: {}", json))
}

fn stream_body(conversation_id: Uuid, message: &str) -> Option<Value> {
    Some(json!({"conversation_id": conversation_id, "message": message}))
}

mod test_stream {
    use super::*;

    #[test_log::test(tokio::test)]
    #[ignore = "requires a Postgres test database"]
    async fn test_frames_relayed_in_order_and_answer_stored() {
        let llm = MockLlmService::new().with_events(vec![
            data(json!({"type": "content", "content": "A"})),
            MockEvent::Line(String::new()),
            data(json!({"type": "content", "content": "B"})),
            MockEvent::Line(String::new()),
            data(json!({"type": "sources", "sources": "X"})),
            MockEvent::Line(String::new()),
        ]);
        let app = ChatTestApp::with_llm(llm).await.unwrap();
        let user = app.create_test_user(true).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        let req = user_request(Method::POST, "/v1/chat/stream", user, stream_body(conv, "hello"));
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let events = parse_sse(&body_text(resp).await);
        let payloads: Vec<&str> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(
            payloads,
            vec![
                r#"{"content":"A","type":"content"}"#,
                r#"{"content":"B","type":"content"}"#,
                r#"{"sources":"X","type":"sources"}"#,
            ]
        );

        // The event stream ends only after the answer was stored
        let stored = app.stored_messages(conv).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0], ("USER".to_string(), "hello".to_string(), None));
        assert_eq!(
            stored[1],
            ("AI".to_string(), "AB".to_string(), Some("X".to_string()))
        );

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_first_message_seeds_title_once() {
        let app = ChatTestApp::new().await.unwrap();
        let user = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        let first = "How do I apply for the youth housing subsidy?";
        let req = user_request(Method::POST, "/v1/chat/stream", user, stream_body(conv, first));
        let resp = app.test_router().oneshot(req).await.unwrap();
        body_text(resp).await;

        let title = app.conversation_title(conv).await.unwrap();
        assert_eq!(title, format!("{}...", &first[..30]));

        let req = user_request(Method::POST, "/v1/chat/stream", user, stream_body(conv, "thanks"));
        let resp = app.test_router().oneshot(req).await.unwrap();
        body_text(resp).await;

        assert_eq!(app.conversation_title(conv).await.unwrap(), title);
        assert_eq!(app.stored_messages(conv).await.unwrap().len(), 4);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_short_first_message_used_verbatim() {
        let app = ChatTestApp::new().await.unwrap();
        let user = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        let req = user_request(Method::POST, "/v1/chat/stream", user, stream_body(conv, "Rent help"));
        let resp = app.test_router().oneshot(req).await.unwrap();
        body_text(resp).await;

        assert_eq!(app.conversation_title(conv).await.unwrap(), "Rent help");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_concurrent_first_messages_seed_title_from_earliest() {
        const SENDERS: usize = 6;

        let app = ChatTestApp::new().await.unwrap();
        let user = app.create_test_user(false).await.unwrap();

        for _ in 0..5 {
            let conv = app.create_test_conversation(user).await.unwrap();

            let mut senders = tokio::task::JoinSet::new();
            for i in 0..SENDERS {
                let router = app.test_router();
                let req = user_request(
                    Method::POST,
                    "/v1/chat/stream",
                    user,
                    stream_body(conv, &format!("question {i}")),
                );
                senders.spawn(async move {
                    let resp = router.oneshot(req).await.unwrap();
                    assert_eq!(resp.status(), StatusCode::OK);
                    body_text(resp).await
                });
            }
            while let Some(sent) = senders.join_next().await {
                sent.unwrap();
            }

            let user_messages: Vec<String> = app
                .stored_messages(conv)
                .await
                .unwrap()
                .into_iter()
                .filter(|(role, _, _)| role == "USER")
                .map(|(_, content, _)| content)
                .collect();
            assert_eq!(user_messages.len(), SENDERS);
            for i in 0..SENDERS {
                assert!(user_messages.contains(&format!("question {i}")));
            }

            // Exactly one sender seeded, and it is the first in the transcript
            assert_eq!(app.conversation_title(conv).await.unwrap(), user_messages[0]);
        }

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_other_users_conversation_is_forbidden() {
        let app = ChatTestApp::new().await.unwrap();
        let owner = app.create_test_user(false).await.unwrap();
        let intruder = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(owner).await.unwrap();

        let req = user_request(Method::POST, "/v1/chat/stream", intruder, stream_body(conv, "hi"));
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(parse_body(resp).await["error"]["code"], "FORBIDDEN");

        assert!(app.llm.recorded_requests().is_empty());
        assert!(app.stored_messages(conv).await.unwrap().is_empty());

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_unknown_conversation_is_not_found() {
        let app = ChatTestApp::new().await.unwrap();
        let user = app.create_test_user(false).await.unwrap();

        let req = user_request(
            Method::POST,
            "/v1/chat/stream",
            user,
            stream_body(Uuid::new_v4(), "hi"),
        );
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(app.llm.recorded_requests().is_empty());

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_blank_message_rejected() {
        let app = ChatTestApp::new().await.unwrap();
        let user = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        let req = user_request(Method::POST, "/v1/chat/stream", user, stream_body(conv, "   "));
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(app.stored_messages(conv).await.unwrap().is_empty());

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_missing_user_header_rejected() {
        let app = ChatTestApp::new().await.unwrap();

        let req = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/v1/chat/stream")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(
                json!({"conversation_id": Uuid::new_v4(), "message": "hi"}).to_string(),
            ))
            .unwrap();
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_unreachable_upstream_stores_no_answer() {
        let llm = MockLlmService::new().refusing("connection refused");
        let app = ChatTestApp::with_llm(llm).await.unwrap();
        let user = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        let req = user_request(Method::POST, "/v1/chat/stream", user, stream_body(conv, "hi"));
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(parse_body(resp).await["error"]["code"], "UPSTREAM_UNAVAILABLE");

        // The user message is stored before upstream is contacted
        let stored = app.stored_messages(conv).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, "USER");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_mid_stream_failure_ends_with_error_event() {
        let llm = MockLlmService::new().with_events(vec![
            data(json!({"type": "content", "content": "partial"})),
            MockEvent::Fail("connection reset".to_string()),
        ]);
        let app = ChatTestApp::with_llm(llm).await.unwrap();
        let user = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        let req = user_request(Method::POST, "/v1/chat/stream", user, stream_body(conv, "hi"));
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let events = parse_sse(&body_text(resp).await);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, r#"{"content":"partial","type":"content"}"#);
        assert_eq!(events[1].event.as_deref(), Some("error"));
        let error: Value = serde_json::from_str(&events[1].data).unwrap();
        assert_eq!(error["error"]["code"], "UPSTREAM_UNAVAILABLE");

        let stored = app.stored_messages(conv).await.unwrap();
        assert!(stored.iter().all(|(role, _, _)| role == "USER"));

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_stalled_upstream_times_out() {
        let llm = MockLlmService::new().with_events(vec![
            data(json!({"type": "content", "content": "A"})),
            MockEvent::Stall,
        ]);
        let app = ChatTestApp::with_llm(llm).await.unwrap();
        let user = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        let req = user_request(Method::POST, "/v1/chat/stream", user, stream_body(conv, "hi"));
        let resp = app.test_router().oneshot(req).await.unwrap();
        let events = parse_sse(&body_text(resp).await);

        assert_eq!(events.last().unwrap().event.as_deref(), Some("error"));
        assert!(app.llm.upstream_closed());
        assert_eq!(app.stored_messages(conv).await.unwrap().len(), 1);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_profile_withheld_without_consent() {
        let app = ChatTestApp::new().await.unwrap();
        let private = app.create_test_user(false).await.unwrap();
        let sharing = app.create_test_user(true).await.unwrap();

        for user in [private, sharing] {
            let conv = app.create_test_conversation(user).await.unwrap();
            let req = user_request(Method::POST, "/v1/chat/stream", user, stream_body(conv, "hi"));
            let resp = app.test_router().oneshot(req).await.unwrap();
            body_text(resp).await;
        }

        let requests = app.llm.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].user_id, private.to_string());
        assert!(requests[0].user_profile.name.is_none());
        assert!(requests[0].user_profile.residence.is_none());
        assert!(!requests[0].user_profile.agree_privacy);
        assert_eq!(requests[1].user_profile.residence.as_deref(), Some("Seoul"));
        assert_eq!(requests[1].user_profile.age, Some(27));

        app.cleanup().await.unwrap();
    }
}

mod test_send {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_send_stores_both_messages() {
        let app = ChatTestApp::new().await.unwrap();
        let user = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        let req = user_request(Method::POST, "/v1/chat", user, stream_body(conv, "hi"));
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body["conversation_id"], conv.to_string());
        assert_eq!(body["user_message"]["role"], "USER");
        assert_eq!(body["ai_message"]["role"], "AI");
        assert_eq!(body["ai_message"]["content"], "Mock response to: hi");

        assert_eq!(app.stored_messages(conv).await.unwrap().len(), 2);
        assert_eq!(app.conversation_title(conv).await.unwrap(), "hi");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_empty_answer_stores_nothing() {
        let app = ChatTestApp::with_llm(MockLlmService::new().with_reply(""))
            .await
            .unwrap();
        let user = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        let req = user_request(Method::POST, "/v1/chat", user, stream_body(conv, "hi"));
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        assert!(app.stored_messages(conv).await.unwrap().is_empty());
        assert_eq!(app.conversation_title(conv).await.unwrap(), "new conversation");

        app.cleanup().await.unwrap();
    }
}

mod test_history {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_history_in_creation_order() {
        let app = ChatTestApp::new().await.unwrap();
        let user = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(user).await.unwrap();

        for message in ["first", "second"] {
            let req = user_request(Method::POST, "/v1/chat", user, stream_body(conv, message));
            let resp = app.test_router().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let uri = format!("/v1/chat/history/{}", conv);
        let resp = app
            .test_router()
            .oneshot(user_request(Method::GET, &uri, user, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        let messages = body.as_array().unwrap();
        let roles: Vec<&str> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["USER", "AI", "USER", "AI"]);
        assert_eq!(messages[0]["content"], "first");
        assert_eq!(messages[2]["content"], "second");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres test database"]
    async fn test_history_guarded() {
        let app = ChatTestApp::new().await.unwrap();
        let owner = app.create_test_user(false).await.unwrap();
        let intruder = app.create_test_user(false).await.unwrap();
        let conv = app.create_test_conversation(owner).await.unwrap();

        let uri = format!("/v1/chat/history/{}", conv);
        let resp = app
            .test_router()
            .oneshot(user_request(Method::GET, &uri, intruder, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        app.cleanup().await.unwrap();
    }
}
