//! Integration tests for the assistant HTTP client
//!
//! Tests request shapes and error mapping using wiremock.

use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use mcp_goal_router::assistant::{AssistantApi, AssistantClient};
use mcp_goal_router::config::{AssistantConfig, RequestConfig};
use mcp_goal_router::error::AssistantError;
use mcp_goal_router::planner::ContentType;

/// Create a test client pointing to mock server
fn create_test_client(base_url: &str) -> AssistantClient {
    let config = AssistantConfig {
        base_url: base_url.to_string(),
        api_key: Some("test-api-key".to_string()),
    };
    AssistantClient::new(&config, RequestConfig { timeout_ms: 5000 })
        .expect("Failed to create client")
}

#[cfg(test)]
mod request_tests {
    use super::*;

    #[tokio::test]
    async fn test_page_type_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/page-type"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"space_key": "DOCS", "page_title": "talk"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content_type": "Video"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let content_type = client.page_type("DOCS", "talk").await.unwrap();
        assert_eq!(content_type, ContentType::Video);
    }

    #[tokio::test]
    async fn test_unknown_page_type_is_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/page-type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content_type": "pdf"})))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        assert_eq!(
            client.page_type("DOCS", "manual").await.unwrap(),
            ContentType::Text
        );
    }

    #[tokio::test]
    async fn test_search_is_page_scoped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/search"))
            .and(body_json(json!({
                "space_key": "DOCS",
                "page_titles": ["Intro"],
                "query": "summarize this"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "An overview."})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let answer = client
            .search("DOCS", &["Intro".to_string()], "summarize this")
            .await
            .unwrap();
        assert_eq!(answer, "An overview.");
    }

    #[tokio::test]
    async fn test_code_assistant_response_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/code-assistant"))
            .and(body_json(json!({
                "space_key": "DOCS",
                "page_title": "utils.py",
                "instruction": "convert to go"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "original_code": "def f(): pass",
                "converted_code": "func f() {}"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let response = client
            .code_assistant("DOCS", "utils.py", "convert to go")
            .await
            .unwrap();
        assert_eq!(response.original_code, "def f(): pass");
        assert_eq!(response.converted_code.as_deref(), Some("func f() {}"));
        assert!(response.modified_code.is_none());
    }

    #[tokio::test]
    async fn test_pairwise_request_bodies() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/impact-analyzer"))
            .and(body_json(json!({
                "space_key": "DOCS",
                "old_page_title": "v1",
                "new_page_title": "v2",
                "question": "what changed"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "lines_added": 10,
                "lines_removed": 4,
                "files_changed": 1,
                "percentage_change": 7.5,
                "risk_level": "medium",
                "risk_score": 5.5,
                "diff": "+a\n-b",
                "impact_analysis": "Moderate"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/test-support"))
            .and(body_json(json!({
                "space_key": "DOCS",
                "code_page_title": "app.py",
                "test_input_page_title": "cases",
                "question": "write tests"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"test_strategy": "## Plan"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let impact = client
            .impact_analysis("DOCS", "v1", "v2", "what changed")
            .await
            .unwrap();
        assert_eq!(impact.lines_added, 10);
        assert_eq!(impact.risk_level, "medium");

        let strategy = client
            .test_strategy("DOCS", "app.py", "cases", "write tests")
            .await
            .unwrap();
        assert_eq!(strategy, "## Plan");
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/video-summarizer"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client.video_summary("DOCS", "talk").await.unwrap_err();

        match err {
            AssistantError::Api {
                endpoint,
                status,
                message,
            } => {
                assert_eq!(endpoint, "video-summarizer");
                assert_eq!(status, 503);
                assert_eq!(message, "unavailable");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/images"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client.images("DOCS", "gallery").await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "late"}))
                    .set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let config = AssistantConfig {
            base_url: mock_server.uri(),
            api_key: None,
        };
        let client = AssistantClient::new(&config, RequestConfig { timeout_ms: 50 }).unwrap();
        let err = client
            .search("DOCS", &["Intro".to_string()], "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Timeout { timeout_ms: 50 }));
    }
}
