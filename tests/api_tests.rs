//! Integration tests for the report client against a mocked backend

use gardenkit::config::ApiConfig;
use gardenkit::{
    ApiError, ChatContext, ChatQueryArgs, ChatQueryResponse, ConversationTurn, GenerateArgs,
    ReportClient, ReportResponse,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_args() -> GenerateArgs {
    GenerateArgs {
        before_image: "data:image/jpeg;base64,QkVGT1JF".to_string(),
        after_image: Some("data:image/jpeg;base64,QUZURVI=".to_string()),
        requested_tasks: "Mow lawn\nEdge beds".to_string(),
        contractor_accomplishments: Some("Mowed and edged".to_string()),
    }
}

fn sample_report() -> ReportResponse {
    ReportResponse {
        report: "# Landscaping report\n\nAll tasks done.".to_string(),
        before_analysis_text: "Tall grass, ragged edges".to_string(),
        original_tasks_text: "Mow lawn\nEdge beds".to_string(),
        contractor_accomplishments_text: Some("Mowed and edged".to_string()),
        error: None,
    }
}

fn client_for(server: &MockServer) -> ReportClient {
    ReportClient::new(ApiConfig::new(server.uri()))
}

#[tokio::test]
async fn test_submit_analysis_returns_report() {
    let mock_server = MockServer::start().await;
    let args = sample_args();

    Mock::given(method("POST"))
        .and(path("/analyze_landscaping"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "before_image": "data:image/jpeg;base64,QkVGT1JF",
            "after_image": "data:image/jpeg;base64,QUZURVI=",
            "requested_tasks": "Mow lawn\nEdge beds",
            "contractor_accomplishments": "Mowed and edged"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&sample_report()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = client_for(&mock_server).submit_analysis(&args).await.unwrap();
    assert_eq!(report, sample_report());
}

#[tokio::test]
async fn test_submit_analysis_sends_null_after_image() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze_landscaping"))
        .and(body_json(json!({
            "before_image": "data:image/jpeg;base64,QkVGT1JF",
            "after_image": null,
            "requested_tasks": "Plant roses"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&sample_report()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let args = GenerateArgs {
        before_image: "data:image/jpeg;base64,QkVGT1JF".to_string(),
        after_image: None,
        requested_tasks: "Plant roses".to_string(),
        contractor_accomplishments: None,
    };
    client_for(&mock_server).submit_analysis(&args).await.unwrap();
}

#[tokio::test]
async fn test_remote_error_uses_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze_landscaping"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "bad input" })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .submit_analysis(&sample_args())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Remote { status: 400, .. }));
    assert_eq!(err.to_string(), "bad input");
}

#[tokio::test]
async fn test_remote_error_without_message_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze_landscaping"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "detail": "busy" })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .submit_analysis(&sample_args())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_remote_error_with_non_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat_query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let args = ChatQueryArgs {
        user_question: "Was the hedge trimmed?".to_string(),
        before_image: None,
        after_image: None,
        context: ChatContext::default(),
    };
    let err = client_for(&mock_server)
        .submit_chat_query(&args)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Remote { status: 500, .. }));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_malformed_success_body_is_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze_landscaping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"report\": "))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .submit_analysis(&sample_args())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Deserialization(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Nothing listens on the discard port
    let client = ReportClient::new(ApiConfig::new("http://127.0.0.1:9"));

    let err = client.submit_analysis(&sample_args()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn test_submit_chat_query_sends_context() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat_query"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "user_question": "Were the beds edged?",
            "before_image": "data:image/jpeg;base64,QkVGT1JF",
            "context": {
                "before_analysis": "Tall grass, ragged edges",
                "original_tasks": "Mow lawn\nEdge beds",
                "contractor_accomplishments": "Mowed and edged",
                "full_report": "# Landscaping report\n\nAll tasks done.",
                "conversation_history": [
                    { "role": "user", "message": "Was the lawn mowed?" },
                    { "role": "assistant", "message": "Yes." }
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Yes, the bed edges are clean."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut context = ChatContext::from_report(&sample_report());
    context.conversation_history = Some(vec![
        ConversationTurn::user("Was the lawn mowed?"),
        ConversationTurn::assistant("Yes."),
    ]);

    let args = ChatQueryArgs {
        user_question: "Were the beds edged?".to_string(),
        before_image: Some("data:image/jpeg;base64,QkVGT1JF".to_string()),
        after_image: None,
        context,
    };

    let response = client_for(&mock_server)
        .submit_chat_query(&args)
        .await
        .unwrap();
    assert_eq!(
        response,
        ChatQueryResponse {
            response: "Yes, the bed edges are clean.".to_string(),
            error: None,
        }
    );
}

#[tokio::test]
async fn test_base_url_with_trailing_slash() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze_landscaping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&sample_report()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ReportClient::new(ApiConfig::new(format!("{}/", mock_server.uri())));
    client.submit_analysis(&sample_args()).await.unwrap();
}
