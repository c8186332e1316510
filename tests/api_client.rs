//! Endpoint tests against a mock backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use coddoc::api::{AnalyzeRequest, ApiClient, ApiError, DocumentRequest, ReviewsQuery};
use coddoc::language::{DocStyle, Language};
use coddoc::query::QueryCache;
use mockito::{Matcher, Server};
use serde_json::json;

fn client(server: &Server) -> ApiClient {
    ApiClient::new(&server.url(), None).unwrap()
}

fn analyze_body(score: f64) -> String {
    json!({
        "review_id": "rev-1",
        "code": "print(1)",
        "language": "python",
        "analysis": {
            "summary": "Prints a number",
            "quality_score": score,
            "issues": [
                {"severity": "low", "category": "style", "description": "No main guard",
                 "line_number": 1, "suggestion": "Add one"}
            ],
            "suggestions": [],
            "security_concerns": []
        },
        "created_at": "2024-03-01T12:30:00Z"
    })
    .to_string()
}

#[tokio::test]
async fn test_analyze_sends_minimal_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/analyze")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"code": "print(1)", "language": "python"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(analyze_body(9.2))
        .create_async()
        .await;

    let request = AnalyzeRequest {
        code: "print(1)".to_string(),
        language: Language::Python,
        filename: None,
        llm_provider: None,
    };
    let response = client(&server).analyze(&request).await.unwrap();

    assert_eq!(response.review_id, "rev-1");
    assert_eq!(response.analysis.quality_score, 9.2);
    assert_eq!(response.analysis.issues[0].line_number, Some(1));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_document_sends_style_and_provider() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/document")
        .match_body(Matcher::PartialJson(json!({
            "language": "java",
            "doc_style": "javadoc",
            "llm_provider": "openai",
            "filename": "App.java"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "doc_id": "doc-1",
                "code": "class App {}",
                "language": "java",
                "documentation": {"overview": "An app"},
                "created_at": "2024-03-01T12:30:00Z"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = DocumentRequest {
        code: "class App {}".to_string(),
        language: Language::Java,
        filename: Some("App.java".to_string()),
        doc_style: Some(DocStyle::Javadoc),
        llm_provider: Some("openai".to_string()),
    };
    let response = client(&server).document(&request).await.unwrap();

    assert_eq!(response.documentation.overview, "An app");
    assert!(response.documentation.functions.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_code_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/analyze")
        .expect(0)
        .create_async()
        .await;

    let request = AnalyzeRequest {
        code: "  \n\t ".to_string(),
        language: Language::Python,
        filename: None,
        llm_provider: None,
    };
    let err = client(&server).analyze(&request).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(err.to_string(), "Please enter some code");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_reviews_query_parameters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/reviews")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
            Matcher::UrlEncoded("language".into(), "go".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"reviews": [], "pagination": {"page": 2, "limit": 10, "total": 0, "pages": 0}}"#)
        .create_async()
        .await;

    let list = client(&server)
        .list_reviews(&ReviewsQuery::new(2, 10, Some("go")))
        .await
        .unwrap();

    assert!(list.reviews.is_empty());
    assert_eq!(list.pagination.total, 0);
    assert_eq!(list.pagination.last_page(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_reviews_rejects_page_zero_locally() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/reviews")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client(&server)
        .list_reviews(&ReviewsQuery::new(0, 10, None))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_review_not_found_uses_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/reviews/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Review not found"}"#)
        .create_async()
        .await;

    let err = client(&server).get_review("missing").await.unwrap_err();

    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert_eq!(err.to_string(), "HTTP 404 Not Found: Review not found");
}

#[tokio::test]
async fn test_server_error_plain_text_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/config/llm-providers")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let err = client(&server).list_providers().await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_review_accepts_no_content() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/reviews/rev-1")
        .with_status(204)
        .create_async()
        .await;

    client(&server).delete_review("rev-1").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_providers() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/config/llm-providers")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"providers": [
                {"id": "gemini", "name": "Google Gemini", "models": ["gemini-1.5-pro"], "default": true},
                {"id": "openai", "name": "OpenAI", "models": ["gpt-4o"], "default": false}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let providers = client(&server).list_providers().await.unwrap();

    assert_eq!(providers.providers.len(), 2);
    assert_eq!(
        providers.default_provider().map(|p| p.id.as_str()),
        Some("gemini")
    );
}

#[tokio::test]
async fn test_health_behind_path_prefix() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/coddoc/api/health")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "healthy", "version": "1.0.0", "database": "ok"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&format!("{}/coddoc/", server.url()), None).unwrap();
    let health = client.health().await.unwrap();

    assert_eq!(health.status(), Some("healthy"));
    assert_eq!(health.version(), Some("1.0.0"));
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/reviews/rev-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("<html>proxy error</html>")
        .create_async()
        .await;

    let err = client(&server).get_review("rev-1").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    let client = ApiClient::new("http://127.0.0.1:9", None).unwrap();
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.to_string().starts_with("Network error"));
}

#[tokio::test]
async fn test_concurrent_identical_queries_share_one_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/config/llm-providers")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"providers": []}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client(&server);
    let cache = QueryCache::new();
    let fetchers = Arc::new(AtomicUsize::new(0));

    let fetch = || {
        let client = client.clone();
        let fetchers = fetchers.clone();
        cache.fetch((), move || async move {
            fetchers.fetch_add(1, Ordering::SeqCst);
            client.list_providers().await.map_err(|e| e.to_string())
        })
    };
    let (first, second) = tokio::join!(fetch(), fetch());

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(fetchers.load(Ordering::SeqCst), 1);
    mock.assert_async().await;
}
