//! Routes exercised through the router with `oneshot`, no socket involved.

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post(app: Arc<App>, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = crate::web::router(app).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: Arc<App>, uri: &str, body: Value) -> (StatusCode, Value) {
    post(app, uri, body.to_string()).await
}

fn test_app(embeddings: Option<Arc<dyn WordEmbeddings>>) -> (Arc<App>, tempfile::TempDir) {
    let (provider, _) = StubProvider::new(search_results());
    let (app, tmp) =
        tokio::task::block_in_place(|| create_app(create_detector(provider, embeddings)));
    (Arc::new(app), tmp)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_plagiarism_route() {
    let (app, _tmp) = test_app(None);

    let (status, body) = post_json(app, "/find_plagiarism", json!({"text": SOURCE_TEXT})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "tfidf");
    assert_eq!(body["total_paragraphs_processed"], 1);
    assert_eq!(body["SortedUrls"][0]["link"], "https://energy.example");
    assert!(body["results"][0]["individual_similarity"].is_array());
    assert!(body["results"][0]["sorted_similarity"].is_array());
    assert!(body.get("errors").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_validation_errors() {
    let (app, _tmp) = test_app(None);

    let cases = [
        ("/find_plagiarism", json!({}), "Invalid data"),
        ("/find_plagiarism", json!({"txt": "x"}), "Missing text"),
        ("/find_plagiarism", json!({"text": 3}), "text is not of type str"),
        ("/search", json!({"text": []}), "text is empty"),
        ("/cosine-similarity", json!({"input_texts": "x"}), "input_texts is not of type list"),
        ("/download-text", json!({"urls": []}), "urls is empty"),
        ("/compare", json!({"text1": "a", "text2": " "}), "text2 is empty"),
    ];

    for (uri, request, message) in cases {
        let (status, body) = post_json(app.clone(), uri, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], message, "{uri}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_body() {
    let (app, _tmp) = test_app(None);

    let (status, body) = post(app, "/extract_keywords", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid data");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keywords_and_search_routes() {
    let (app, _tmp) = test_app(None);

    let (status, body) = post_json(app.clone(), "/extract_keywords", json!({"text": SOURCE_TEXT})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["results"].as_array().unwrap().is_empty());

    let (status, body) = post_json(app, "/search", json!({"text": ["solar panel"]})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][1]["link"], "https://energy.example");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cosine_similarity_returns_first_result() {
    let (app, _tmp) = test_app(None);

    let request = json!({
        "input_texts": [SOURCE_TEXT, "Butter."],
        "target_texts": ["Unrelated words entirely.", SOURCE_TEXT],
    });
    let (status, body) = post_json(app, "/cosine-similarity", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input_text"], "solar panel convert sunlight electricity home");
    assert_eq!(body["SortedUrls"][0]["link"], "target-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cosine_similarity_model_route() {
    let (app, _tmp) = test_app(None);
    let request = json!({"input_texts": [SOURCE_TEXT], "target_texts": [SOURCE_TEXT]});

    let (status, body) = post_json(app, "/cosine-similarity-model", request.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "word embeddings are not loaded");

    let (app, _tmp) = test_app(Some(word_vectors()));
    let (status, body) = post_json(app, "/cosine-similarity-model", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["SortedUrls"][0]["link"], "target-0");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_edit_distance_routes() {
    let (app, _tmp) = test_app(None);

    let (status, body) = post_json(app.clone(), "/compare", json!({"text1": "horse.", "text2": "ros."})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["similarity"], 50.0);

    let request = json!({
        "text1": "Same here. Different there.",
        "text2": "Same here.",
        "granularity": "sentences",
    });
    let (status, body) = post_json(app, "/compare-chunks", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunkSimilarities"].as_array().unwrap().len(), 2);
    assert_eq!(body["chunkSimilarities"][0], 100.0);
}
