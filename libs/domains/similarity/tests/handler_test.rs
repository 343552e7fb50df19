//! Handler tests for the similarity domain
//!
//! These run the domain router in-process against the in-memory index and
//! the hashing embedder:
//! - Token checks on the protected routes
//! - Query parameter handling and limit clamping
//! - Store / query / delete round trips per domain
//! - Error responses for malformed bodies and upstream failures

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::TokenAuth;
use domain_similarity::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::in_memory_state;
use tower::ServiceExt; // For oneshot()

const TOKEN: &str = "test-token";

async fn app() -> Router {
    handlers::router(in_memory_state().await.unwrap(), TokenAuth::new(TOKEN))
}

// Helper to parse JSON response body
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("X-ACCESS-TOKEN", TOKEN)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-ACCESS-TOKEN", TOKEN)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    post(uri, serde_json::to_string(&body).unwrap())
}

#[tokio::test]
async fn test_root_is_public() {
    let response = app()
        .await
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response.into_body()).await,
        json!({"message": "ML Service API"})
    );
}

#[tokio::test]
async fn test_missing_token_returns_400() {
    let response = app()
        .await
        .oneshot(
            Request::get("/autoinsider/similar/problems/index?question=brakes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Client error: A valid token is missing!");
}

#[tokio::test]
async fn test_wrong_token_returns_401() {
    let response = app()
        .await
        .oneshot(
            Request::post("/europeanrailguide/similar/places/store")
                .header("X-ACCESS-TOKEN", "not-the-token")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"data": []}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Client error: Your token is invalid!");
}

#[tokio::test]
async fn test_missing_question_returns_400() {
    let app = app().await;

    for uri in [
        "/autoinsider/similar/problems/index",
        "/autoinsider/similar/problems/index?question=",
        "/autoinsider/similar/problems/index?question=%20%20",
        "/autoinsider/similar/problems/index?query=brakes",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = json_body(response.into_body()).await;
        assert_eq!(body["message"], "Client error: No question provided");
    }

    let response = app
        .oneshot(get("/europeanrailguide/similar/places/index?question=rome"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Client error: No query provided");
}

#[tokio::test]
async fn test_limit_is_clamped() {
    let app = app().await;

    for (limit, expected) in [
        ("", 5),
        ("&limit=3", 3),
        ("&limit=10", 10),
        ("&limit=11", 5),
        ("&limit=0", 5),
        ("&limit=-2", 5),
        ("&limit=abc", 5),
    ] {
        let uri = format!("/autoinsider/similar/problems/index?question=brakes{}", limit);
        let response = app.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response.into_body()).await;
        assert_eq!(body["requested"], expected, "limit {limit:?}");
    }
}

#[tokio::test]
async fn test_query_on_empty_index_returns_empty_list() {
    let response = app()
        .await
        .oneshot(get("/autoinsider/similar/problems/index?question=brakes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["message"], "AutoInsider Problem Fix ML Service");
    assert_eq!(body["question"], "brakes");
    assert_eq!(body["similar-questions"], json!([]));
}

#[tokio::test]
async fn test_store_then_query_problems() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/autoinsider/similar/problems/store",
            json!({"data": [
                {"ID": 1, "Title": "Brake noise", "Context": "Brake noise when stopping"},
                {"ID": "2", "Title": "Battery", "Context": "Battery drains overnight"}
            ]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response.into_body()).await,
        json!({"message": "Added records to index", "records": 2})
    );

    let response = app
        .oneshot(get(
            "/autoinsider/similar/problems/index?question=brake+noise&limit=1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["question"], "brake noise");
    assert_eq!(body["requested"], 1);

    let matches = body["similar-questions"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["ai_id"], "1");
    assert_eq!(matches[0]["problem_title"], "Brake noise");
    assert!(matches[0]["score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_places_use_their_own_vocabulary_and_index() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/europeanrailguide/similar/places/store",
            json!({"data": [
                {"ID": "7", "Title": "Colosseum", "Context": "Colosseum ancient amphitheatre in Rome"}
            ]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(
            "/europeanrailguide/similar/places/index?query=ancient+Rome",
        ))
        .await
        .unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(body["message"], "European Rail Guide Similar Place Service");
    assert_eq!(body["query"], "ancient Rome");
    assert_eq!(body["similar-places"][0]["erg_id"], "7");
    assert_eq!(body["similar-places"][0]["place_name"], "Colosseum");

    // Records stored for one domain never leak into the other.
    let response = app
        .oneshot(get(
            "/autoinsider/similar/problems/index?question=ancient+Rome",
        ))
        .await
        .unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(body["similar-questions"], json!([]));
}

#[tokio::test]
async fn test_delete_removes_records() {
    let app = app().await;

    app.clone()
        .oneshot(post_json(
            "/autoinsider/similar/problems/store",
            json!({"data": [
                {"ID": "1", "Title": "Brake noise", "Context": "Brake noise when stopping"}
            ]}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/autoinsider/similar/problems/delete",
            json!({"data": ["1", "unknown"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response.into_body()).await,
        json!({"message": "Deleted records from index", "records": 2})
    );

    let response = app
        .oneshot(get("/autoinsider/similar/problems/index?question=brake"))
        .await
        .unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(body["similar-questions"], json!([]));
}

#[tokio::test]
async fn test_delete_requires_a_list() {
    let response = app()
        .await
        .oneshot(post_json(
            "/europeanrailguide/similar/places/delete",
            json!({"data": "7"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Should be a list of vector ids");
}

#[tokio::test]
async fn test_malformed_bodies_return_400() {
    let app = app().await;

    let cases = [
        post("/autoinsider/similar/problems/store", "{not json"),
        post_json("/autoinsider/similar/problems/store", json!({"records": []})),
        post_json(
            "/autoinsider/similar/problems/store",
            json!({"data": [{"ID": "1", "Title": "No context"}]}),
        ),
        post_json("/autoinsider/similar/problems/delete", json!(["1"])),
    ];

    for request in cases {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

struct UnavailableEmbedder;

#[async_trait]
impl EmbeddingProvider for UnavailableEmbedder {
    async fn embed(&self, _text: &str) -> ServiceResult<Vec<f32>> {
        Err(SimilarityError::Embedding("connection refused".into()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
        Err(SimilarityError::Embedding("connection refused".into()))
    }
}

#[tokio::test]
async fn test_upstream_failure_returns_503_without_details() {
    let index = Arc::new(InMemoryIndex::new());
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(UnavailableEmbedder);
    let state = SimilarityState::new(
        Arc::new(ContentService::new(Domain::AutoInsider, index.clone(), embedder.clone())),
        Arc::new(ContentService::new(Domain::EuropeanRailGuide, index, embedder)),
    );
    let app = handlers::router(state, TokenAuth::new(TOKEN));

    let response = app
        .oneshot(get("/autoinsider/similar/problems/index?question=brakes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response.into_body()).await;
    assert!(!body["message"].as_str().unwrap().contains("connection refused"));
}
