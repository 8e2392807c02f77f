//! HTTP tests against a service trained in memory.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use data_loader::{Catalog, MovieRecord};
use model::{train, TrainingConfig};
use serde_json::{json, Value};
use server::{router, RecommendationService, ServiceConfig};
use std::sync::Arc;
use tower::ServiceExt;

const POOLS: [(&str, &str); 3] = [
    ("Action", "explosive chase gunfight heist mercenary"),
    ("Drama", "family grief marriage village letters"),
    ("Comedy", "wedding prank roommates awkward reunion"),
];

fn record(title: &str, year: i32, genre: &str, overview: &str, industry: &str) -> MovieRecord {
    MovieRecord {
        title: title.to_string(),
        year,
        genre: vec![genre.to_string()],
        overview: overview.to_string(),
        industry: industry.to_string(),
    }
}

/// 45 rows: two named titles followed by 43 synthetic ones
fn catalog() -> Catalog {
    let mut records = vec![
        record(
            "Dune: Part Two",
            2024,
            "Action",
            "A mercenary chase across the desert ends in a gunfight.",
            "Hollywood",
        ),
        record(
            "RRR",
            2022,
            "Drama",
            "Two friends fight for their village and family.",
            "Tollywood",
        ),
    ];
    for i in 0..43 {
        let (genre, words) = POOLS[i % 3];
        let pool: Vec<&str> = words.split(' ').collect();
        let overview = format!("A {} and {} story about {}.", pool[i % 5], pool[(i + 1) % 5], pool[(i + 2) % 5]);
        let industry = if i % 2 == 0 { "Hollywood" } else { "Bollywood" };
        records.push(record(&format!("Film {i}"), 1980 + i as i32, genre, &overview, industry));
    }
    Catalog::from_records(records)
}

fn ready_app() -> Router {
    let config = TrainingConfig {
        embedding_dim: 8,
        hidden_dims: vec![16],
        epochs: 3,
        batch_size: 8,
        learning_rate: 0.005,
        max_text_features: 50,
        seed: 11,
    };
    let (artifacts, _) = train(catalog(), &config).unwrap();
    let service = RecommendationService::from_artifacts(artifacts, ServiceConfig::default());
    assert!(service.is_ready());
    router(Arc::new(service))
}

fn not_ready_app() -> Router {
    router(Arc::new(RecommendationService::not_ready(
        "artifacts missing",
        ServiceConfig::default(),
    )))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(&ready_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let (status, _) = get(&not_ready_app(), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_pagination() {
    let app = ready_app();

    let (status, body) = get(&app, "/movies?page=2&limit=20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 45);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 20);
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0]["id"], 20);
    assert_eq!(rows[19]["id"], 39);

    let (_, body) = get(&app, "/movies?page=3&limit=20").await;
    assert_eq!(body["rows"].as_array().unwrap().len(), 5);

    let (status, body) = get(&app, "/movies?page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 45);
    assert!(body["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_browse_filters() {
    let app = ready_app();

    let (_, body) = get(&app, "/movies?search=DUNE").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["rows"][0]["title"], "Dune: Part Two");
    assert!(body["rows"][0]["score"].is_null());

    let (_, body) = get(&app, "/movies?industry=tolly").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["rows"][0]["title"], "RRR");

    let (_, body) = get(&app, "/movies?search=film&industry=bolly&limit=100").await;
    assert_eq!(body["total"], 21);
}

#[tokio::test]
async fn test_bad_pagination_rejected() {
    let app = ready_app();
    for uri in ["/movies?page=0", "/movies?limit=0"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].as_str().unwrap().contains("at least 1"));
    }
}

#[tokio::test]
async fn test_recommend_by_id() {
    let app = ready_app();

    let (status, body) = get(&app, "/recommend/0?k=5").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r["id"] != 0));

    let scores: Vec<f64> = rows.iter().map(|r| r["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");

    let (_, again) = get(&app, "/recommend/0?k=5").await;
    assert_eq!(again, body);

    let (_, default_k) = get(&app, "/recommend/3").await;
    assert_eq!(default_k.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_recommend_by_id_errors() {
    let app = ready_app();

    let (status, body) = get(&app, "/recommend/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Movie 999 not found");

    let (status, _) = get(&app, "/recommend/-1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/recommend/0?k=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_by_title() {
    let app = ready_app();

    let (status, body) = get(&app, "/recommend_by_title?title=Dune%20Part%202").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body.as_array().unwrap().iter().map(|t| t.as_str().unwrap()).collect();
    assert_eq!(titles.len(), 5);
    assert!(!titles.contains(&"Dune: Part Two"));

    let (status, body) = get(&app, "/recommend_by_title?title=Xyzzyx").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Xyzzyx"));
}

#[tokio::test]
async fn test_recommend_by_plot() {
    let app = ready_app();

    let (status, body) = post(
        &app,
        "/recommend_by_plot",
        json!({
            "title": "Untitled",
            "overview": "A heist goes wrong and a chase follows.",
            "genres": ["Action"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (status, body) = post(
        &app,
        "/recommend_by_plot",
        json!({ "overview": "Letters from the village.", "year": 1999, "k": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_not_ready_queries() {
    let app = not_ready_app();

    for uri in ["/movies", "/recommend/0", "/recommend_by_title?title=RRR"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["error"], "System not ready");
    }

    let (status, _) = post(&app, "/recommend_by_plot", json!({ "overview": "x" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
