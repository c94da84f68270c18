//! HttpCatalogClient against a local axum stand-in for the catalog backend

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use scdb_client::api::types::{AdminPaperQuery, BatchReviewRequest, SearchMode};
use scdb_client::api::{AdminApi, CatalogApi, HttpCatalogClient};
use scdb_client::config::ClientConfig;
use scdb_client::services::PaperFilters;
use scdb_client::ClientError;
use scdb_common::models::ReviewStatus;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Seen {
    queries: Arc<Mutex<Vec<Option<String>>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

async fn papers_for_compound(
    State(seen): State<Seen>,
    Path(symbols): Path<String>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    seen.queries.lock().unwrap().push(query);
    Json(json!([
        {
            "id": 1,
            "element_symbols": symbols,
            "doi": "10.1038/nature14964",
            "title": "Conventional superconductivity at 203 kelvin",
            "authors": "[\"A. P. Drozdov\", \"M. I. Eremets\"]",
            "year": "2015",
            "superconductor_type": "Hydride",
            "data": [{ "pressure": "155", "tc": 203 }]
        }
    ]))
}

async fn compound_missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Compound not found" })))
}

async fn search_rejected() -> impl IntoResponse {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": [{ "loc": ["body", "elements"], "msg": "field required" }] })),
    )
}

async fn admin_list(State(seen): State<Seen>, headers: HeaderMap) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.auth.lock().unwrap().push(auth.clone());

    if auth.is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Not authenticated" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "papers": [{ "id": 4, "compound_symbols": "H-S", "tc": "203", "pressure": 155, "images_count": 2 }],
            "total": 1
        })),
    )
}

async fn batch_review_empty() -> impl IntoResponse {
    StatusCode::OK
}

async fn delete_broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream crashed")
}

async fn start_backend() -> (HttpCatalogClient, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/api/papers/compound/:symbols", get(papers_for_compound))
        .route("/api/compounds/search", post(search_rejected))
        .route("/api/compounds/:symbols", get(compound_missing))
        .route("/api/admin/papers/all", get(admin_list))
        .route("/api/admin/papers/batch-review", post(batch_review_empty))
        .route("/api/admin/papers/:id", delete(delete_broken))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig {
        api_base_url: format!("http://{}/", addr),
        request_timeout: Duration::from_secs(5),
        admin_page_size: 20,
    };
    (HttpCatalogClient::new(&config).unwrap(), seen)
}

#[tokio::test]
async fn test_papers_are_decoded_leniently() {
    let (client, seen) = start_backend().await;

    let papers = client
        .papers_for_combination("H-S", &PaperFilters::default())
        .await
        .unwrap();

    assert_eq!(papers.len(), 1);
    let paper = &papers[0];
    assert_eq!(paper.element_symbols.as_deref(), Some("H-S"));
    assert_eq!(paper.authors, vec!["A. P. Drozdov", "M. I. Eremets"]);
    assert_eq!(paper.year, Some(2015));
    assert_eq!(paper.data[0].pressure(), Some(155.0));
    assert_eq!(paper.max_tc(), Some(203.0));

    // No filters means no query string at all
    assert_eq!(seen.queries.lock().unwrap().clone(), vec![None]);
}

#[tokio::test]
async fn test_filters_become_query_parameters() {
    let (client, seen) = start_backend().await;

    let filters = PaperFilters {
        keyword: Some("  ".to_string()),
        year_min: Some(2010),
        review_status: Some(ReviewStatus::Approved),
        ..PaperFilters::default()
    };
    client.papers_for_combination("Fe-Se", &filters).await.unwrap();

    let query = seen.queries.lock().unwrap()[0].clone().unwrap();
    assert!(query.contains("year_min=2010"));
    assert!(query.contains("review_status=approved"));
    assert!(!query.contains("keyword"));
    assert!(!query.contains("year_max"));
}

#[tokio::test]
async fn test_error_detail_becomes_message() {
    let (client, _) = start_backend().await;

    let err = client.compound_info("Xx-Yy").await.unwrap_err();
    match err {
        ClientError::FetchFailed { status, message } => {
            assert_eq!(status, Some(404));
            assert_eq!(message, "Compound not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = client
        .search_combinations(&["Fe".to_string()], SearchMode::Contains)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert!(err.to_string().contains("field required"));
}

#[tokio::test]
async fn test_non_json_error_gets_generic_message() {
    let (client, _) = start_backend().await;

    let err = client.delete_paper("tok", 3).await.unwrap_err();
    match err {
        ClientError::FetchFailed { status, message } => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "request failed with status 500");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_admin_calls_send_bearer_token() {
    let (client, seen) = start_backend().await;

    let query = AdminPaperQuery {
        limit: 20,
        ..AdminPaperQuery::default()
    };
    let page = client.list_papers("secret", &query).await.unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.papers[0].element_symbols.as_deref(), Some("H-S"));
    assert_eq!(page.papers[0].tc, Some(203.0));
    assert_eq!(page.papers[0].image_count, 2);
    assert_eq!(
        seen.auth.lock().unwrap().clone(),
        vec![Some("Bearer secret".to_string())]
    );
}

#[tokio::test]
async fn test_empty_mutation_body_is_a_default_ack() {
    let (client, _) = start_backend().await;

    let ack = client
        .batch_review(
            "tok",
            &BatchReviewRequest {
                paper_ids: vec![1, 2],
                status: ReviewStatus::Approved,
            },
        )
        .await
        .unwrap();

    assert_eq!(ack.message, None);
    assert_eq!(ack.affected, None);
}

#[tokio::test]
async fn test_unreachable_backend_has_no_status() {
    let config = ClientConfig {
        api_base_url: "http://127.0.0.1:9".to_string(),
        request_timeout: Duration::from_secs(2),
        admin_page_size: 20,
    };
    let client = HttpCatalogClient::new(&config).unwrap();

    let err = client.compound_info("Fe-Se").await.unwrap_err();
    assert!(matches!(err, ClientError::FetchFailed { status: None, .. }));
}
