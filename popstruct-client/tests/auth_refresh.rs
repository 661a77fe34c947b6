//! Exercises the authenticated request layer against a local backend stub.

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use popstruct_client::{ApiClient, ErrorKind, MemorySession, Session, SessionProvider};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone)]
struct Backend {
    refreshes: Arc<AtomicUsize>,
    job_fetches: Arc<AtomicUsize>,
    accept_refresh: bool,
    accept_fresh_token: bool,
}

impl Backend {
    fn new(accept_refresh: bool, accept_fresh_token: bool) -> Self {
        Self {
            refreshes: Arc::new(AtomicUsize::new(0)),
            job_fetches: Arc::new(AtomicUsize::new(0)),
            accept_refresh,
            accept_fresh_token,
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Could not validate credentials" })),
    )
        .into_response()
}

async fn get_job(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    backend.job_fetches.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if backend.accept_fresh_token && auth == "Bearer fresh" {
        Json(json!({
            "id": id,
            "name": "PCA - cohort",
            "analysis_type": "pca",
            "status": "running",
            "progress_percent": 40,
            "error_message": null,
            "dataset_id": 7,
            "parameters": { "n_components": 10 },
            "created_at": "2024-01-01T00:00:00Z",
            "started_at": null,
            "completed_at": null
        }))
        .into_response()
    } else {
        unauthorized()
    }
}

async fn refresh(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    backend.refreshes.fetch_add(1, Ordering::SeqCst);
    if backend.accept_refresh && body["refresh_token"] == "refresh-1" {
        Json(json!({
            "access_token": "fresh",
            "refresh_token": "refresh-2",
            "token_type": "bearer"
        }))
        .into_response()
    } else {
        unauthorized()
    }
}

async fn download() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": "Job is not completed" })),
    )
        .into_response()
}

async fn serve(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/v1/jobs/{id}", get(get_job))
        .route("/api/v1/jobs/{id}/download", get(download))
        .route("/api/v1/auth/refresh", post(refresh))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn stale_session() -> Arc<MemorySession> {
    Arc::new(MemorySession::with_session(Session {
        access_token: "stale".to_string(),
        refresh_token: "refresh-1".to_string(),
    }))
}

#[tokio::test]
async fn expired_token_is_refreshed_once_and_request_retried() {
    let backend = Backend::new(true, true);
    let url = serve(backend.clone()).await;
    let session = stale_session();
    let client = ApiClient::new(url, session.clone());

    let job = client.get_job(42).await.unwrap();

    assert_eq!(job.id, 42);
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(backend.job_fetches.load(Ordering::SeqCst), 2);
    assert_eq!(
        session.get(),
        Some(Session {
            access_token: "fresh".to_string(),
            refresh_token: "refresh-2".to_string(),
        })
    );
}

#[tokio::test]
async fn concurrent_failures_share_one_refresh() {
    let backend = Backend::new(true, true);
    let url = serve(backend.clone()).await;
    let client = ApiClient::new(url, stale_session());

    let (a, b) = tokio::join!(client.get_job(1), client.get_job(2));

    assert_eq!(a.unwrap().id, 1);
    assert_eq!(b.unwrap().id, 2);
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_refresh_clears_session() {
    let backend = Backend::new(false, true);
    let url = serve(backend.clone()).await;
    let session = stale_session();
    let client = ApiClient::new(url, session.clone());

    let err = client.get_job(42).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthExpired);
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
    assert!(session.get().is_none());
}

#[tokio::test]
async fn repeated_unauthorized_after_refresh_forces_logout() {
    let backend = Backend::new(true, false);
    let url = serve(backend.clone()).await;
    let session = stale_session();
    let client = ApiClient::new(url, session.clone());

    let err = client.get_job(42).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthExpired);
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(backend.job_fetches.load(Ordering::SeqCst), 2);
    assert!(session.get().is_none());
}

#[tokio::test]
async fn missing_session_is_reported_as_expired() {
    let backend = Backend::new(true, true);
    let url = serve(backend.clone()).await;
    let client = ApiClient::new(url, Arc::new(MemorySession::new()));

    let err = client.get_job(42).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthExpired);
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn download_before_completion_is_not_ready() {
    let backend = Backend::new(true, true);
    let url = serve(backend).await;
    let client = ApiClient::new(
        url,
        Arc::new(MemorySession::with_session(Session {
            access_token: "fresh".to_string(),
            refresh_token: "refresh-1".to_string(),
        })),
    );

    let err = client.download_results(42).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ResourceNotReady);
    assert!(err.user_message().contains("not available yet"));
}
