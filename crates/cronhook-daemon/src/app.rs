//! Admin API — the external caller of job creation and removal.
//!
//! Thin JSON layer over the engine; no scheduling logic lives here.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::Deserialize;

use cronhook_scheduler::{Job, JobId, SchedulerEngine, SchedulerError};

pub struct AppState {
    pub engine: Arc<SchedulerEngine>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/jobs", post(create_job).get(list_jobs))
        .route("/jobs/{id}", delete(remove_job))
        .route("/jobs/{id}/active", post(set_active))
        .with_state(state)
}

async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(job): Json<Job>,
) -> Result<Json<Job>, (StatusCode, String)> {
    state.engine.create_job(job).map(Json).map_err(error_response)
}

async fn list_jobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Job>>, (StatusCode, String)> {
    state.engine.list_jobs().map(Json).map_err(error_response)
}

async fn remove_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<JobId>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .engine
        .remove_job(id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

#[derive(Deserialize)]
struct SetActive {
    active: bool,
}

async fn set_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<JobId>,
    Json(body): Json<SetActive>,
) -> Result<StatusCode, (StatusCode, String)> {
    match state.engine.set_active(id, body.active) {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err((StatusCode::NOT_FOUND, format!("job {id} not found"))),
        Err(e) => Err(error_response(e)),
    }
}

fn error_response(e: SchedulerError) -> (StatusCode, String) {
    let status = match &e {
        SchedulerError::JobAlreadyExists { .. } => StatusCode::CONFLICT,
        SchedulerError::InvalidScheduleField { .. } | SchedulerError::InvalidSchedule(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SchedulerError::JobNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::time::Duration;

    use cronhook_dispatch::RequestDispatcher;
    use cronhook_scheduler::{DispatchingExecutor, SqliteJobStore, TickTimerService};

    async fn spawn_app() -> SocketAddr {
        let store = Arc::new(
            SqliteJobStore::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap(),
        );
        let (events_tx, _events_rx) = tokio::sync::mpsc::channel(16);
        let timers = Arc::new(TickTimerService::new(events_tx));
        let exec_conn = rusqlite::Connection::open_in_memory().unwrap();
        cronhook_scheduler::db::init_db(&exec_conn).unwrap();
        let executor = Arc::new(DispatchingExecutor::new(
            RequestDispatcher::new(Duration::from_secs(5)).unwrap(),
            exec_conn,
        ));
        let engine = Arc::new(SchedulerEngine::new(store, timers, executor));
        let router = build_router(Arc::new(AppState { engine }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        addr
    }

    fn job_body() -> serde_json::Value {
        serde_json::json!({
            "request": { "method": "GET", "url": "https://example.test/hook" },
            "schedule": { "minute": "*/5" }
        })
    }

    #[tokio::test]
    async fn create_list_remove_lifecycle() {
        let addr = spawn_app().await;
        let client = reqwest::Client::new();
        let base = format!("http://{addr}");

        let created: serde_json::Value = client
            .post(format!("{base}/jobs"))
            .json(&job_body())
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["schedule"]["minute"], "*/5");
        assert_eq!(created["schedule"]["second"], "*");

        let listed: serde_json::Value = client
            .get(format!("{base}/jobs"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let deleted = client
            .delete(format!("{base}/jobs/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(deleted.status(), 204);

        // Removal is idempotent.
        let again = client
            .delete(format!("{base}/jobs/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(again.status(), 204);
    }

    #[tokio::test]
    async fn duplicate_identity_conflicts() {
        let addr = spawn_app().await;
        let client = reqwest::Client::new();
        let base = format!("http://{addr}");

        let created: serde_json::Value = client
            .post(format!("{base}/jobs"))
            .json(&job_body())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = created["id"].as_i64().unwrap();

        let mut dup = job_body();
        dup["id"] = serde_json::json!(id);
        let response = client
            .post(format!("{base}/jobs"))
            .json(&dup)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 409);
    }

    #[tokio::test]
    async fn invalid_schedule_field_is_unprocessable() {
        let addr = spawn_app().await;
        let client = reqwest::Client::new();

        let mut body = job_body();
        body["schedule"]["minute"] = serde_json::json!("61");
        let response = client
            .post(format!("http://{addr}/jobs"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 422);
    }

    #[tokio::test]
    async fn activation_toggle_and_unknown_job() {
        let addr = spawn_app().await;
        let client = reqwest::Client::new();
        let base = format!("http://{addr}");

        let created: serde_json::Value = client
            .post(format!("{base}/jobs"))
            .json(&job_body())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = created["id"].as_i64().unwrap();

        let toggled = client
            .post(format!("{base}/jobs/{id}/active"))
            .json(&serde_json::json!({ "active": false }))
            .send()
            .await
            .unwrap();
        assert_eq!(toggled.status(), 204);

        let missing = client
            .post(format!("{base}/jobs/9999/active"))
            .json(&serde_json::json!({ "active": true }))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), 404);
    }
}
