use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use robodash_client::DashboardClient;
use robodash_core::api::{
    AckList, AckRequest, ClassifyResponse, ErrorBody, FetchTasksQuery, MessageBody,
    RetrieveMessage, StatusUpdate,
};
use robodash_core::{StatusReport, User};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::store::Store;

/// Status served before anything has been posted.
pub const INITIAL_STATUS: &str = "Waiting";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub upstream: DashboardClient,
    pub users: Option<Arc<Vec<User>>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, upstream: DashboardClient, users: Option<Vec<User>>) -> Self {
        Self {
            store,
            upstream,
            users: users.map(Arc::new),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/fetchTasks", get(fetch_tasks))
        .route("/api/fetchCollection", get(fetch_collection))
        .route("/api/getUsers", get(get_users))
        .route("/api/priority", post(priority))
        .route("/api/status", get(get_status).post(post_status))
        .route("/api/acks/{user}", get(get_acks).post(post_acks))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn required_user(user_id: Option<&str>) -> Result<&str, AppError> {
    user_id
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::bad_request("userId is required"))
}

async fn fetch_tasks(
    State(st): State<AppState>,
    Query(q): Query<FetchTasksQuery>,
) -> Result<Json<Vec<Value>>, AppError> {
    let user = required_user(q.user_id.as_deref())?;
    let queue = match q.message.as_deref() {
        Some("SendQueue") => RetrieveMessage::SendQueue,
        Some("ReceiveQueue") => RetrieveMessage::ReceiveQueue,
        _ => {
            return Err(AppError::bad_request(
                "Invalid message parameter. Use SendQueue or ReceiveQueue.",
            ))
        }
    };
    queue_for(&st, user, queue).await
}

async fn fetch_collection(
    State(st): State<AppState>,
    Query(q): Query<FetchTasksQuery>,
) -> Result<Json<Vec<Value>>, AppError> {
    let user = required_user(q.user_id.as_deref())?;
    queue_for(&st, user, RetrieveMessage::ReceiveQueue).await
}

async fn queue_for(st: &AppState, user: &str, queue: RetrieveMessage) -> Result<Json<Vec<Value>>, AppError> {
    match st.upstream.fetch_queue_records(user, queue).await {
        Ok(tasks) => Ok(Json(tasks)),
        Err(e) => {
            warn!(queue = queue.as_str(), "upstream retrieval failed: {e}");
            Err(AppError::internal("Failed to retrieve tasks"))
        }
    }
}

async fn get_users(State(st): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    match &st.users {
        Some(users) => Ok(Json(users.to_vec())),
        None => Err(AppError::internal("Failed to fetch users")),
    }
}

/// Classification proxy. Always answers once the description is valid; the
/// upstream client falls back to keywords on any service problem.
async fn priority(
    State(st): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let description = body
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::bad_request("Invalid or missing description"))?;

    let result = st.upstream.classify(description).await;
    Ok(Json(ClassifyResponse {
        category: Some(result.category.label().to_string()),
        priority: Some(i64::from(result.priority.get())),
    }))
}

async fn get_status(State(st): State<AppState>) -> Result<Json<StatusReport>, AppError> {
    let report = st.store.status().await?.unwrap_or_else(|| StatusReport {
        status: INITIAL_STATUS.to_string(),
        timestamp: None,
    });
    Ok(Json(report))
}

async fn post_status(
    State(st): State<AppState>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<MessageBody>, AppError> {
    let status = update
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("No message provided"))?;
    st.store.set_status(status).await?;
    info!(status, "robot status updated");
    Ok(Json(MessageBody {
        message: "Message updated successfully".to_string(),
    }))
}

async fn get_acks(
    State(st): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<AckList>, AppError> {
    let task_ids = st.store.acks(&user).await?;
    Ok(Json(AckList { user, task_ids }))
}

async fn post_acks(
    State(st): State<AppState>,
    Path(user): Path<String>,
    Json(req): Json<AckRequest>,
) -> Result<Json<AckList>, AppError> {
    let task_ids = st.store.add_acks(&user, &req.task_ids).await?;
    info!(user = %user, added = req.task_ids.len(), "notifications acknowledged");
    Ok(Json(AckList { user, task_ids }))
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(value: E) -> Self {
        let err = value.into();
        error!(error = %err, "request failed");
        Self::internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
