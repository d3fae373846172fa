//! JSON REST handlers for device groups.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use duskhub_app::ports::{Almanac, CommandPublisher, NotificationSink, ReadingRepository};
use duskhub_app::scheduling_engine::GroupStatus;
use duskhub_domain::schedule::TimeMode;
use duskhub_domain::time::now;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for enabling or disabling a group's timer.
#[derive(Deserialize)]
pub struct TimerRequest {
    pub enabled: bool,
}

/// Request body for changing a fixed on/off time.
#[derive(Deserialize)]
pub struct ClockTimeRequest {
    pub hour: u32,
    pub minute: u32,
}

/// Request body for changing an on/off mode.
#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: TimeMode,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<GroupStatus>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<GroupStatus>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/groups`
pub async fn list<A, P, N, R>(State(state): State<AppState<A, P, N, R>>) -> ListResponse
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    ListResponse::Ok(Json(state.groups.list().await))
}

/// `GET /api/groups/:name`
pub async fn get<A, P, N, R>(
    State(state): State<AppState<A, P, N, R>>,
    Path(name): Path<String>,
) -> Result<GetResponse, ApiError>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let status = state.groups.status(&name).await?;
    Ok(GetResponse::Ok(Json(status)))
}

/// `PUT /api/groups/:name/timer`
pub async fn set_timer<A, P, N, R>(
    State(state): State<AppState<A, P, N, R>>,
    Path(name): Path<String>,
    Json(req): Json<TimerRequest>,
) -> Result<GetResponse, ApiError>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let status = state.groups.set_timer(&name, req.enabled, now()).await?;
    Ok(GetResponse::Ok(Json(status)))
}

/// `PUT /api/groups/:name/on_time`
pub async fn set_on_time<A, P, N, R>(
    State(state): State<AppState<A, P, N, R>>,
    Path(name): Path<String>,
    Json(req): Json<ClockTimeRequest>,
) -> Result<GetResponse, ApiError>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let status = state
        .groups
        .set_on_time(&name, req.hour, req.minute, now())
        .await?;
    Ok(GetResponse::Ok(Json(status)))
}

/// `PUT /api/groups/:name/off_time`
pub async fn set_off_time<A, P, N, R>(
    State(state): State<AppState<A, P, N, R>>,
    Path(name): Path<String>,
    Json(req): Json<ClockTimeRequest>,
) -> Result<GetResponse, ApiError>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let status = state
        .groups
        .set_off_time(&name, req.hour, req.minute, now())
        .await?;
    Ok(GetResponse::Ok(Json(status)))
}

/// `PUT /api/groups/:name/on_mode`
pub async fn set_on_mode<A, P, N, R>(
    State(state): State<AppState<A, P, N, R>>,
    Path(name): Path<String>,
    Json(req): Json<ModeRequest>,
) -> Result<GetResponse, ApiError>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let status = state.groups.set_on_mode(&name, req.mode, now()).await?;
    Ok(GetResponse::Ok(Json(status)))
}

/// `PUT /api/groups/:name/off_mode`
pub async fn set_off_mode<A, P, N, R>(
    State(state): State<AppState<A, P, N, R>>,
    Path(name): Path<String>,
    Json(req): Json<ModeRequest>,
) -> Result<GetResponse, ApiError>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let status = state.groups.set_off_mode(&name, req.mode, now()).await?;
    Ok(GetResponse::Ok(Json(status)))
}
