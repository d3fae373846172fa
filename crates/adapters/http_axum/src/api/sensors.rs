//! JSON REST handlers for sensor values.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use duskhub_app::ports::{Almanac, CommandPublisher, NotificationSink, ReadingRepository};
use duskhub_domain::reading::{RecordedReading, SensorReading};

use crate::error::ApiError;
use crate::state::AppState;

/// Default number of recorded readings returned.
const DEFAULT_LIMIT: usize = 100;

/// Hard cap on the number of recorded readings returned.
const MAX_LIMIT: usize = 1000;

/// Query parameters for the readings endpoint.
#[derive(Deserialize)]
pub struct RecentQuery {
    /// Maximum number of readings. Defaults to 100, capped at 1000.
    pub limit: Option<usize>,
}

/// Possible responses from the snapshot endpoint.
pub enum SnapshotResponse {
    Ok(Json<SensorReading>),
}

impl IntoResponse for SnapshotResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the readings endpoint.
pub enum RecentResponse {
    /// 200 OK with readings ordered newest first.
    Ok(Json<Vec<RecordedReading>>),
}

impl IntoResponse for RecentResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/sensors`
pub async fn snapshot<A, P, N, R>(State(state): State<AppState<A, P, N, R>>) -> SnapshotResponse
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    SnapshotResponse::Ok(Json(state.sensors.snapshot()))
}

/// `GET /api/readings?limit=`
pub async fn recent<A, P, N, R>(
    State(state): State<AppState<A, P, N, R>>,
    Query(params): Query<RecentQuery>,
) -> Result<RecentResponse, ApiError>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let readings = state.readings.get_recent(limit).await?;
    Ok(RecentResponse::Ok(Json(readings)))
}
