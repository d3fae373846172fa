//! JSON REST handlers for latched alarms.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use duskhub_app::ports::{Almanac, CommandPublisher, NotificationSink, ReadingRepository};
use duskhub_domain::alarm::AlarmKey;
use duskhub_domain::error::{DuskHubError, NotFoundError};

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AlarmKey>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the acknowledge endpoint.
pub enum AcknowledgeResponse {
    NoContent,
}

impl IntoResponse for AcknowledgeResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/alarms`
pub async fn list<A, P, N, R>(State(state): State<AppState<A, P, N, R>>) -> ListResponse
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    ListResponse::Ok(Json(state.sensors.active_alarms()))
}

/// `DELETE /api/alarms/battery/:source`
///
/// Low-battery alarms only clear here: the sensors stop reporting the flag
/// long before anyone replaces the battery.
pub async fn acknowledge_battery<A, P, N, R>(
    State(state): State<AppState<A, P, N, R>>,
    Path(source): Path<String>,
) -> Result<AcknowledgeResponse, ApiError>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let key = AlarmKey::LowBattery(source.clone());
    if !state.sensors.acknowledge(&key) {
        return Err(ApiError::from(DuskHubError::NotFound(NotFoundError {
            entity: "Alarm",
            id: source,
        })));
    }
    Ok(AcknowledgeResponse::NoContent)
}
