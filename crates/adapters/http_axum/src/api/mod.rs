//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod alarms;
#[allow(clippy::missing_errors_doc)]
pub mod groups;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;

use axum::Router;
use axum::routing::{delete, get, put};

use duskhub_app::ports::{Almanac, CommandPublisher, NotificationSink, ReadingRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<A, P, N, R>() -> Router<AppState<A, P, N, R>>
where
    A: Almanac + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    Router::new()
        // Groups
        .route("/groups", get(groups::list::<A, P, N, R>))
        .route("/groups/{name}", get(groups::get::<A, P, N, R>))
        .route("/groups/{name}/timer", put(groups::set_timer::<A, P, N, R>))
        .route(
            "/groups/{name}/on_time",
            put(groups::set_on_time::<A, P, N, R>),
        )
        .route(
            "/groups/{name}/off_time",
            put(groups::set_off_time::<A, P, N, R>),
        )
        .route(
            "/groups/{name}/on_mode",
            put(groups::set_on_mode::<A, P, N, R>),
        )
        .route(
            "/groups/{name}/off_mode",
            put(groups::set_off_mode::<A, P, N, R>),
        )
        // Alarms
        .route("/alarms", get(alarms::list::<A, P, N, R>))
        .route(
            "/alarms/battery/{source}",
            delete(alarms::acknowledge_battery::<A, P, N, R>),
        )
        // Sensors
        .route("/sensors", get(sensors::snapshot::<A, P, N, R>))
        .route("/readings", get(sensors::recent::<A, P, N, R>))
}
