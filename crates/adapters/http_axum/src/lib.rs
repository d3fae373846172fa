//! # duskhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small **JSON admin API** (`/api/groups`, `/api/alarms`,
//!   `/api/sensors`, `/api/readings`)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map [`DuskHubError`](duskhub_domain::error::DuskHubError) into status
//!   codes
//!
//! ## Dependency rule
//! Depends on `duskhub-app` (for port traits and services) and `duskhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
