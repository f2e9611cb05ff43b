//! HTTP resource surface for the CityInfo service.
//!
//! Thin glue over `cityinfo-core`: route registration, shared state, and the
//! per-verb orchestration in [`handlers`]. The repository and the
//! notification sender are injected as trait objects so tests can swap in
//! doubles.

#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use cityinfo_core::CityRepository;

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod seed;

pub use error::ApiError;
pub use notify::{LogMailSender, NotificationSender};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Sole mutation and query surface over the aggregate store.
    pub repository: Arc<dyn CityRepository>,
    /// Channel notified when a point of interest is deleted.
    pub notifier: Arc<dyn NotificationSender>,
}

impl AppState {
    /// Bundle a repository and a notification sender.
    #[must_use]
    pub fn new(repository: Arc<dyn CityRepository>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self {
            repository,
            notifier,
        }
    }
}

/// Build the resource router over the given state.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/cities", get(handlers::get_cities))
        .route("/api/cities/:cityId", get(handlers::get_city))
        .route(
            "/api/cities/:cityId/pointsofinterest",
            get(handlers::get_points_of_interest).post(handlers::create_point_of_interest),
        )
        .route(
            "/api/cities/:cityId/pointsofinterest/:id",
            get(handlers::get_point_of_interest)
                .put(handlers::update_point_of_interest)
                .patch(handlers::patch_point_of_interest)
                .delete(handlers::delete_point_of_interest),
        )
        .with_state(state)
}
