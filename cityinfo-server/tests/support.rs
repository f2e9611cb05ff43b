//! Shared helpers for the HTTP surface tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use cityinfo_core::test_support::seeded_store;
use cityinfo_core::{
    City, CityId, CityRepository, MemoryStore, PoiDraft, PoiId, PointOfInterest, StoreError,
    UnitOfWork,
};
use cityinfo_server::{AppState, NotificationSender, router};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Notification double that records every message it is handed.
#[derive(Debug, Default)]
pub struct RecordingSender {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingSender {
    /// Snapshot of the messages sent so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.messages.lock().expect("sender lock").clone()
    }
}

impl NotificationSender for RecordingSender {
    fn send(&self, subject: &str, body: &str) {
        self.messages
            .lock()
            .expect("sender lock")
            .push((subject.to_owned(), body.to_owned()));
    }
}

/// Router over the seeded in-memory store plus the recording sender.
///
/// The seed is deterministic: city 1 ("New York City") owns POIs 1 ("Ferry")
/// and 2 ("Central Park"), city 2 ("Antwerp") owns POI 3.
pub fn app() -> (Router, Arc<RecordingSender>) {
    let sender = Arc::new(RecordingSender::default());
    let state = AppState::new(Arc::new(seeded_store()), sender.clone());
    (router(state), sender)
}

/// Store double whose reads delegate to the seeded in-memory store but whose
/// `save` always reports a storage fault.
pub struct BrokenSaveStore {
    inner: MemoryStore,
}

impl CityRepository for BrokenSaveStore {
    fn city_exists(&self, city_id: CityId) -> Result<bool, StoreError> {
        self.inner.city_exists(city_id)
    }

    fn cities(&self) -> Result<Vec<City>, StoreError> {
        self.inner.cities()
    }

    fn city(
        &self,
        city_id: CityId,
        include_points_of_interest: bool,
    ) -> Result<Option<City>, StoreError> {
        self.inner.city(city_id, include_points_of_interest)
    }

    fn points_of_interest_for_city(
        &self,
        city_id: CityId,
    ) -> Result<Vec<PointOfInterest>, StoreError> {
        self.inner.points_of_interest_for_city(city_id)
    }

    fn point_of_interest_for_city(
        &self,
        city_id: CityId,
        poi_id: PoiId,
    ) -> Result<Option<PointOfInterest>, StoreError> {
        self.inner.point_of_interest_for_city(city_id, poi_id)
    }

    fn add_point_of_interest_for_city(
        &self,
        uow: &mut UnitOfWork,
        city_id: CityId,
        draft: PoiDraft,
    ) -> PointOfInterest {
        self.inner.add_point_of_interest_for_city(uow, city_id, draft)
    }

    fn save(&self, _uow: UnitOfWork) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }
}

/// Router whose every mutation fails at the persistence step.
pub fn broken_save_app() -> (Router, Arc<RecordingSender>) {
    let sender = Arc::new(RecordingSender::default());
    let store = BrokenSaveStore {
        inner: seeded_store(),
    };
    let state = AppState::new(Arc::new(store), sender.clone());
    (router(state), sender)
}

/// Drive one request through the router and collect the response.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder
                .body(Body::from(value.to_string()))
                .expect("build request")
        }
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, json)
}

/// Like [`send`], but hands back the body verbatim for responses that are
/// not JSON.
pub async fn send_text(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder
                .body(Body::from(value.to_string()))
                .expect("build request")
        }
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}
