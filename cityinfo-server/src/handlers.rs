//! Resource handlers orchestrating the mutation pipeline per HTTP verb.
//!
//! Each handler is a single pass through the same gates, in contract order:
//! bind the body, run the validation policy, check the parent city, resolve
//! the POI, mutate through the repository, save, and only then notify. No
//! retries, and no outcome other than the terminal ones mapped by
//! [`ApiError`].

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use cityinfo_core::{CityId, PatchOp, PoiId, PoiPatch, UnitOfWork, validate_poi};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::dto::{
    PointOfInterestInput, city_to_dto, city_to_summary_dto, draft_from_input, poi_to_dto,
};
use crate::error::ApiError;

/// Query flags accepted by the single-city route.
#[derive(Debug, Default, Deserialize)]
pub struct CityQuery {
    /// When set, the response embeds the city's POI collection.
    #[serde(default, rename = "includePointsOfInterest")]
    pub include_points_of_interest: bool,
}

/// `GET /api/cities`
pub async fn get_cities(State(state): State<AppState>) -> Result<Response, ApiError> {
    let cities = state.repository.cities()?;
    let summaries: Vec<_> = cities.iter().map(city_to_summary_dto).collect();
    Ok(Json(summaries).into_response())
}

/// `GET /api/cities/:cityId`
pub async fn get_city(
    State(state): State<AppState>,
    Path(city_id): Path<u64>,
    Query(query): Query<CityQuery>,
) -> Result<Response, ApiError> {
    let city = state
        .repository
        .city(CityId(city_id), query.include_points_of_interest)?
        .ok_or(ApiError::NotFound)?;
    if query.include_points_of_interest {
        Ok(Json(city_to_dto(&city)).into_response())
    } else {
        Ok(Json(city_to_summary_dto(&city)).into_response())
    }
}

/// `GET /api/cities/:cityId/pointsofinterest`
pub async fn get_points_of_interest(
    State(state): State<AppState>,
    Path(city_id): Path<u64>,
) -> Result<Response, ApiError> {
    let city_id = CityId(city_id);
    if !state.repository.city_exists(city_id)? {
        info!(%city_id, "city not found when listing points of interest");
        return Err(ApiError::NotFound);
    }
    let pois = state.repository.points_of_interest_for_city(city_id)?;
    let dtos: Vec<_> = pois.iter().map(poi_to_dto).collect();
    Ok(Json(dtos).into_response())
}

/// `GET /api/cities/:cityId/pointsofinterest/:id`
pub async fn get_point_of_interest(
    State(state): State<AppState>,
    Path((city_id, poi_id)): Path<(u64, u64)>,
) -> Result<Response, ApiError> {
    let city_id = CityId(city_id);
    if !state.repository.city_exists(city_id)? {
        return Err(ApiError::NotFound);
    }
    let poi = state
        .repository
        .point_of_interest_for_city(city_id, PoiId(poi_id))?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(poi_to_dto(&poi)).into_response())
}

/// `POST /api/cities/:cityId/pointsofinterest`
pub async fn create_point_of_interest(
    State(state): State<AppState>,
    Path(city_id): Path<u64>,
    body: Result<Json<Option<PointOfInterestInput>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Ok(Json(Some(input))) = body else {
        return Err(ApiError::BadRequest);
    };

    let errors = validate_poi(input.name(), input.description.as_deref());
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let city_id = CityId(city_id);
    if !state.repository.city_exists(city_id)? {
        return Err(ApiError::NotFound);
    }

    let mut uow = UnitOfWork::new();
    let poi =
        state
            .repository
            .add_point_of_interest_for_city(&mut uow, city_id, draft_from_input(&input));
    state.repository.save(uow)?;

    let location = format!("/api/cities/{city_id}/pointsofinterest/{}", poi.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(poi_to_dto(&poi)),
    )
        .into_response())
}

/// `PUT /api/cities/:cityId/pointsofinterest/:id`
pub async fn update_point_of_interest(
    State(state): State<AppState>,
    Path((city_id, poi_id)): Path<(u64, u64)>,
    body: Result<Json<Option<PointOfInterestInput>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Ok(Json(Some(input))) = body else {
        return Err(ApiError::BadRequest);
    };

    let errors = validate_poi(input.name(), input.description.as_deref());
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let city_id = CityId(city_id);
    if !state.repository.city_exists(city_id)? {
        return Err(ApiError::NotFound);
    }
    let mut poi = state
        .repository
        .point_of_interest_for_city(city_id, PoiId(poi_id))?
        .ok_or(ApiError::NotFound)?;

    poi.name = input.name().to_owned();
    poi.description = input.description.clone();

    let mut uow = UnitOfWork::new();
    uow.update(poi);
    state.repository.save(uow)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `PATCH /api/cities/:cityId/pointsofinterest/:id`
pub async fn patch_point_of_interest(
    State(state): State<AppState>,
    Path((city_id, poi_id)): Path<(u64, u64)>,
    doc: Result<Json<Option<Vec<PatchOp>>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let ops = match doc {
        // A JSON `null` document maps to not-found, not bad-request. The
        // upstream contract pins this down, odd as it is.
        Ok(Json(None)) => return Err(ApiError::NotFound),
        Ok(Json(Some(ops))) => ops,
        Err(_) => return Err(ApiError::BadRequest),
    };

    let city_id = CityId(city_id);
    if !state.repository.city_exists(city_id)? {
        return Err(ApiError::NotFound);
    }
    let mut poi = state
        .repository
        .point_of_interest_for_city(city_id, PoiId(poi_id))?
        .ok_or(ApiError::NotFound)?;

    // The document is interpreted against a transient projection; the
    // stored entity stays untouched until the candidate passes validation.
    let candidate = PoiPatch::from_poi(&poi).apply(&ops)?;

    let errors = validate_poi(&candidate.name, candidate.description.as_deref());
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    poi.name = candidate.name;
    poi.description = candidate.description;

    let mut uow = UnitOfWork::new();
    uow.update(poi);
    state.repository.save(uow)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `DELETE /api/cities/:cityId/pointsofinterest/:id`
pub async fn delete_point_of_interest(
    State(state): State<AppState>,
    Path((city_id, poi_id)): Path<(u64, u64)>,
) -> Result<Response, ApiError> {
    let city_id = CityId(city_id);
    if !state.repository.city_exists(city_id)? {
        return Err(ApiError::NotFound);
    }
    let poi = state
        .repository
        .point_of_interest_for_city(city_id, PoiId(poi_id))?
        .ok_or(ApiError::NotFound)?;

    let mut uow = UnitOfWork::new();
    uow.delete(&poi);
    state.repository.save(uow)?;

    // Fire-and-forget: the delete is already committed, so the sender's
    // outcome cannot affect the response.
    state.notifier.send(
        "Point of interest deleted",
        &format!("Point of interest {} with id {} was deleted", poi.name, poi.id),
    );

    Ok(StatusCode::NO_CONTENT.into_response())
}
