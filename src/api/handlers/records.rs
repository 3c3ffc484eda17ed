//! Record CRUD handlers: list, lookups, create, update, delete.
//!
//! Route paths come from the served [`Entity`]; each lookup route carries
//! its own [`ReadPolicy`].

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{CreatedResponse, DeletedResponse};
use crate::app_state::AppState;
use crate::domain::{Column, DeleteReply, Entity, Lookup, ReadPolicy, Record, RecordFields};
use crate::error::{ErrorResponse, ServiceError};
use crate::persistence::Param;

/// `GET /{entities}` — every row, always `200` with an array.
///
/// # Errors
///
/// Returns [`ServiceError`] if the pool or the statement fails.
#[utoipa::path(
    get,
    path = "/{collection}",
    tag = "Records",
    summary = "List records",
    description = "Returns every row of the service's table, as an array that may be empty.",
    params(
        ("collection" = String, Path, description = "`customers` or `sellers`, depending on the service"),
    ),
    responses(
        (status = 200, description = "All records", body = Vec<Record>),
        (status = 500, description = "Pool or statement failure", body = ErrorResponse),
    )
)]
pub async fn list_records(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let rows = state.records.list().await?;
    respond(ReadPolicy::Many, state.entity(), rows)
}

/// `GET /{entities}/<field>/{value}` — rows matching one lookup route.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] for an unparsable identifier,
/// [`ServiceError::NotFound`] when the route's policy rejects an empty
/// result, and [`ServiceError`] on pool or statement failure.
#[utoipa::path(
    get,
    path = "/{collection}/{field}/{value}",
    tag = "Records",
    summary = "Look records up by field",
    description = "Customer lookups (`id`, `email`, `phone`, `f_name`, `l_name`, \
        `name/{f_name}/{l_name}`) return the first matching record. Seller lookups \
        (`first-name`, `last-name`, `email`, `phone`) return every match as an array; \
        `/sellers/{id}` returns one record. An empty match is 404 on every lookup route.",
    params(
        ("collection" = String, Path, description = "`customers` or `sellers`, depending on the service"),
        ("field" = String, Path, description = "Lookup segment, e.g. `email`"),
        ("value" = String, Path, description = "Value compared for equality"),
    ),
    responses(
        (status = 200, description = "Matching record, or array of records for seller field lookups", body = Record),
        (status = 400, description = "Unparsable identifier", body = ErrorResponse),
        (status = 404, description = "No matching record", body = ErrorResponse),
        (status = 500, description = "Pool or statement failure", body = ErrorResponse),
    )
)]
pub async fn find_records(
    State(state): State<AppState>,
    params: HashMap<String, String>,
    lookup: &'static Lookup,
) -> Result<Response, ServiceError> {
    let values = bind_path(lookup.columns(), &params)?;
    let rows = state.records.find(lookup, values).await?;
    respond(lookup.policy(), state.entity(), rows)
}

/// `POST /{entities}` — insert a row.
///
/// # Errors
///
/// Returns [`ServiceError`] if the pool or the statement fails.
#[utoipa::path(
    post,
    path = "/{collection}",
    tag = "Records",
    summary = "Create a record",
    description = "Inserts a row; omitted fields are stored as null.",
    params(
        ("collection" = String, Path, description = "`customers` or `sellers`, depending on the service"),
    ),
    request_body = RecordFields,
    responses(
        (status = 201, description = "Record created", body = CreatedResponse),
        (status = 500, description = "Pool or statement failure", body = ErrorResponse),
    )
)]
pub async fn create_record(
    State(state): State<AppState>,
    Json(fields): Json<RecordFields>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = state.records.create(&fields).await?;
    let response = CreatedResponse {
        message: format!("{} created successfully", state.entity().label()),
        id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `PUT /{entities}/{id}` — overwrite a row, answering with its new state.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] for an unparsable identifier,
/// [`ServiceError::NotFound`] if the row does not exist, and
/// [`ServiceError`] on pool or statement failure.
#[utoipa::path(
    put,
    path = "/{collection}/{id}",
    tag = "Records",
    summary = "Update a record",
    description = "Overwrites every field of the row; omitted fields become null.",
    params(
        ("collection" = String, Path, description = "`customers` or `sellers`, depending on the service"),
        ("id" = i64, Path, description = "Record identifier"),
    ),
    request_body = RecordFields,
    responses(
        (status = 200, description = "Updated record", body = Record),
        (status = 400, description = "Unparsable identifier", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 500, description = "Pool or statement failure", body = ErrorResponse),
    )
)]
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<RecordFields>,
) -> Result<Json<Record>, ServiceError> {
    let id = parse_id(&id)?;
    let record = state.records.update(id, fields).await?;
    Ok(Json(record))
}

/// `DELETE /{entities}/{id}` — remove a row.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] for an unparsable identifier,
/// [`ServiceError::NotFound`] if the row does not exist, and
/// [`ServiceError`] on pool or statement failure.
#[utoipa::path(
    delete,
    path = "/{collection}/{id}",
    tag = "Records",
    summary = "Delete a record",
    description = "Customers answer 204 with no body; sellers answer 200 with `{\"success\": true}`.",
    params(
        ("collection" = String, Path, description = "`customers` or `sellers`, depending on the service"),
        ("id" = i64, Path, description = "Record identifier"),
    ),
    responses(
        (status = 200, description = "Seller deleted", body = DeletedResponse),
        (status = 204, description = "Customer deleted"),
        (status = 400, description = "Unparsable identifier", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 500, description = "Pool or statement failure", body = ErrorResponse),
    )
)]
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    let id = parse_id(&id)?;
    state.records.delete(id).await?;
    let response = match state.entity().delete_reply() {
        DeleteReply::NoContent => StatusCode::NO_CONTENT.into_response(),
        DeleteReply::SuccessFlag => Json(DeletedResponse { success: true }).into_response(),
    };
    Ok(response)
}

/// Record routes for `entity`.
pub fn routes(entity: Entity) -> Router<AppState> {
    let collection = format!("/{}", entity.collection());
    let item = format!("{collection}/{{id}}");

    let mut router = Router::new()
        .route(&collection, get(list_records).post(create_record))
        .route(&item, put(update_record).delete(delete_record));

    for lookup in entity.lookups() {
        router = router.route(
            &lookup.route(entity),
            get(
                move |state: State<AppState>, Path(params): Path<HashMap<String, String>>| {
                    find_records(state, params, lookup)
                },
            ),
        );
    }
    router
}

/// Maps a row set to the response dictated by `policy`.
fn respond(policy: ReadPolicy, entity: Entity, rows: Vec<Record>) -> Result<Response, ServiceError> {
    match policy {
        ReadPolicy::Many => Ok(Json(rows).into_response()),
        ReadPolicy::ManyOrNotFound if rows.is_empty() => Err(ServiceError::NotFound(entity)),
        ReadPolicy::ManyOrNotFound => Ok(Json(rows).into_response()),
        ReadPolicy::One => rows
            .into_iter()
            .next()
            .map(|row| Json(row).into_response())
            .ok_or(ServiceError::NotFound(entity)),
    }
}

/// Binds route parameters to statement parameters, one per column.
fn bind_path(columns: &[Column], params: &HashMap<String, String>) -> Result<Vec<Param>, ServiceError> {
    columns
        .iter()
        .map(|column| {
            let raw = params.get(column.name()).ok_or_else(|| {
                ServiceError::InvalidRequest(format!("missing path parameter `{}`", column.name()))
            })?;
            match column {
                Column::Id => parse_id(raw).map(Param::Int),
                _ => Ok(Param::Text(Some(raw.clone()))),
            }
        })
        .collect()
}

fn parse_id(raw: &str) -> Result<i64, ServiceError> {
    raw.parse()
        .map_err(|_| ServiceError::InvalidRequest(format!("invalid id: {raw}")))
}
