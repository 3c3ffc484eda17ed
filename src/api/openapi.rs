//! OpenAPI document for the request and response bodies.

use utoipa::OpenApi;

use crate::api::dto::{CreatedResponse, DeletedResponse, PoolStatusDto, StatusResponse};
use crate::domain::{Record, RecordFields};
use crate::error::{ErrorBody, ErrorResponse};

/// Schema registry served at `/api-docs/openapi.json`.
///
/// Record routes are documented under a `{collection}` parameter, since
/// each binary serves one entity's collection.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "directory-service",
        description = "Customer and seller record services over a pooled database connection."
    ),
    paths(
        crate::api::handlers::records::list_records,
        crate::api::handlers::records::find_records,
        crate::api::handlers::records::create_record,
        crate::api::handlers::records::update_record,
        crate::api::handlers::records::delete_record,
        crate::api::handlers::health::shallow_health,
        crate::api::handlers::health::full_health,
        crate::api::handlers::system::status_handler
    ),
    components(schemas(
        Record,
        RecordFields,
        CreatedResponse,
        DeletedResponse,
        StatusResponse,
        PoolStatusDto,
        ErrorResponse,
        ErrorBody
    ))
)]
pub struct ApiDoc;
