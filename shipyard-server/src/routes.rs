//! HTTP handlers for Shipyard server.

use actix_web::error::{BlockingError, InternalError};
use actix_web::{HttpResponse, Responder, delete, get, post, web};
use log::error;
use serde::{Deserialize, Serialize};
use shipyard_core::validation::parse_id;
use shipyard_core::{Ship, ShipPatch, ShipQuery, ShipService, ShipyardError};
use utoipa::{OpenApi, ToSchema};

use crate::openapi::ApiDoc;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ship operations over the configured store.
    pub ships: ShipService,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

fn error_response(err: &ShipyardError) -> HttpResponse {
    let body = ErrorResponse {
        message: err.to_string(),
    };
    match err {
        ShipyardError::Validation(_) => HttpResponse::BadRequest().json(body),
        ShipyardError::NotFound(_) => HttpResponse::NotFound().json(body),
        ShipyardError::Storage(_) => {
            error!("{err}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T>(
    result: Result<shipyard_core::Result<T>, BlockingError>,
    ok: impl FnOnce(T) -> HttpResponse,
) -> HttpResponse {
    match result {
        Ok(Ok(value)) => ok(value),
        Ok(Err(err)) => error_response(&err),
        Err(err) => HttpResponse::InternalServerError().json(ErrorResponse {
            message: format!("ship task failed: {err}"),
        }),
    }
}

fn bad_request(err: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        message: err.to_string(),
    })
}

/// Register every ship route plus JSON-shaped extractor errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = bad_request(&err);
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request(&err);
        InternalError::from_response(err, response).into()
    }))
    // `count` must be registered before `{id}` so it is not read as an id.
    .service(count_ships)
    .service(list_ships)
    .service(create_ship)
    .service(get_ship)
    .service(update_ship)
    .service(delete_ship)
    .service(openapi_json);
}

#[utoipa::path(
    get,
    path = "/rest/ships",
    params(ShipQuery),
    responses(
        (status = 200, description = "One page of matching ships", body = [Ship]),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships")]
/// List ships matching the filters, ordered and paged.
pub async fn list_ships(
    state: web::Data<AppState>,
    query: web::Query<ShipQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let ships = state.ships.clone();
    let result = web::block(move || {
        let filter = query.filter()?;
        let page = query.page()?;
        ships.list(&filter, query.order(), page)
    })
    .await;
    respond(result, |found| HttpResponse::Ok().json(found))
}

#[utoipa::path(
    get,
    path = "/rest/ships/count",
    params(ShipQuery),
    responses(
        (status = 200, description = "Number of matching ships", body = u64),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/count")]
/// Count ships matching the filters; paging parameters are ignored.
pub async fn count_ships(
    state: web::Data<AppState>,
    query: web::Query<ShipQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let ships = state.ships.clone();
    let result = web::block(move || ships.count(&query.filter()?)).await;
    respond(result, |count| HttpResponse::Ok().json(count))
}

#[utoipa::path(
    get,
    path = "/rest/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Ship", body = Ship),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "No such ship", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/{id}")]
/// Fetch a ship by identifier.
pub async fn get_ship(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let ships = state.ships.clone();
    let result = web::block(move || ships.get(id)).await;
    respond(result, |ship| HttpResponse::Ok().json(ship))
}

#[utoipa::path(
    post,
    path = "/rest/ships",
    request_body = ShipPatch,
    responses(
        (status = 200, description = "Created ship with id and rating", body = Ship),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships")]
/// Create a ship.
pub async fn create_ship(
    state: web::Data<AppState>,
    payload: web::Json<ShipPatch>,
) -> impl Responder {
    let draft = payload.into_inner();
    let ships = state.ships.clone();
    let result = web::block(move || ships.create(draft)).await;
    respond(result, |ship| HttpResponse::Ok().json(ship))
}

#[utoipa::path(
    post,
    path = "/rest/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    request_body = ShipPatch,
    responses(
        (status = 200, description = "Updated ship", body = Ship),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "No such ship", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships/{id}")]
/// Update the supplied fields of a ship.
pub async fn update_ship(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ShipPatch>,
) -> impl Responder {
    let id = match parse_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let patch = payload.into_inner();
    let ships = state.ships.clone();
    let result = web::block(move || ships.update(id, patch)).await;
    respond(result, |ship| HttpResponse::Ok().json(ship))
}

#[utoipa::path(
    delete,
    path = "/rest/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Ship deleted"),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "No such ship", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[delete("/rest/ships/{id}")]
/// Delete a ship.
pub async fn delete_ship(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let ships = state.ships.clone();
    let result = web::block(move || ships.delete(id)).await;
    respond(result, |()| HttpResponse::Ok().finish())
}

#[utoipa::path(
    get,
    path = "/rest/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/rest/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
