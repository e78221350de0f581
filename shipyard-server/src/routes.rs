//! HTTP handlers for Shipyard server.

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, web};
use serde::{Deserialize, Serialize};
use shipyard_core::{
    DEFAULT_PAGE_SIZE, PageRequest, Ship, ShipFilter, ShipOrder, ShipRequest, ShipService,
    ShipType, ShipyardError, timestamp_from_millis,
};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::openapi::ApiDoc;

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// Ship registry service.
    pub ships: ShipService,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

/// Optional filters shared by listing and counting.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShipFilterQuery {
    /// Substring of the ship name.
    pub name: Option<String>,
    /// Substring of the planet.
    pub planet: Option<String>,
    /// Ship type.
    pub ship_type: Option<ShipType>,
    /// Earliest production date, epoch milliseconds.
    pub after: Option<i64>,
    /// Latest production date, epoch milliseconds.
    pub before: Option<i64>,
    /// Previous-owner flag.
    pub is_used: Option<bool>,
    /// Minimum speed.
    pub min_speed: Option<f64>,
    /// Maximum speed.
    pub max_speed: Option<f64>,
    /// Minimum crew size.
    pub min_crew_size: Option<i32>,
    /// Maximum crew size.
    pub max_crew_size: Option<i32>,
    /// Minimum rating.
    pub min_rating: Option<f64>,
    /// Maximum rating.
    pub max_rating: Option<f64>,
}

impl ShipFilterQuery {
    fn into_filter(self) -> shipyard_core::Result<ShipFilter> {
        Ok(ShipFilter {
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            after: timestamp_from_millis("after", self.after)?,
            before: timestamp_from_millis("before", self.before)?,
            is_used: self.is_used,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
            min_crew_size: self.min_crew_size,
            max_crew_size: self.max_crew_size,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        })
    }
}

/// Sort and pagination parameters for listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShipPageQuery {
    /// Sort key, defaults to `ID`.
    pub order: Option<ShipOrder>,
    /// Zero-based page number, defaults to 0.
    pub page_number: Option<u32>,
    /// Page size, defaults to 3.
    pub page_size: Option<u32>,
}

impl ShipPageQuery {
    fn into_page(self) -> shipyard_core::Result<(ShipOrder, PageRequest)> {
        let page = PageRequest::new(
            self.page_number.unwrap_or(0),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )?;
        Ok((self.order.unwrap_or_default(), page))
    }
}

fn error_response(err: &ShipyardError) -> HttpResponse {
    let body = ErrorResponse {
        message: err.to_string(),
    };
    match err {
        ShipyardError::BadRequest(_) => HttpResponse::BadRequest().json(body),
        ShipyardError::NotFound(_) => HttpResponse::NotFound().json(body),
        ShipyardError::Store(_) => HttpResponse::InternalServerError().json(body),
    }
}

fn blocking_failed(err: actix_web::error::BlockingError) -> HttpResponse {
    log::error!("ship task failed: {err}");
    HttpResponse::InternalServerError().json(ErrorResponse {
        message: format!("ship task failed: {err}"),
    })
}

fn parse_id(raw: &str) -> shipyard_core::Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ShipyardError::bad_request(format!("invalid ship id {raw:?}")))
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse {
        message: format!("invalid request body: {err}"),
    });
    InternalError::from_response(err, response).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse {
        message: format!("invalid query string: {err}"),
    });
    InternalError::from_response(err, response).into()
}

/// Register ship routes and extractor error handlers.
///
/// `/rest/ships/count` is registered ahead of `/rest/ships/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(list_ships)
        .service(count_ships)
        .service(get_ship)
        .service(create_ship)
        .service(update_ship)
        .service(delete_ship)
        .service(openapi_json);
}

#[utoipa::path(
    get,
    path = "/ships",
    params(ShipFilterQuery, ShipPageQuery),
    responses(
        (status = 200, description = "One page of ships", body = [Ship]),
        (status = 400, description = "Invalid filter or paging", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships")]
/// List one page of ships matching the filters.
pub async fn list_ships(
    state: web::Data<AppState>,
    filter: web::Query<ShipFilterQuery>,
    paging: web::Query<ShipPageQuery>,
) -> impl Responder {
    let ships = state.ships.clone();
    let filter = filter.into_inner();
    let paging = paging.into_inner();
    let result = web::block(move || {
        let filter = filter.into_filter()?;
        let (order, page) = paging.into_page()?;
        ships.list(&filter, order, page)
    })
    .await;

    match result {
        Ok(Ok(ships)) => HttpResponse::Ok().json(ships),
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

#[utoipa::path(
    get,
    path = "/ships/count",
    params(ShipFilterQuery),
    responses(
        (status = 200, description = "Number of matching ships", body = u64),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/count")]
/// Count ships matching the filters.
pub async fn count_ships(
    state: web::Data<AppState>,
    filter: web::Query<ShipFilterQuery>,
) -> impl Responder {
    let ships = state.ships.clone();
    let filter = filter.into_inner();
    let result = web::block(move || ships.count(&filter.into_filter()?)).await;

    match result {
        Ok(Ok(count)) => HttpResponse::Ok().json(count),
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

#[utoipa::path(
    get,
    path = "/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Ship", body = Ship),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/{id}")]
/// Fetch a ship by id.
pub async fn get_ship(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let ships = state.ships.clone();
    let raw_id = path.into_inner();
    let result = web::block(move || ships.get(parse_id(&raw_id)?)).await;

    match result {
        Ok(Ok(ship)) => HttpResponse::Ok().json(ship),
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

#[utoipa::path(
    post,
    path = "/ships",
    request_body = ShipRequest,
    responses(
        (status = 200, description = "Created ship", body = Ship),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships")]
/// Create a ship; speed is rounded and rating computed server-side.
pub async fn create_ship(
    state: web::Data<AppState>,
    payload: web::Json<ShipRequest>,
) -> impl Responder {
    let ships = state.ships.clone();
    let request = payload.into_inner();
    let result = web::block(move || ships.create(request)).await;

    match result {
        Ok(Ok(ship)) => HttpResponse::Ok().json(ship),
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

#[utoipa::path(
    post,
    path = "/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    request_body = ShipRequest,
    responses(
        (status = 200, description = "Updated ship", body = Ship),
        (status = 400, description = "Malformed id or invalid field", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships/{id}")]
/// Apply the fields present in the body to an existing ship.
pub async fn update_ship(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ShipRequest>,
) -> impl Responder {
    let ships = state.ships.clone();
    let raw_id = path.into_inner();
    let request = payload.into_inner();
    let result = web::block(move || ships.update(parse_id(&raw_id)?, request)).await;

    match result {
        Ok(Ok(ship)) => HttpResponse::Ok().json(ship),
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

#[utoipa::path(
    delete,
    path = "/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Ship deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[delete("/rest/ships/{id}")]
/// Delete a ship by id.
pub async fn delete_ship(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let ships = state.ships.clone();
    let raw_id = path.into_inner();
    let result = web::block(move || ships.delete(parse_id(&raw_id)?)).await;

    match result {
        Ok(Ok(())) => HttpResponse::Ok().finish(),
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = Object)
    ),
    tag = "system"
)]
#[get("/rest/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
