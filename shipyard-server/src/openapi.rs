//! OpenAPI specification for Shipyard server.

use utoipa::OpenApi;

use shipyard_core::{Ship, ShipOrder, ShipPatch, ShipType};

use crate::routes::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::list_ships,
        crate::routes::count_ships,
        crate::routes::get_ship,
        crate::routes::create_ship,
        crate::routes::update_ship,
        crate::routes::delete_ship,
        crate::routes::openapi_json
    ),
    components(schemas(Ship, ShipPatch, ShipType, ShipOrder, ErrorResponse)),
    tags(
        (name = "ships", description = "Ship registry"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the Shipyard server.
pub struct ApiDoc;
