//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use vidloft_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidloft API",
        version = "0.1.0",
        description = "Video ingestion API: upload an mp4 for an existing video record; it is remuxed for fast start, classified by orientation and published to storage."
    ),
    paths(handlers::video_upload::upload_video),
    components(schemas(models::VideoResponse, models::Orientation, error::ErrorResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video upload and ingestion")
    )
)]
pub struct ApiDoc;
