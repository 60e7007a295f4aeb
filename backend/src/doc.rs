//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint together with two security
//! schemes: `bearer` (JWT from the auth endpoints) and `api_key` (the
//! `x-api-key` header guarding restaurant administration). Swagger UI serves
//! the document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{FeedPageSchema, PageMetaSchema};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by the login and register endpoints."))
                    .build(),
            ),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                crate::inbound::http::auth::API_KEY_HEADER,
                "Shared key for restaurant administration.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Eat What Now API",
        description = "Restaurant discovery with a rotating daily feed."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::profile,
        crate::inbound::http::feed::daily_feed,
        crate::inbound::http::interactions::record_interaction,
        crate::inbound::http::interactions::toggle_upvote,
        crate::inbound::http::restaurants::create_restaurant,
        crate::inbound::http::restaurants::update_restaurant,
        crate::inbound::http::restaurants::delete_restaurant,
        crate::inbound::http::places::search_by_text,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(PageMetaSchema, FeedPageSchema)),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "The signed-in user"),
        (name = "feed", description = "Daily rotating restaurant feed"),
        (name = "interactions", description = "Upvotes, favourites, ratings, and comments"),
        (name = "restaurants", description = "Restaurant administration"),
        (name = "places", description = "Provider-backed restaurant search"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
