//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ConfigError, ServerConfig};

use state_builders::{Repositories, build_background_jobs, build_http_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::BackgroundJobs;
use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::feed::daily_feed;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::interactions::{record_interaction, toggle_upvote};
use crate::inbound::http::places::search_by_text;
use crate::inbound::http::restaurants::{create_restaurant, delete_restaurant, update_restaurant};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{login, profile, register};

/// Shared state handed to every worker's [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
}

/// Assemble the application: REST routes under `/api/v1`, probes at the
/// root, and Swagger UI in debug builds.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    // `/restaurants/user*` must precede `/restaurants/{id}`.
    let api = web::scope("/api/v1")
        .service(register)
        .service(login)
        .service(profile)
        .service(daily_feed)
        .service(toggle_upvote)
        .service(record_interaction)
        .service(search_by_text)
        .service(create_restaurant)
        .service(update_restaurant)
        .service(delete_restaurant);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// A bound server and the jobs that share its lifetime.
pub struct ServerParts {
    /// Listener future; await it to serve requests.
    pub server: Server,
    /// Jobs to start once the listener is bound.
    pub jobs: BackgroundJobs,
}

/// Construct an Actix HTTP server and its background jobs from `config`.
///
/// Readiness is flipped once the socket is bound. Jobs are returned unstarted
/// so the caller can tie their shutdown to the server future.
///
/// # Errors
/// Propagates [`std::io::Error`] when adapter setup, binding the socket, or
/// starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<ServerParts> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repos = Repositories::new(&config);
    let http_state = web::Data::new(build_http_state(&config, &repos, Arc::clone(&clock))?);
    let jobs = build_background_jobs(&config, &repos, clock);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(ServerParts { server, jobs })
}

#[cfg(test)]
mod tests {
    //! Routing tests over the assembled application.

    use super::*;
    use crate::domain::RestaurantId;
    use crate::inbound::http::test_utils::{TEST_API_KEY, TestPorts, bearer, sample_restaurant};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::json;

    fn deps(ports: TestPorts) -> AppDependencies {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        AppDependencies {
            health_state,
            http_state: web::Data::new(ports.into_state()),
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn probes_are_served_at_the_root() {
        let app = actix_test::init_service(build_app(deps(TestPorts::default()))).await;

        for uri in ["/health/ready", "/health/live"] {
            let request = actix_test::TestRequest::get().uri(uri).to_request();
            let response = actix_test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn upvote_route_is_not_shadowed_by_restaurant_id() {
        let mut ports = TestPorts::default().with_test_token();
        ports
            .interactions
            .expect_toggle_upvote()
            .times(1)
            .returning(|user_id, restaurant_id, _| {
                Err(crate::domain::Error::not_found(format!(
                    "restaurant {restaurant_id} not found for {user_id}"
                )))
            });
        let app = actix_test::init_service(build_app(deps(ports))).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/restaurants/user/upvote")
            .insert_header(bearer())
            .set_json(json!({ "restaurantId": 9 }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn restaurant_updates_reach_the_id_route() {
        let mut ports = TestPorts::default();
        ports
            .restaurants
            .expect_update()
            .withf(|id, _| *id == RestaurantId::new(4))
            .times(1)
            .returning(|_, _| Ok(sample_restaurant(4)));
        let app = actix_test::init_service(build_app(deps(ports))).await;

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/restaurants/4")
            .insert_header(("x-api-key", TEST_API_KEY))
            .set_json(json!({ "name": "Renamed" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[rstest]
    #[case::malformed_body(actix_test::TestRequest::post()
        .uri("/api/v1/restaurants/user")
        .insert_header(bearer())
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json"))]
    #[case::bad_path(actix_test::TestRequest::delete()
        .uri("/api/v1/restaurants/abc")
        .insert_header(("x-api-key", TEST_API_KEY)))]
    #[actix_web::test]
    async fn extractor_rejections_use_the_error_envelope(#[case] request: actix_test::TestRequest) {
        let ports = TestPorts::default().with_test_token();
        let app = actix_test::init_service(build_app(deps(ports))).await;

        let response = actix_test::call_service(&app, request.to_request()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
    }

    #[rstest]
    #[actix_web::test]
    async fn responses_carry_a_trace_id() {
        let app = actix_test::init_service(build_app(deps(TestPorts::default()))).await;

        let request = actix_test::TestRequest::get()
            .uri("/health/live")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert!(
            response
                .headers()
                .contains_key(crate::domain::TRACE_ID_HEADER)
        );
    }
}
