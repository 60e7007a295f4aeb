//! Test helpers for inbound HTTP components.
//!
//! Handlers are exercised against `mockall` ports. [`TestPorts`] starts with
//! mocks that expect nothing; tests set expectations on the ports they touch
//! and convert the bundle into [`HttpState`].

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::test as actix_test;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::domain::ports::{
    MockAuthCommand, MockFeedQuery, MockInteractionCommand, MockPlacesQuery,
    MockRestaurantCommand, MockUserProfileQuery,
};
use crate::domain::{Error, Restaurant, RestaurantId, UserId, UserProfile};
use crate::inbound::http::state::{HttpPolicy, HttpState, HttpStatePorts};

/// Bearer token accepted by [`TestPorts::with_test_token`].
pub const TEST_TOKEN: &str = "test-token";
/// API key configured by [`TestPorts::into_state`].
pub const TEST_API_KEY: &str = "test-api-key";

/// Fixed identity behind [`TEST_TOKEN`].
pub fn test_user() -> UserId {
    UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture user id")
}

/// Mock ports for one handler test.
#[derive(Default)]
pub struct TestPorts {
    pub auth: MockAuthCommand,
    pub profile: MockUserProfileQuery,
    pub feed: MockFeedQuery,
    pub interactions: MockInteractionCommand,
    pub restaurants: MockRestaurantCommand,
    pub places: MockPlacesQuery,
}

impl TestPorts {
    /// Accept [`TEST_TOKEN`] as [`test_user`] and reject everything else.
    #[must_use]
    pub fn with_test_token(mut self) -> Self {
        self.auth.expect_authenticate().returning(|token| {
            if token == TEST_TOKEN {
                Ok(test_user())
            } else {
                Err(Error::unauthorized("invalid token"))
            }
        });
        self
    }

    /// Build state with [`TEST_API_KEY`] configured.
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                auth: Arc::new(self.auth),
                profile: Arc::new(self.profile),
                feed: Arc::new(self.feed),
                interactions: Arc::new(self.interactions),
                restaurants: Arc::new(self.restaurants),
                places: Arc::new(self.places),
            },
            HttpPolicy {
                api_key: Some(Zeroizing::new(TEST_API_KEY.to_owned())),
                ..HttpPolicy::default()
            },
        )
    }
}

/// `Authorization` header value for [`TEST_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TEST_TOKEN}"))
}

/// Restaurant fixture with zeroed counters.
pub fn sample_restaurant(id: i32) -> Restaurant {
    let at = Utc
        .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
        .single()
        .expect("fixture timestamp");
    Restaurant {
        id: RestaurantId::new(id),
        name: format!("Restaurant {id}"),
        address: "1 High Street".to_owned(),
        longitude: -0.12,
        latitude: 51.5,
        price_range: Some(2),
        rating: Some(4.5),
        total_upvotes: 0,
        total_favorites: 0,
        total_comments: 0,
        average_ratings: 0.0,
        website: None,
        image_url: None,
        link: None,
        contributor_id: None,
        external_id: None,
        created_at: at,
        updated_at: at,
    }
}

/// Profile fixture for [`test_user`].
pub fn sample_profile() -> UserProfile {
    UserProfile {
        id: test_user(),
        email: "ada@example.com".to_owned(),
        username: "ada".to_owned(),
        full_name: "Ada Lovelace".to_owned(),
        avatar_url: None,
        is_active: true,
        is_verified: false,
        created_at: Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("fixture timestamp"),
    }
}

/// Read a response body as JSON.
pub async fn read_json(response: ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

/// `details.<key>` from an error payload.
pub fn detail<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get("details")
        .and_then(|details| details.get(key))
        .and_then(Value::as_str)
}
