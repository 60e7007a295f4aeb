use super::*;
use crate::domain::{Email, UserAccount, UserId, UserProfile};
use actix_rt::System;
use async_trait::async_trait;
use chrono::Utc;
use rstest::{fixture, rstest};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct InMemoryUserRepository {
    store: Mutex<HashMap<UserId, UserAccount>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut guard = self.store.lock().expect("store poisoned");
        if guard.values().any(|a| a.profile.email == account.profile.email) {
            return Err(UserPersistenceError::duplicate_email());
        }
        if guard
            .values()
            .any(|a| a.profile.username == account.profile.username)
        {
            return Err(UserPersistenceError::duplicate_username());
        }
        guard.insert(account.profile.id, account.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let guard = self.store.lock().expect("store poisoned");
        Ok(guard
            .values()
            .find(|a| a.profile.email == email.as_ref())
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let guard = self.store.lock().expect("store poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[fixture]
fn account() -> UserAccount {
    UserAccount {
        profile: UserProfile {
            id: UserId::random(),
            email: "ada@example.com".into(),
            username: "ada".into(),
            full_name: "Ada Lovelace".into(),
            avatar_url: None,
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
        },
        password_hash: "$argon2id$stub".into(),
    }
}

#[rstest]
fn repository_round_trip(account: UserAccount) {
    let repo = InMemoryUserRepository::default();
    System::new().block_on(async move {
        repo.create(&account).await.expect("create succeeds");
        let email = Email::new("ADA@example.com").expect("email");
        let by_email = repo
            .find_by_email(&email)
            .await
            .expect("lookup succeeds")
            .expect("account present");
        assert_eq!(by_email, account);
        let by_id = repo
            .find_by_id(&account.profile.id)
            .await
            .expect("lookup succeeds");
        assert_eq!(by_id, Some(account));
    });
}

#[rstest]
fn repository_reports_duplicates(account: UserAccount) {
    let repo = InMemoryUserRepository::default();
    System::new().block_on(async move {
        repo.create(&account).await.expect("first insert");
        let mut clash = account.clone();
        clash.profile.id = UserId::random();
        let err = repo.create(&clash).await.expect_err("duplicate email");
        assert_eq!(err, UserPersistenceError::DuplicateEmail);
    });
}

#[rstest]
#[case(
    UserPersistenceError::connection("refused").to_string(),
    "user repository connection failed: refused"
)]
#[case(
    RestaurantPersistenceError::duplicate_external_id("abc").to_string(),
    "restaurant with external id abc already exists"
)]
#[case(
    RestaurantPersistenceError::contributor_not_found("abc").to_string(),
    "contributor abc does not exist"
)]
#[case(
    InteractionPersistenceError::restaurant_not_found(7).to_string(),
    "restaurant 7 not found"
)]
#[case(PlacesSourceError::status(503_u16).to_string(), "places provider returned status 503")]
#[case(TokenError::expired().to_string(), "token has expired")]
fn port_errors_render_messages(#[case] rendered: String, #[case] expected: &str) {
    assert_eq!(rendered, expected);
}
