//! Account handlers: registration, login, and the caller's profile.
//!
//! ```text
//! POST /api/v1/auth/register {"email":"ada@example.com","username":"ada","password":"...","full_name":"Ada"}
//! POST /api/v1/auth/login {"email":"ada@example.com","password":"..."}
//! GET /api/v1/users/profile   (Authorization: Bearer <jwt>)
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::{
    AuthSession, Error, LoginCredentials, LoginValidationError, Registration,
    RegistrationValidationError, UserProfile, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::{AuthResponse, Envelope};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ErrorCode, FieldName, field_error};

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Registration body for `POST /api/v1/auth/register`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "ada")]
    pub username: String,
    pub password: String,
    #[serde(alias = "fullName")]
    #[schema(example = "Ada Lovelace")]
    pub full_name: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let password = Zeroizing::new(value.password);
        Self::try_from_parts(&value.email, &password)
    }
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let password = Zeroizing::new(value.password);
        Self::try_from_parts(&value.email, &value.username, &password, &value.full_name)
    }
}

fn session_response(session: AuthSession) -> AuthResponse {
    AuthResponse {
        token: session.token.as_str().to_owned(),
        data: session.profile,
    }
}

/// Exchange email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Account disabled", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let session = state.auth.login(&credentials).await?;
    Ok(web::Json(session_response(session)))
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email or username already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_registration_error)?;
    let session = state.auth.register(&registration).await?;
    Ok(HttpResponse::Created().json(session_response(session)))
}

/// Current user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/profile",
    responses(
        (status = 200, description = "Profile", body = Envelope<UserProfile>),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentProfile",
    security(("bearer" = []))
)]
#[get("/users/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Envelope<UserProfile>>> {
    let profile = state.profile.fetch_profile(user.user_id()).await?;
    Ok(web::Json(Envelope::new(profile)))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => FieldName::new("email"),
        LoginValidationError::EmptyPassword => FieldName::new("password"),
    };
    field_error(field, ErrorCode::Empty, err.to_string())
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let (field, code) = match &err {
        RegistrationValidationError::PasswordTooShort { .. } => {
            (FieldName::new("password"), ErrorCode::TooShort)
        }
        RegistrationValidationError::User(user) => match user {
            UserValidationError::InvalidEmail => (FieldName::new("email"), ErrorCode::InvalidFormat),
            UserValidationError::UsernameLength { .. } => {
                (FieldName::new("username"), ErrorCode::OutOfRange)
            }
            UserValidationError::UsernameInvalidCharacters => {
                (FieldName::new("username"), ErrorCode::InvalidFormat)
            }
            UserValidationError::EmptyFullName => (FieldName::new("full_name"), ErrorCode::Empty),
            UserValidationError::InvalidId => (FieldName::new("id"), ErrorCode::InvalidFormat),
        },
    };
    field_error(field, code, err.to_string())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
