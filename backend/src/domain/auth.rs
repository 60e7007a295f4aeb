//! Authentication primitives: login credentials, registrations, and tokens.
//!
//! Constructors validate raw strings so handlers only pass well-formed values
//! into services. Passwords are held in [`Zeroizing`] buffers.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::user::{Email, UserProfile, UserValidationError, Username};

/// Minimum accepted password length at registration.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and lower-cased, and is never empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use eatwhatnow::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "pw").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalised = email.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalised,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors raised while validating a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// One of the profile fields was invalid.
    User(UserValidationError),
    /// The password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(err) => err.fmt(f),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

impl From<UserValidationError> for RegistrationValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    username: Username,
    password: Zeroizing<String>,
    full_name: String,
}

impl Registration {
    /// Validate raw registration fields.
    pub fn try_from_parts(
        email: &str,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let email = Email::new(email)?;
        let username = Username::new(username)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(UserValidationError::EmptyFullName.into());
        }
        Ok(Self {
            email,
            username,
            password: Zeroizing::new(password.to_owned()),
            full_name: full_name.to_owned(),
        })
    }

    /// Normalised email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Chosen username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plain-text password, to be hashed before storage.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Trimmed full name.
    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }
}

/// Signed bearer token handed to clients.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap an encoded token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Encoded token string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Outcome of a successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Profile of the authenticated user.
    pub profile: UserProfile,
    /// Bearer token for subsequent requests.
    pub token: AccessToken,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for credential and registration validation.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn credentials_keep_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", " spaced ")
            .expect("valid credentials");
        assert_eq!(creds.password(), " spaced ");
    }

    #[rstest]
    #[case("ada@example.com", "ada", "short", "Ada", RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN })]
    #[case("nope", "ada", "long enough", "Ada", RegistrationValidationError::User(UserValidationError::InvalidEmail))]
    #[case("ada@example.com", "ada", "long enough", "   ", RegistrationValidationError::User(UserValidationError::EmptyFullName))]
    #[case("ada@example.com", "a!", "long enough", "Ada", RegistrationValidationError::User(UserValidationError::UsernameLength { min: 3, max: 32 }))]
    fn invalid_registrations(
        #[case] email: &str,
        #[case] username: &str,
        #[case] password: &str,
        #[case] full_name: &str,
        #[case] expected: RegistrationValidationError,
    ) {
        let err = Registration::try_from_parts(email, username, password, full_name)
            .expect_err("invalid registration");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn registration_normalises_fields() {
        let registration =
            Registration::try_from_parts("Ada@Example.com", " ada ", "analytical", " Ada L ")
                .expect("valid registration");
        assert_eq!(registration.email().as_ref(), "ada@example.com");
        assert_eq!(registration.username().as_ref(), "ada");
        assert_eq!(registration.full_name(), "Ada L");
    }

    #[rstest]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("secret.jwt.value");
        assert_eq!(format!("{token:?}"), "AccessToken(..)");
    }
}
