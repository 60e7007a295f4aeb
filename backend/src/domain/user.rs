//! User identity, profile, and account validation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The identifier was not a UUID.
    InvalidId,
    /// The email address was blank or malformed.
    InvalidEmail,
    /// The username length fell outside the allowed bounds.
    UsernameLength { min: usize, max: usize },
    /// The username contained characters outside `[A-Za-z0-9_.]`.
    UsernameInvalidCharacters,
    /// The full name was blank.
    EmptyFullName,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::UsernameLength { min, max } => {
                write!(f, "username must be between {min} and {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, underscores, or dots"
            ),
            Self::EmptyFullName => write!(f, "full name must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use eatwhatnow::domain::Email;
    ///
    /// let email = Email::new(" Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// ```
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let normalised = raw.trim().to_lowercase();
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let malformed = local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || normalised.chars().any(char::is_whitespace);
        if malformed {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Minimum username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length.
pub const USERNAME_MAX: usize = 32;

/// Public handle chosen at registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate a username.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.';
        if !trimmed.chars().all(allowed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Profile returned to the owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub struct UserProfile {
    /// User identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Lower-cased email address.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Unique username.
    #[schema(example = "ada")]
    pub username: String,
    /// Display name.
    #[schema(example = "Ada Lovelace")]
    pub full_name: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Whether the email has been verified.
    pub is_verified: bool,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// Stored account including its credential hash.
///
/// The hash never leaves the domain; adapters serialise [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Public profile.
    pub profile: UserProfile,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    //! Validation coverage for user value types.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.com", true)]
    #[case("  Ada@Example.com", true)]
    #[case("ada", false)]
    #[case("@example.com", false)]
    #[case("ada@", false)]
    #[case("a da@example.com", false)]
    #[case("a@b@c", false)]
    #[case("", false)]
    fn email_validation(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(Email::new(raw).is_ok(), valid, "email {raw:?}");
    }

    #[rstest]
    #[case("ada", true)]
    #[case("ada.lovelace_1815", true)]
    #[case("ad", false)]
    #[case("ada lovelace", false)]
    #[case("ada!", false)]
    #[case("a_very_long_username_that_exceeds", false)]
    fn username_validation(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(Username::new(raw).is_ok(), valid, "username {raw:?}");
    }

    #[rstest]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", true)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", false)]
    #[case("not-a-uuid", false)]
    fn user_id_parsing(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(UserId::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn user_id_serialises_as_plain_string() {
        let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let value = serde_json::to_value(id).expect("serialise id");
        assert_eq!(value, serde_json::json!("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
    }
}
