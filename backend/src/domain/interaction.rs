//! Per-user restaurant interactions: upvotes, favourites, ratings, comments.
//!
//! Each (user, restaurant) pair owns at most one interaction row. Writes are
//! upserts expressed as an [`InteractionUpdate`]; upvote toggles go through
//! [`UpvoteTransition`] so the counter adjustment is derived from the same
//! decision that sets the flag.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::changes::{ChangeSet, TaggedChange};
use crate::domain::restaurant::RestaurantId;
use crate::domain::user::UserId;

/// Validation errors for interaction payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionValidationError {
    /// Rating outside `1..=5`.
    Rating(i64),
    /// The update would not change any column.
    EmptyUpdate,
}

impl fmt::Display for InteractionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rating(value) => write!(f, "rating {value} must be between 1 and 5"),
            Self::EmptyUpdate => write!(f, "at least one interaction field must be provided"),
        }
    }
}

impl std::error::Error for InteractionValidationError {}

/// A user's 1 to 5 star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionRating(i16);

impl InteractionRating {
    /// Validate a rating.
    pub fn new(value: i64) -> Result<Self, InteractionValidationError> {
        i16::try_from(value)
            .ok()
            .filter(|v| (1..=5).contains(v))
            .map(Self)
            .ok_or(InteractionValidationError::Rating(value))
    }

    /// Raw rating.
    pub const fn get(self) -> i16 {
        self.0
    }
}

/// Stored interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Interaction {
    /// Synthetic identifier.
    pub id: i64,
    /// Owning user.
    #[schema(value_type = String)]
    pub user_id: UserId,
    /// Target restaurant.
    #[schema(value_type = i32)]
    pub restaurant_id: RestaurantId,
    /// Whether the user upvoted.
    pub upvoted: bool,
    /// Whether the user favourited.
    pub favorited: bool,
    /// Rating from 1 to 5.
    pub rating: Option<i16>,
    /// Free-text comment.
    pub comment: Option<String>,
    /// When the user visited.
    pub visited_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// One writable interaction column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionChange {
    /// `upvoted`
    Upvoted(bool),
    /// `favorited`
    Favorited(bool),
    /// `rating`, `None` clears it.
    Rating(Option<InteractionRating>),
    /// `comment`, `None` clears it.
    Comment(Option<String>),
    /// `visited_at`, `None` clears it.
    VisitedAt(Option<DateTime<Utc>>),
}

impl TaggedChange for InteractionChange {
    fn column(&self) -> &'static str {
        match self {
            Self::Upvoted(_) => "upvoted",
            Self::Favorited(_) => "favorited",
            Self::Rating(_) => "rating",
            Self::Comment(_) => "comment",
            Self::VisitedAt(_) => "visited_at",
        }
    }
}

/// Partial interaction update.
pub type InteractionUpdate = ChangeSet<InteractionChange>;

/// Reject updates that would not touch any column.
pub fn require_changes(
    update: InteractionUpdate,
) -> Result<InteractionUpdate, InteractionValidationError> {
    if update.is_empty() {
        Err(InteractionValidationError::EmptyUpdate)
    } else {
        Ok(update)
    }
}

/// Upvote flag that `update` writes, if any.
pub fn requested_upvote(update: &InteractionUpdate) -> Option<bool> {
    update.iter().find_map(|change| match change {
        InteractionChange::Upvoted(upvoted) => Some(*upvoted),
        _ => None,
    })
}

/// New upvote state and the matching counter delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpvoteTransition {
    /// Flag value to store.
    pub upvoted: bool,
    /// Change to apply to `total_upvotes`: -1, 0, or +1.
    pub delta: i32,
}

impl UpvoteTransition {
    /// Decide the next upvote state.
    ///
    /// `current` is the stored flag, `None` when no row exists. An explicit
    /// `requested` value wins; otherwise the stored flag flips, and a missing
    /// row becomes an upvote.
    ///
    /// # Examples
    /// ```
    /// use eatwhatnow::domain::UpvoteTransition;
    ///
    /// let first = UpvoteTransition::resolve(None, None);
    /// assert!(first.upvoted);
    /// assert_eq!(first.delta, 1);
    ///
    /// let undo = UpvoteTransition::resolve(Some(true), None);
    /// assert!(!undo.upvoted);
    /// assert_eq!(undo.delta, -1);
    /// ```
    pub fn resolve(current: Option<bool>, requested: Option<bool>) -> Self {
        let previous = current.unwrap_or(false);
        let upvoted = requested.unwrap_or(!previous);
        let delta = i32::from(upvoted) - i32::from(previous);
        Self { upvoted, delta }
    }
}

/// Result of an upvote toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpvoteOutcome {
    /// Interaction after the toggle.
    pub interaction: Interaction,
    /// Restaurant counter after the immediate adjustment.
    pub total_upvotes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(InteractionUpdate::new().with(InteractionChange::Favorited(true)), None)]
    #[case(
        InteractionUpdate::new()
            .with(InteractionChange::Upvoted(true))
            .with(InteractionChange::Upvoted(false)),
        Some(false)
    )]
    fn requested_upvote_reads_the_latest_flag(
        #[case] update: InteractionUpdate,
        #[case] expected: Option<bool>,
    ) {
        assert_eq!(requested_upvote(&update), expected);
    }

    #[rstest]
    #[case(None, None, true, 1)]
    #[case(Some(false), None, true, 1)]
    #[case(Some(true), None, false, -1)]
    #[case(None, Some(false), false, 0)]
    #[case(Some(true), Some(true), true, 0)]
    #[case(Some(false), Some(true), true, 1)]
    #[case(Some(true), Some(false), false, -1)]
    fn resolve_upvote(
        #[case] current: Option<bool>,
        #[case] requested: Option<bool>,
        #[case] upvoted: bool,
        #[case] delta: i32,
    ) {
        assert_eq!(
            UpvoteTransition::resolve(current, requested),
            UpvoteTransition { upvoted, delta }
        );
    }

    #[rstest]
    fn toggling_twice_restores_original_state() {
        let first = UpvoteTransition::resolve(Some(false), None);
        let second = UpvoteTransition::resolve(Some(first.upvoted), None);
        assert!(!second.upvoted);
        assert_eq!(first.delta + second.delta, 0);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(5, true)]
    #[case(6, false)]
    fn rating_bounds(#[case] raw: i64, #[case] valid: bool) {
        assert_eq!(InteractionRating::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn empty_updates_are_rejected() {
        assert_eq!(
            require_changes(InteractionUpdate::new()),
            Err(InteractionValidationError::EmptyUpdate)
        );
        let update = InteractionUpdate::new().with(InteractionChange::Comment(None));
        assert!(require_changes(update).is_ok());
    }
}
