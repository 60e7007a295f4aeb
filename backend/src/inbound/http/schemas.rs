//! Response envelopes and OpenAPI schema shims.
//!
//! Single resources are wrapped as `{ "data": ... }`. The pagination crate
//! stays framework-agnostic, so its metadata is described here through
//! utoipa's external schema registration.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{FeedItem, UserProfile};

/// `{ "data": T }` wrapper used by every single-resource response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Profile plus a freshly issued bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub data: UserProfile,
    /// HS256 JWT valid for one year.
    pub token: String,
}

/// OpenAPI schema for [`pagination::PageMeta`].
#[derive(ToSchema)]
#[schema(as = pagination::PageMeta)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageMetaSchema {
    /// Items matching the filters before windowing.
    #[schema(example = 5)]
    total: u64,
    /// Requested page size; absent when unpaginated.
    #[schema(example = 2)]
    limit: Option<u32>,
    #[schema(example = 4)]
    offset: u64,
    /// One-based page number.
    #[schema(example = 3)]
    page: u64,
    #[schema(example = 3)]
    total_pages: u64,
}

/// OpenAPI schema for a page of feed items.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FeedPageSchema {
    data: Vec<FeedItem>,
    meta: PageMetaSchema,
}
