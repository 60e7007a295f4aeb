//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod feed;
pub mod health;
pub mod interactions;
pub mod places;
pub mod restaurants;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
