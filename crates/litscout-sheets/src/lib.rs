//! litscout-sheets — Google Sheets destination store.
//!
//! Read path: one column of a named tab (the title snapshot for dedup).
//! Write path: a single batch values:append of finished article rows.
//! Auth: service-account credential file → RS256 JWT → OAuth access token.

pub mod auth;
pub mod client;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::SheetsClient;
