//! # API Models
//!
//! Wire shapes of the REST API, kept apart from the stored records in
//! [`crate::db::models`].
//!
//! | File | Contents |
//! |------|----------|
//! | `requests.rs` | bodies and query strings the site and admin panel send |
//! | `responses.rs` | the `ApiResponse` envelope and its payloads |
//!
//! Request bodies take every field as `Option` so a missing field becomes
//! a `VALIDATION_ERROR` naming it, rather than a serde rejection. All names
//! are camelCase on the wire.

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
