//! Caller identity for the Compass API
//!
//! Resolves the calling user from the `User-Id` header and exposes it
//! through axum extractors that work with any domain state implementing
//! `FromRef<S>` for `AuthBackend`.

mod backend;
mod error;
mod extractors;
mod header;
mod types;

pub use backend::AuthBackend;
pub use error::AuthError;
pub use extractors::CallerUser;
pub use header::USER_ID_HEADER;
pub use types::AuthIdentity;
