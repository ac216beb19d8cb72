//! Core types for the Vendure storefront.

pub mod email;
pub mod envelope;
pub mod status;
pub mod token;

pub use email::{EmailAddress, EmailError};
pub use envelope::{ErrorCode, ErrorEnvelope};
pub use status::{AuthStatus, CurrentUser, Customer};
pub use token::{SessionToken, TOKEN_STORAGE_KEY};
