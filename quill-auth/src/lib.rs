//! quill-auth: bearer JWT verification and issuing.
//!
//! There is no login flow here. Tokens are minted by an operator (or a
//! test) with [`JwtStrategy::create_access_token`] and verified on every
//! request with [`JwtStrategy::authenticate`].

pub mod core;
pub mod jwt;
pub mod options;

pub use crate::core::{AuthenticationResult, JwtOverrides};
pub use jwt::JwtStrategy;
pub use options::{JwtAlgorithm, JwtOptions};
