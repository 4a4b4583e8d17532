//! # Pet Adoption Auth
//!
//! Username/password accounts and stateless bearer tokens.
//!
//! - [`password`]: Argon2id hashing on the blocking pool
//! - [`token`]: HS256 JWTs carrying `userId`, `iat` and `exp`
//! - [`service::AuthService`]: register, login and token verification
//!
//! The user store is abstracted behind [`UserRepository`]; the `PostgreSQL`
//! implementation lives in `pet-adoption-postgres`.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;
pub mod user;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use config::TokenConfig;
pub use error::{AuthError, Result};
pub use service::{AuthService, Credentials};
pub use token::{Claims, TokenSigner};
pub use user::{User, UserRepository};
