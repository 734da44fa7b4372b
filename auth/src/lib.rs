//! Authentication primitives library
//!
//! Provides the two security-sensitive building blocks of the auth service:
//! - Password hashing (Argon2id, salted per call)
//! - Session token issuance and validation (JWT, HS256, fixed issuer/audience)
//!
//! The service crate owns orchestration (who may call what, and when); this
//! crate only answers "is this password right" and "is this token valid".
//!
//! # Examples
//!
//! ## Password hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("not_my_password", &hash));
//! ```
//!
//! ## Session tokens
//! ```
//! use auth::{TokenIssuer, TokenSubject};
//!
//! let issuer = TokenIssuer::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     "http://auth-service:4000",
//!     "http://api-gateway:5000",
//! );
//! let subject = TokenSubject {
//!     id: "0c9cb4f6-0c1c-4ccb-b084-e4e9bff9b3f5".to_string(),
//!     uuid: "7f3e8d12-9a55-41a4-8a2d-4f9d55f3a001".to_string(),
//!     username: "ana".to_string(),
//!     role: "user".to_string(),
//! };
//! let token = issuer.issue(&subject).unwrap();
//! let claims = issuer.validate(&token).unwrap();
//! assert_eq!(claims.username, "ana");
//! ```

pub mod password;
pub mod token;

pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::TokenError;
pub use token::TokenIssuer;
pub use token::TokenSubject;
