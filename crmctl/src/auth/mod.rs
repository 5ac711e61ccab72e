//! Authentication.
//!
//! Accounts log in with a username and password via `/authentication/login`.
//! A successful login or signup issues a signed session token (JWT), set as an
//! HTTP-only cookie. Non-browser clients may send the same token as
//! `Authorization: Bearer <token>`.
//!
//! Authentication only establishes who is calling. What the caller may see
//! and change is decided by [`crate::access`].
//!
//! # Modules
//!
//! - [`current_user`]: axum extractors for the session and the resolved actor
//! - [`password`]: Argon2 hashing and initial password generation
//! - [`session`]: token issuing, verification and cookies

pub mod current_user;
pub mod password;
pub mod session;
