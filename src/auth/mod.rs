//! # Auth Module
//!
//! Account management and session handling:
//! - Signup with email verification
//! - Password login and HTTP-only session cookies
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;


pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
