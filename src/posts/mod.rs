//! # Posts Module
//!
//! Generated blog posts: listing, the generation pipeline endpoint,
//! editing with owner checks, and HTML download.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::posts_routes;
