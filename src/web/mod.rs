//! Web API module for filekeep.
//!
//! A JSON/multipart HTTP surface over [`crate::file::FileService`].

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
