//! HTTP API for the guest auth gateway

pub mod guest_handlers;
pub mod handlers;
pub mod routes;

pub use routes::create_router;
