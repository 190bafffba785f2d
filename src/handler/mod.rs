//! Request handler module
//!
//! Dispatches requests through the route table to the picture endpoints.

pub mod pictures;
pub mod router;

pub use router::handle_request;
