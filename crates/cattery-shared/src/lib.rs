//! # Cattery Shared
//!
//! Request and response bodies of the HTTP API.

pub mod dto;
pub mod response;

pub use response::ErrorBody;
