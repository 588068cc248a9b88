//! The tool-use gateway service.

pub mod pipeline;
pub mod response;
pub mod routes;

pub use pipeline::{Gateway, Reply, DEFAULT_PROJECT};
pub use routes::{router, ApiError};
