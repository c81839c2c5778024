//! XTE Net - remote service contracts
//!
//! The template store lives on the server; the editor only caches a view of
//! it. This crate defines the request/response contracts of the endpoints
//! the editor consumes, as traits, plus an HTTP gateway implementing them.

mod gateway;
mod services;

pub use gateway::{Endpoints, HttpGateway};
pub use services::{
    DeleteModule, ElementService, InsertModule, KeyService, ModuleService, RemoveOutcome,
};

/// Service call errors
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Transport-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP outcome
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// Response payload did not parse
    #[error("parse error: {0}")]
    Parse(String),

    /// Remove-element reply carried an unknown discriminator
    #[error("unexpected remove-element code {0}")]
    UnknownCode(u8),

    /// Endpoint URL could not be built
    #[error("invalid endpoint url: {0}")]
    Url(String),
}

impl From<reqwest::Error> for NetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NetError::Parse(err.to_string())
        } else {
            NetError::Network(err.to_string())
        }
    }
}
