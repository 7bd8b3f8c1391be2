//! Domain model: request descriptions, endpoints, error kinds.

pub mod endpoint;
pub mod errors;
pub mod request;

pub use self::endpoint::Endpoint;
pub use self::errors::{EndpointError, ScriptError, TransportError};
pub use self::request::Request;
