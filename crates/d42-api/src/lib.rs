// d42-api: Async HTTP transport for the Device42 CMDB REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod path;
pub mod transport;

pub use auth::Credentials;
pub use client::Device42Client;
pub use error::Error;
pub use models::{ApiResponse, Envelope};
pub use path::{ApiVersion, DEFAULT_NO_TRAILING_SLASH};
pub use transport::{TlsMode, TransportConfig};
