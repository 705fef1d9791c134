// Gist API module.
// Transport adapter, client, typed endpoints, record types, and the metadata decoder.

pub mod client;
pub mod decode;
pub mod endpoints;
pub mod transport;
pub mod types;

pub use client::GistClient;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use types::*;
