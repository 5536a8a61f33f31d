//! `RemoteProvider`: a `Provider` for cloud-hosted simulators and
//! real QPUs, generic over an injectable [`RemoteTransport`] so a real HTTP
//! backend and an in-memory test double share one implementation.
//!
//! # Example
//!
//! ```ignore
//! use qcore_adapter_remote::{HttpTransport, RemoteProvider};
//! use qcore_hal::{Credentials, Provider};
//!
//! let transport = HttpTransport::new("https://quantum.example.com/api", &Credentials::from_token("tok"))?;
//! let mut provider = RemoteProvider::new("example-cloud", transport);
//! provider.initialize(Credentials::from_token("tok"))?;
//! ```

mod http;
mod provider;
mod transport;

pub use http::HttpTransport;
pub use provider::RemoteProvider;
pub use transport::{RemoteDevice, RemoteDeviceKind, RemoteStatus, RemoteTransport};
