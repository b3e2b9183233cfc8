//! HTTP access subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → dispatcher.rs (URL assembly, credential/CORS policy, header merge)
//!     → request.rs (RequestOptions → TransportRequest, query serialization)
//!     → transport.rs (injected network capability)
//!     → response.rs (classification into success or HttpError)
//! ```

pub mod dispatcher;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use dispatcher::HttpService;
pub use error::{HttpError, HttpResult, TransportError};
pub use request::{
    query_string, CorsMode, CredentialsMode, RegionTarget, RequestOptions, TransportRequest,
};
pub use response::{classify, RawResponse};
pub use transport::{transport_fn, FnTransport, ReqwestTransport, Transport};
