//! SOAP 1.1 transport for the `GetPositionsByIp` service.
//!
//! ```text
//! Poller ── PositionService ──> SoapClient
//!                                 ├── envelope::build_request   (request XML)
//!                                 ├── reqwest POST              (text/xml + SOAPAction)
//!                                 └── response::parse_positions (envelope -> entries)
//! ```

mod client;
mod envelope;
mod response;

pub use client::{SoapClient, SoapEndpoint, DEFAULT_METHOD, DEFAULT_NAMESPACE, DEFAULT_URL};
pub use envelope::build_request;
pub use response::parse_positions;
