//! Webdesk Fabric - request orchestration for the Web Access service
//!
//! Provides the transport abstraction (with a `reqwest` implementation), the
//! form/JSON codecs the service speaks, and the [`Orchestrator`] that runs
//! one request with transparent on-demand logon.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use webdesk_core::ConnectionInfo;
//! use webdesk_fabric::{paths, HttpTransport, Orchestrator, Payload, RequestDescriptor, RequestOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = Arc::new(
//!     ConnectionInfo::builder("https://host/WebAccess")
//!         .login_on_demand("analyst", "secret")
//!         .build()?,
//! );
//! let transport = Arc::new(HttpTransport::new()?);
//!
//! let descriptor = RequestDescriptor::get(paths::QUERY_LIST)
//!     .payload(Payload::new().with("class_name", "IncidentManagement.Incident"));
//!
//! match Orchestrator::new(connection, transport, descriptor).go().await {
//!     RequestOutcome::Success(s) => println!("{} (logged on: {})", s.data, s.logged_on),
//!     RequestOutcome::Failure(f) => eprintln!("{}", f.error_text()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod request;
pub mod testing;
pub mod transport;

// Re-exports for convenience
pub use codec::Body;
pub use error::{Error, Result};
pub use orchestrator::Orchestrator;
pub use outcome::{Failure, RequestOutcome, Success};
pub use request::{paths, Payload, RequestDescriptor, Scalar, Verb};
pub use transport::{HttpTransport, Response, ResponseMeta, Transport};
