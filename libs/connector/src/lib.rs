//! Webdesk Connector - typed operations against a Web Access service
//!
//! Every operation builds a request descriptor and runs it through its own
//! [`Orchestrator`](webdesk_fabric::Orchestrator), so a missing session is
//! repaired transparently when the connection allows on-demand logon.
//!
//! # Example
//!
//! ```no_run
//! use webdesk_connector::{parse_query_url, Connector};
//! use webdesk_core::ConnectionInfo;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = ConnectionInfo::builder("https://host/WebAccess")
//!     .login_on_demand("analyst", "secret")
//!     .auto_log_off_on_demand(true)
//!     .build()?;
//! let connector = Connector::http(connection)?;
//!
//! let parsed = parse_query_url(
//!     "https://host/WebAccess/query/list.rails?class_name=IncidentManagement.Incident&query=Open",
//! )
//! .ok_or("not a query URL")?;
//! let incidents = connector.query().run_parsed(&parsed.query_data).await.into_result()?;
//! println!("{}", incidents.data["object_count"]);
//!
//! let attributes = connector
//!     .metadata()
//!     .get_attributes_for_object("8a1b-incident-class-guid")
//!     .await
//!     .into_result()?;
//! for attribute in attributes.data {
//!     println!("{} ({})", attribute.title, attribute.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod connector;
pub mod metadata;
pub mod query;
pub mod query_url;
pub mod record;
pub mod user;

// Re-exports for convenience
pub use action::{ActionApi, ActionKind};
pub use connector::Connector;
pub use metadata::{
    AttributeDescriptor, MetadataApi, ModuleDescriptor, ObjectDescriptor, ObjectLookup,
};
pub use query::{Conditions, ConsoleQuery, NamedQuery, QueryApi};
pub use query_url::{parse_query_url, ParsedQueryUrl, QueryData};
pub use record::{ProcessRecord, RecordApi};
pub use user::UserApi;
