use std::sync::Arc;

use webdesk_core::ConnectionInfo;
use webdesk_fabric::{HttpTransport, Orchestrator, RequestDescriptor, RequestOutcome, Transport};

use crate::action::ActionApi;
use crate::metadata::MetadataApi;
use crate::query::QueryApi;
use crate::record::RecordApi;
use crate::user::UserApi;

/// Entry point to one Web Access service
///
/// Cheap to clone; clones share the connection settings and the transport
/// (and with it the session cookie).
#[derive(Clone)]
pub struct Connector {
    connection: Arc<ConnectionInfo>,
    transport: Arc<dyn Transport>,
}

impl Connector {
    /// Create a connector over any transport
    pub fn new(connection: ConnectionInfo, transport: Arc<dyn Transport>) -> Self {
        Self {
            connection: Arc::new(connection),
            transport,
        }
    }

    /// Create a connector over a cookie-keeping HTTP transport
    pub fn http(connection: ConnectionInfo) -> webdesk_fabric::Result<Self> {
        connection
            .validate()
            .map_err(|e| webdesk_fabric::Error::custom(e.to_string()))?;
        Ok(Self::new(connection, Arc::new(HttpTransport::new()?)))
    }

    pub fn connection(&self) -> &ConnectionInfo {
        &self.connection
    }

    pub fn query(&self) -> QueryApi<'_> {
        QueryApi::new(self)
    }

    pub fn record(&self) -> RecordApi<'_> {
        RecordApi::new(self)
    }

    pub fn action(&self) -> ActionApi<'_> {
        ActionApi::new(self)
    }

    pub fn metadata(&self) -> MetadataApi<'_> {
        MetadataApi::new(self)
    }

    pub fn user(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    /// Run one descriptor through its own orchestrator
    pub async fn execute(&self, descriptor: RequestDescriptor) -> RequestOutcome {
        Orchestrator::new(self.connection.clone(), self.transport.clone(), descriptor)
            .go()
            .await
    }

    pub(crate) fn shared_connection(&self) -> Arc<ConnectionInfo> {
        self.connection.clone()
    }

    pub(crate) fn shared_transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }
}
