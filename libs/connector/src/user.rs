use webdesk_fabric::{Orchestrator, RequestOutcome};

use crate::connector::Connector;

/// Explicit session management
pub struct UserApi<'a> {
    connector: &'a Connector,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(connector: &'a Connector) -> Self {
        Self { connector }
    }

    /// Log on with the credentials of the connection settings
    pub async fn log_on(&self) -> RequestOutcome {
        let connection = self.connector.connection();
        self.log_on_as(&connection.login_user, &connection.login_password)
            .await
    }

    /// Log on with explicit credentials
    pub async fn log_on_as(&self, user: &str, password: &str) -> RequestOutcome {
        Orchestrator::log_on(
            self.connector.shared_connection(),
            self.connector.shared_transport(),
            user,
            password,
        )
        .await
    }

    pub async fn log_off(&self) -> RequestOutcome {
        Orchestrator::log_off(
            self.connector.shared_connection(),
            self.connector.shared_transport(),
        )
        .await
    }
}
