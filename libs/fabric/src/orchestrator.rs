use std::sync::Arc;

use tracing::{debug, info, trace, warn};
use webdesk_core::ConnectionInfo;

use crate::codec::Body;
use crate::error::{Error, Result};
use crate::outcome::{Failure, RequestOutcome, Success};
use crate::request::RequestDescriptor;
use crate::transport::{Response, Transport};

/// What the orchestrated descriptor is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// An ordinary service call, eligible for on-demand logon
    Call,
    /// An explicit logon requested by the caller
    LogOn,
    /// An explicit logoff requested by the caller
    LogOff,
}

#[derive(Debug)]
enum State {
    Idle,
    InFlight,
    AuthRetryPending,
    AutoLogOffPending(Result<Response>),
    Terminal(Result<Response>),
}

/// Runs one request descriptor with transparent on-demand logon
///
/// A 403 on the first attempt triggers at most one logon followed by one
/// replay of the descriptor. When auto log-off is configured, a logoff is
/// issued after any call that logged on implicitly; its own result is
/// ignored and the call's outcome is delivered.
pub struct Orchestrator {
    connection: Arc<ConnectionInfo>,
    transport: Arc<dyn Transport>,
    descriptor: RequestDescriptor,
    kind: Kind,
    login_attempted: bool,
    auto_log_off_armed: bool,
    logged_on: bool,
    logged_off: bool,
}

impl Orchestrator {
    pub fn new(
        connection: Arc<ConnectionInfo>,
        transport: Arc<dyn Transport>,
        descriptor: RequestDescriptor,
    ) -> Self {
        Self {
            connection,
            transport,
            descriptor,
            kind: Kind::Call,
            login_attempted: false,
            auto_log_off_armed: false,
            logged_on: false,
            logged_off: false,
        }
    }

    /// Explicit logon with the given credentials
    ///
    /// `logged_on` is stamped only once the logon exchange succeeded.
    pub async fn log_on(
        connection: Arc<ConnectionInfo>,
        transport: Arc<dyn Transport>,
        user: &str,
        password: &str,
    ) -> RequestOutcome {
        let descriptor = RequestDescriptor::log_on(user, password);
        let mut orchestrator = Self::new(connection, transport, descriptor);
        orchestrator.kind = Kind::LogOn;
        orchestrator.go().await
    }

    /// Explicit logoff of the current session
    pub async fn log_off(
        connection: Arc<ConnectionInfo>,
        transport: Arc<dyn Transport>,
    ) -> RequestOutcome {
        let mut orchestrator = Self::new(connection, transport, RequestDescriptor::log_off());
        orchestrator.kind = Kind::LogOff;
        orchestrator.go().await
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Run the descriptor to completion
    pub async fn go(mut self) -> RequestOutcome {
        let mut state = State::Idle;
        loop {
            trace!("{} {}: {:?}", self.descriptor.verb, self.descriptor.path, state);
            state = match state {
                State::Idle => State::InFlight,
                State::InFlight => {
                    let result = self.exchange(&self.descriptor).await;
                    self.after_exchange(result)
                }
                State::AuthRetryPending => self.log_on_on_demand().await,
                State::AutoLogOffPending(completed) => {
                    self.log_off_on_demand().await;
                    State::Terminal(completed)
                }
                State::Terminal(completed) => return self.deliver(completed),
            };
        }
    }

    async fn exchange(&self, descriptor: &RequestDescriptor) -> Result<Response> {
        let url = self.connection.endpoint(&descriptor.path);
        self.transport
            .call(
                &url,
                descriptor.verb,
                descriptor.payload.as_ref(),
                descriptor.require_json_response,
            )
            .await
    }

    fn after_exchange(&mut self, result: Result<Response>) -> State {
        match result {
            Ok(mut response) => {
                match self.kind {
                    Kind::Call => {}
                    Kind::LogOn => self.logged_on = true,
                    Kind::LogOff => self.logged_off = true,
                }
                if let (Some(processor), Body::Json(value)) =
                    (&self.descriptor.response_processor, &mut response.body)
                {
                    processor(value, &response.meta);
                }
                self.complete(Ok(response))
            }
            Err(error) if self.kind == Kind::Call && error.is_unauthorized() => {
                if self.connection.login_on_demand && !self.login_attempted {
                    State::AuthRetryPending
                } else {
                    debug!(
                        "{} {} rejected and no logon is available",
                        self.descriptor.verb, self.descriptor.path
                    );
                    self.complete(Err(Error::NotLoggedIn))
                }
            }
            Err(error) => self.complete(Err(error)),
        }
    }

    fn complete(&self, completed: Result<Response>) -> State {
        if self.auto_log_off_armed {
            State::AutoLogOffPending(completed)
        } else {
            State::Terminal(completed)
        }
    }

    async fn log_on_on_demand(&mut self) -> State {
        self.login_attempted = true;
        info!(
            "Logging on as {} to retry {}",
            self.connection.login_user, self.descriptor.path
        );
        let descriptor =
            RequestDescriptor::log_on(&self.connection.login_user, &self.connection.login_password);
        match self.exchange(&descriptor).await {
            Ok(_) => {
                self.logged_on = true;
                self.auto_log_off_armed = self.connection.auto_log_off_on_demand;
                State::InFlight
            }
            Err(error) => {
                warn!("On-demand logon failed: {}", error);
                State::Terminal(Err(error))
            }
        }
    }

    async fn log_off_on_demand(&mut self) {
        debug!("Logging off after {}", self.descriptor.path);
        if let Err(error) = self.exchange(&RequestDescriptor::log_off()).await {
            warn!("Automatic logoff failed: {}", error);
        }
        self.logged_off = true;
    }

    fn deliver(&self, completed: Result<Response>) -> RequestOutcome {
        match completed {
            Ok(response) => RequestOutcome::Success(Success {
                status_code: response.meta.status,
                data: response.body.into_json(),
                meta: response.meta,
                logged_on: self.logged_on,
                logged_off: self.logged_off,
            }),
            Err(error) => RequestOutcome::Failure(Failure {
                status_code: error.status(),
                error,
                logged_on: self.logged_on,
                logged_off: self.logged_off,
            }),
        }
    }
}
