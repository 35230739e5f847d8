//! In-memory transport for exercising orchestrated calls without a server
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use webdesk_core::ConnectionInfo;
//! use webdesk_fabric::{Orchestrator, RequestDescriptor, testing::ScriptedTransport};
//!
//! # tokio_test::block_on(async {
//! let transport = Arc::new(ScriptedTransport::new());
//! transport.reply_json(json!({"objects": []}));
//!
//! let connection = Arc::new(ConnectionInfo::new("https://host/wa"));
//! let outcome = Orchestrator::new(connection, transport.clone(), RequestDescriptor::get("/query/list.rails"))
//!     .go()
//!     .await;
//! assert!(outcome.is_success());
//! assert_eq!(transport.calls()[0].url, "https://host/wa/query/list.rails");
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::codec::Body;
use crate::error::{Error, Result};
use crate::request::{Payload, Verb};
use crate::transport::{Response, ResponseMeta, Transport};

/// One exchange seen by a [`ScriptedTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub url: String,
    pub verb: Verb,
    pub payload: Option<Payload>,
    pub require_json: bool,
}

impl RecordedCall {
    /// Payload field rendered as text
    pub fn field(&self, name: &str) -> Option<String> {
        self.payload
            .as_ref()
            .and_then(|p| p.get(name))
            .map(ToString::to_string)
    }
}

enum Reply {
    Body(Body),
    Error(Error),
}

/// Transport that answers from a queue of scripted replies
///
/// Replies are consumed in order, one per call. A call made after the queue
/// is exhausted fails with a custom error.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with a JSON body
    pub fn reply_json(&self, value: Value) -> &Self {
        lock(&self.replies).push_back(Reply::Body(Body::Json(value)));
        self
    }

    /// Queue a 200 response with a non-JSON body
    pub fn reply_text(&self, text: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(Reply::Body(Body::Text(text.into())));
        self
    }

    /// Queue a failed exchange
    pub fn reply_error(&self, error: Error) -> &Self {
        lock(&self.replies).push_back(Reply::Error(error));
        self
    }

    /// Queue a non-200 status with the given error text
    pub fn reply_status(&self, status: u16, text: impl Into<String>) -> &Self {
        self.reply_error(Error::HttpStatus {
            status,
            text: text.into(),
        })
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Replies not consumed yet
    pub fn pending(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn call(
        &self,
        url: &str,
        verb: Verb,
        payload: Option<&Payload>,
        require_json: bool,
    ) -> Result<Response> {
        lock(&self.calls).push(RecordedCall {
            url: url.to_string(),
            verb,
            payload: payload.cloned(),
            require_json,
        });
        let reply = lock(&self.replies)
            .pop_front()
            .ok_or_else(|| Error::custom(format!("no scripted reply for {} {}", verb, url)))?;
        match reply {
            Reply::Body(body) => Ok(Response {
                body,
                meta: ResponseMeta {
                    status: 200,
                    url: url.to_string(),
                    headers: Vec::new(),
                },
            }),
            Reply::Error(error) => Err(error),
        }
    }
}
