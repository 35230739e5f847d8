use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::ResponseMeta;

/// Fixed service endpoints, relative to the connection's base URL
pub mod paths {
    pub const QUERY_LIST: &str = "/query/list.rails";
    pub const OBJECT_OPEN: &str = "/object/open.rails";
    pub const OBJECT_SAVE: &str = "/object/save.rails";
    pub const OBJECT_DELETE: &str = "/object/delete.rails";
    pub const OBJECT_INVOKE_FUNCTION: &str = "/object/invokeFunction.rails";
    pub const LOGON: &str = "/wd/Logon/Logon.rails";
    pub const LOGOFF: &str = "/wd/Logon/Logoff.rails";
}

/// Form field names the logon endpoint expects
pub const LOGON_USER_FIELD: &str = "Ecom_User_ID";
pub const LOGON_PASSWORD_FIELD: &str = "Ecom_User_Password";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single form value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

// f64's Display already drops the fraction of integral values ("50", not "50.0")
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Scalar {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

/// Form fields of one request, kept in name order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Scalar>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Scalar>) {
        self.0.insert(name.into(), value.into());
    }

    /// Insert only when a value is present
    pub fn insert_opt<V: Into<Scalar>>(&mut self, name: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy every field of `other` over this payload
    pub fn extend(&mut self, other: Payload) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Scalar)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Hook that may rewrite a parsed JSON body before it is handed back
pub type ResponseProcessor = Arc<dyn Fn(&mut Value, &ResponseMeta) + Send + Sync>;

/// Description of one logical remote call
///
/// Owned by exactly one orchestrator, which may replay it once after an
/// on-demand login.
#[derive(Clone)]
pub struct RequestDescriptor {
    pub path: String,
    pub verb: Verb,
    pub payload: Option<Payload>,
    pub require_json_response: bool,
    pub response_processor: Option<ResponseProcessor>,
}

impl RequestDescriptor {
    pub fn new(path: impl Into<String>, verb: Verb) -> Self {
        Self {
            path: path.into(),
            verb,
            payload: None,
            require_json_response: true,
            response_processor: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path, Verb::Get)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(path, Verb::Post)
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn require_json(mut self, required: bool) -> Self {
        self.require_json_response = required;
        self
    }

    pub fn processor(
        mut self,
        processor: impl Fn(&mut Value, &ResponseMeta) + Send + Sync + 'static,
    ) -> Self {
        self.response_processor = Some(Arc::new(processor));
        self
    }

    /// Logon form carrying the given credentials
    pub fn log_on(user: &str, password: &str) -> Self {
        Self::post(paths::LOGON)
            .payload(
                Payload::new()
                    .with(LOGON_USER_FIELD, user)
                    .with(LOGON_PASSWORD_FIELD, password),
            )
            .require_json(false)
    }

    pub fn log_off() -> Self {
        Self::post(paths::LOGOFF).require_json(false)
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("path", &self.path)
            .field("verb", &self.verb)
            .field("payload_fields", &self.payload.as_ref().map_or(0, Payload::len))
            .field("require_json_response", &self.require_json_response)
            .field("has_processor", &self.response_processor.is_some())
            .finish()
    }
}
