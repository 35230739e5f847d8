use std::fmt;

use serde_json::Value;

use crate::error::Error;
use crate::transport::ResponseMeta;

/// Completed call
#[derive(Debug, Clone, PartialEq)]
pub struct Success<T = Value> {
    pub data: T,
    pub meta: ResponseMeta,
    pub status_code: u16,
    /// This call performed an implicit logon before succeeding
    pub logged_on: bool,
    /// This call performed an implicit logoff after completing
    pub logged_off: bool,
}

impl<T> Success<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Success<U> {
        Success {
            data: f(self.data),
            meta: self.meta,
            status_code: self.status_code,
            logged_on: self.logged_on,
            logged_off: self.logged_off,
        }
    }
}

/// Failed call
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub status_code: u16,
    pub error: Error,
    pub logged_on: bool,
    pub logged_off: bool,
}

impl Failure {
    pub fn new(error: Error) -> Self {
        Self {
            status_code: error.status(),
            error,
            logged_on: false,
            logged_off: false,
        }
    }

    /// Human readable text of the failure
    pub fn error_text(&self) -> String {
        self.error.to_string()
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.error, self.status_code)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Final result of one orchestrated call
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome<T = Value> {
    Success(Success<T>),
    Failure(Failure),
}

impl<T> RequestOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn logged_on(&self) -> bool {
        match self {
            Self::Success(s) => s.logged_on,
            Self::Failure(f) => f.logged_on,
        }
    }

    pub fn logged_off(&self) -> bool {
        match self {
            Self::Success(s) => s.logged_off,
            Self::Failure(f) => f.logged_off,
        }
    }

    pub fn into_result(self) -> Result<Success<T>, Failure> {
        match self {
            Self::Success(s) => Ok(s),
            Self::Failure(f) => Err(f),
        }
    }

    /// Transform the data of a success, leaving failures untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestOutcome<U> {
        match self {
            Self::Success(s) => RequestOutcome::Success(s.map(f)),
            Self::Failure(failure) => RequestOutcome::Failure(failure),
        }
    }

    /// Transform the data of a success with a conversion that may fail
    ///
    /// A conversion error becomes a failure that keeps the status and the
    /// logon flags of the original success.
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U, Error>) -> RequestOutcome<U> {
        match self {
            Self::Success(s) => {
                let Success {
                    data,
                    meta,
                    status_code,
                    logged_on,
                    logged_off,
                } = s;
                match f(data) {
                    Ok(data) => RequestOutcome::Success(Success {
                        data,
                        meta,
                        status_code,
                        logged_on,
                        logged_off,
                    }),
                    Err(error) => RequestOutcome::Failure(Failure {
                        status_code,
                        error,
                        logged_on,
                        logged_off,
                    }),
                }
            }
            Self::Failure(failure) => RequestOutcome::Failure(failure),
        }
    }
}

impl<T> From<Result<Success<T>, Failure>> for RequestOutcome<T> {
    fn from(result: Result<Success<T>, Failure>) -> Self {
        match result {
            Ok(s) => Self::Success(s),
            Err(f) => Self::Failure(f),
        }
    }
}
