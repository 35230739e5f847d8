use thiserror::Error;

/// Status reported by the service when a session is missing or expired
pub const STATUS_UNAUTHORIZED: u16 = 403;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Connection Failed")]
    ConnectionFailed,

    #[error("{text}")]
    HttpStatus { status: u16, text: String },

    #[error("Not Logged In")]
    NotLoggedIn,

    #[error("Invalid Response")]
    InvalidResponse,

    #[error("{0}")]
    Remote(String),

    #[error("Integrated Logon Failed")]
    IntegratedLogonFailed,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Status code to report alongside this error, 0 when no response arrived
    pub fn status(&self) -> u16 {
        match self {
            Self::HttpStatus { status, .. } => *status,
            Self::NotLoggedIn => STATUS_UNAUTHORIZED,
            Self::InvalidResponse | Self::Remote(_) | Self::IntegratedLogonFailed => 200,
            Self::ConnectionFailed | Self::InvalidUrl(_) | Self::Custom(_) => 0,
        }
    }

    /// Whether the service rejected the call for lack of a session
    pub fn is_unauthorized(&self) -> bool {
        self.status() == STATUS_UNAUTHORIZED
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
