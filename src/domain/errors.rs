//! Error taxonomy shared by the catalog, conversion and page-fetch paths
//!
//! Transport and upstream failures surface to callers. Parse failures are
//! normally absorbed where they happen and only appear here when a caller
//! asked for a single field explicitly.

use thiserror::Error;

/// How a transport-level failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The request did not complete within its fixed timeout
    Timeout,
    /// Connection could not be established (DNS, TLS, refused)
    Connect,
    /// The upstream answered with a non-success HTTP status
    Status(u16),
    /// The body could not be read or decoded
    Decode,
    /// Anything else reqwest reports
    Other,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connect"),
            Self::Status(code) => write!(f, "status {code}"),
            Self::Decode => write!(f, "decode"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    #[error("Transport failure ({kind}) for {target}: {message}")]
    Transport {
        kind: TransportKind,
        target: String,
        message: String,
    },

    #[error("Upstream reported an error: {message}")]
    Upstream { message: String },

    #[error("Failed to extract '{field}': {reason}")]
    Parse { field: String, reason: String },

    #[error("Category '{category}' not found")]
    NotFound { category: String },
}

impl ServiceError {
    pub fn transport(kind: TransportKind, target: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            target: target.to_string(),
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn parse(field: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(category: &str) -> Self {
        Self::NotFound {
            category: category.to_string(),
        }
    }

    /// Classify a reqwest failure into the transport taxonomy
    pub fn from_reqwest(error: &reqwest::Error, target: &str) -> Self {
        let kind = if error.is_timeout() {
            TransportKind::Timeout
        } else if error.is_connect() {
            TransportKind::Connect
        } else if let Some(status) = error.status() {
            TransportKind::Status(status.as_u16())
        } else if error.is_decode() || error.is_body() {
            TransportKind::Decode
        } else {
            TransportKind::Other
        };
        Self::transport(kind, target, error.to_string())
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                kind: TransportKind::Timeout,
                ..
            }
        )
    }

    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
