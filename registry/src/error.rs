use std::{error::Error, fmt, io};

/// The registry module's result type.
pub type Result<T> = std::result::Result<T, RegistryErr>;

/// Object store and version bookkeeping failures.
#[derive(Debug)]
pub enum RegistryErr {
    Io(io::Error),
    /// The store answered with an unexpected HTTP status.
    Http {
        status: u16,
        body: String,
    },
    /// The request never got an answer (DNS, TLS, connection, timeout).
    Transport(String),
    InvalidEndpoint(String),
    InvalidKey(String),
    /// The version object exists but doesn't hold a non-negative integer.
    MalformedVersion {
        key: String,
        content: String,
    },
}

impl fmt::Display for RegistryErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryErr::Io(e) => write!(f, "io error: {e}"),
            RegistryErr::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            RegistryErr::Transport(e) => write!(f, "transport error: {e}"),
            RegistryErr::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            RegistryErr::InvalidKey(key) => write!(f, "invalid object key {key:?}"),
            RegistryErr::MalformedVersion { key, content } => {
                write!(f, "version object {key:?} holds {content:?}, expected an integer")
            }
        }
    }
}

// `Display` already includes the io error, upload reports print it on its own.
impl Error for RegistryErr {}

impl From<io::Error> for RegistryErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ureq::Transport> for RegistryErr {
    fn from(value: ureq::Transport) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<url::ParseError> for RegistryErr {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidEndpoint(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_displayed_without_a_source() {
        let err = RegistryErr::from(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));

        assert_eq!(err.to_string(), "io error: read-only");
        assert!(err.source().is_none());
    }
}
