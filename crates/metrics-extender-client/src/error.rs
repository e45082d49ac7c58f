use miette::Diagnostic;
use thiserror::Error;

/// Error type for cluster API access
#[derive(Error, Debug, Diagnostic)]
pub enum ClientError {
    /// Credentials or connection settings could not be resolved
    #[error("Invalid client configuration: {message}")]
    #[diagnostic(code(extender::client::invalid_config), help("{suggestion}"))]
    InvalidConfig {
        #[allow(unused)]
        message: String,
        #[allow(unused)]
        suggestion: String,
    },

    /// The request never produced a response
    #[error("Request for {operation} failed: {message}")]
    #[diagnostic(
        code(extender::client::request_failed),
        help("Check that the API server is reachable from this pod and that TLS settings match")
    )]
    RequestFailed {
        #[allow(unused)]
        operation: String,
        #[allow(unused)]
        message: String,
    },

    /// The API server answered with a non-success status
    #[error("API server returned {status}: {message}")]
    #[diagnostic(
        code(extender::client::api_status),
        help("403 usually means the service account lacks RBAC for nodes, nodes/metrics or pods/binding")
    )]
    ApiStatus {
        #[allow(unused)]
        status: u16,
        #[allow(unused)]
        message: String,
    },

    /// The response body did not match the expected schema
    #[error("Failed to decode {what}: {message}")]
    #[diagnostic(
        code(extender::client::decode_failed),
        help("Verify the API server (and metrics-server) versions are supported")
    )]
    DecodeFailed {
        #[allow(unused)]
        what: String,
        #[allow(unused)]
        message: String,
    },
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a RequestFailed error
    pub fn request_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an ApiStatus error
    pub fn api_status(status: u16, message: impl Into<String>) -> Self {
        Self::ApiStatus {
            status,
            message: message.into(),
        }
    }

    /// Create a DecodeFailed error
    pub fn decode_failed(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeFailed {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Classify a kube-rs error raised while performing `operation`
    ///
    /// Status responses keep their code and the `message` of the Kubernetes
    /// `Status` body; everything else is a transport failure.
    pub fn from_kube(operation: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(status) => Self::api_status(status.code, status.message),
            kube::Error::SerdeError(e) => Self::decode_failed(operation, e.to_string()),
            other => Self::request_failed(operation, other.to_string()),
        }
    }

    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
