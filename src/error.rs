use thiserror::Error;

/// Result type alias for ingress-mdns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type.
///
/// Whether an error is fatal is decided by where it surfaces: everything that
/// escapes startup terminates the process, while errors raised during event
/// dispatch are logged and the next notification is processed normally.
#[derive(Error, Debug)]
pub enum Error {
    /// No local interface matched the configured selector
    #[error("no interface matching {selector} was found, available interfaces are:\n{available}")]
    InterfaceNotFound {
        /// The configured interface name or IP address
        selector: String,
        /// Listing of every local interface with its addresses
        available: String,
    },

    /// The ingress controller service was not given as NAME.NAMESPACE
    #[error("service must be supplied as SERVICENAME.NAMESPACE, got {0}")]
    InvalidServiceRef(String),

    /// The port identifier configured for this connection kind is not declared
    /// by the ingress controller service
    #[error(
        "unable to register {hostname}: {kind} target port {port} not present in ingress controller service {service}"
    )]
    PortLookup {
        /// Hostname that could not be registered
        hostname: String,
        /// "cleartext" or "tls"
        kind: &'static str,
        /// The missing port identifier
        port: String,
        /// The service the mapping was built from
        service: String,
    },

    /// mDNS daemon or registration errors
    #[error("mDNS advertiser error: {0}")]
    Advertise(String),

    /// Kubernetes API errors
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an advertiser error
    pub fn advertise(msg: impl Into<String>) -> Self {
        Self::Advertise(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
