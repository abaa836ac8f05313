pub mod advertiser;
pub mod cluster;
pub mod config;
pub mod error;
pub mod hostname;
pub mod hostname_registry;
pub mod netif;
pub mod ports;

// Re-export commonly used types
pub use advertiser::{Advertisement, Advertiser, BroadcastSpec, MdnsAdvertiser};
pub use config::{Args, Config};
pub use error::{Error, Result};
pub use hostname::{LocalHostname, local_hostnames, same_hostname_set};
pub use hostname_registry::{HostnameRegistry, IngressDispatcher};
pub use netif::{BroadcastInterface, InterfaceSelector};
pub use ports::{PortId, PortResolver, ServiceRef};
