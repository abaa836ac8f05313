use crate::error::{Error, Result};
use mdns_sd::{IfKind, ServiceDaemon, ServiceInfo};
use std::collections::HashMap;
use std::net::IpAddr;
use tracing::debug;

/// Service type every hostname is announced under
pub const SERVICE_TYPE: &str = "_http._tcp.local.";

// Informational TXT records attached to every advertisement.
const TXT_RECORDS: [(&str, &str); 3] = [("txtv", "0"), ("lo", "1"), ("la", "2")];

/// Parameters for one hostname broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastSpec {
    /// Instance name, the bare hostname
    pub instance: String,
    /// Fully qualified host the records answer for, `<hostname>.local.`
    pub host: String,
    /// Port the advertisement points traffic at
    pub port: u16,
    /// Addresses to advertise
    pub addresses: Vec<IpAddr>,
}

impl BroadcastSpec {
    /// Build the broadcast parameters for a bare hostname
    pub fn for_hostname(hostname: &str, port: u16, addresses: Vec<IpAddr>) -> Self {
        Self {
            instance: hostname.to_string(),
            host: format!("{hostname}.local."),
            port,
            addresses,
        }
    }
}

/// One live broadcast
///
/// Shutting down consumes the handle, so a broadcast can only be withdrawn
/// once.
pub trait Advertisement: Send {
    /// Stop broadcasting
    fn shutdown(self: Box<Self>) -> Result<()>;
}

/// Starts hostname broadcasts and hands back their handles
///
/// Registering the same name twice creates two independent broadcasts; the
/// registry is responsible for withdrawing the old one first.
pub trait Advertiser: Send {
    /// Start broadcasting and return the handle that stops it
    fn register(&self, spec: &BroadcastSpec) -> Result<Box<dyn Advertisement>>;
}

/// mDNS advertiser backed by a shared `ServiceDaemon`
///
/// The daemon is bound to the single broadcast interface at construction;
/// every registration goes out on that interface only.
pub struct MdnsAdvertiser {
    daemon: ServiceDaemon,
}

impl MdnsAdvertiser {
    /// Create a daemon bound to the given interface
    pub fn new(interface: &str) -> Result<Self> {
        let daemon = ServiceDaemon::new().map_err(|e| Error::advertise(e.to_string()))?;
        daemon
            .disable_interface(IfKind::All)
            .map_err(|e| Error::advertise(e.to_string()))?;
        daemon
            .enable_interface(interface)
            .map_err(|e| Error::advertise(e.to_string()))?;
        Ok(Self { daemon })
    }

    /// Handle for shutting the daemon down once every advertisement has been
    /// withdrawn
    pub fn daemon_handle(&self) -> ServiceDaemon {
        self.daemon.clone()
    }
}

impl Advertiser for MdnsAdvertiser {
    fn register(&self, spec: &BroadcastSpec) -> Result<Box<dyn Advertisement>> {
        let txt: HashMap<String, String> = TXT_RECORDS
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        let info = ServiceInfo::new(
            SERVICE_TYPE,
            &spec.instance,
            &spec.host,
            spec.addresses.as_slice(),
            spec.port,
            txt,
        )
        .map_err(|e| Error::advertise(e.to_string()))?;
        let fullname = info.get_fullname().to_string();
        self.daemon
            .register(info)
            .map_err(|e| Error::advertise(e.to_string()))?;
        debug!("Registered {} as {}", spec.host, fullname);
        Ok(Box::new(MdnsAdvertisement {
            daemon: self.daemon.clone(),
            fullname,
        }))
    }
}

struct MdnsAdvertisement {
    daemon: ServiceDaemon,
    fullname: String,
}

impl Advertisement for MdnsAdvertisement {
    fn shutdown(self: Box<Self>) -> Result<()> {
        // The status receiver is dropped; sending the goodbye packets is the
        // daemon's job.
        self.daemon
            .unregister(&self.fullname)
            .map_err(|e| Error::advertise(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn broadcast_spec_qualifies_the_host() {
        let spec = BroadcastSpec::for_hostname(
            "dashboard",
            30080,
            vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))],
        );
        assert_eq!(spec.instance, "dashboard");
        assert_eq!(spec.host, "dashboard.local.");
        assert_eq!(spec.port, 30080);
    }

    #[test]
    fn service_type_is_local_http() {
        assert_eq!(SERVICE_TYPE, "_http._tcp.local.");
    }
}
