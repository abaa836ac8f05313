use crate::advertiser::{Advertisement, Advertiser, BroadcastSpec};
use crate::error::Result;
use crate::hostname::LocalHostname;
use crate::netif::BroadcastInterface;
use crate::ports::PortResolver;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Owns every live advertisement, keyed by hostname record
///
/// The map's key set always equals the set of hostnames currently being
/// broadcast: entries are inserted only after a successful register and
/// removed together with shutting their handle down, and a replaced handle is
/// shut down before its successor is stored.
///
/// Not internally synchronized: callers must invoke operations one at a time,
/// which the single event-dispatch task does by construction.
pub struct HostnameRegistry {
    advertiser: Box<dyn Advertiser>,
    ports: PortResolver,
    interface: BroadcastInterface,
    live: HashMap<LocalHostname, Box<dyn Advertisement>>,
}

impl HostnameRegistry {
    /// Create an empty registry
    pub fn new(
        advertiser: Box<dyn Advertiser>,
        ports: PortResolver,
        interface: BroadcastInterface,
    ) -> Self {
        Self {
            advertiser,
            ports,
            interface,
            live: HashMap::new(),
        }
    }

    /// Start broadcasting every given hostname, in order
    ///
    /// A hostname that is already being broadcast is withdrawn first, so at
    /// most one live advertisement exists per record. The first failure aborts
    /// the remaining records and is returned; hostnames registered earlier in
    /// the batch stay registered.
    pub fn register_all(&mut self, hostnames: &[LocalHostname]) -> Result<()> {
        for host in hostnames {
            info!("Registering {}", host.hostname);
            let port = self.ports.resolve(host)?;
            if let Some(previous) = self.live.remove(host) {
                debug!("Withdrawing stale advertisement for {}", host.hostname);
                if let Err(e) = previous.shutdown() {
                    warn!("Failed to withdraw {}: {}", host.hostname, e);
                }
            }
            let spec =
                BroadcastSpec::for_hostname(&host.hostname, port, self.interface.addrs.clone());
            let advertisement = self.advertiser.register(&spec)?;
            self.live.insert(host.clone(), advertisement);
        }
        Ok(())
    }

    /// Stop broadcasting every given hostname
    ///
    /// Hostnames that are not currently broadcast are silently skipped, so the
    /// operation is idempotent and tolerates records that never registered.
    pub fn unregister_all(&mut self, hostnames: &[LocalHostname]) {
        for host in hostnames {
            if let Some(advertisement) = self.live.remove(host) {
                info!("Unregistering {}", host.hostname);
                if let Err(e) = advertisement.shutdown() {
                    warn!("Failed to withdraw {}: {}", host.hostname, e);
                }
            }
        }
    }

    /// Withdraw every remaining advertisement
    ///
    /// Called once during graceful shutdown.
    pub fn teardown(&mut self) {
        for (host, advertisement) in self.live.drain() {
            info!("Unregistering {}", host.hostname);
            if let Err(e) = advertisement.shutdown() {
                warn!("Failed to withdraw {}: {}", host.hostname, e);
            }
        }
    }

    /// Whether a hostname is currently being broadcast
    pub fn contains(&self, host: &LocalHostname) -> bool {
        self.live.contains_key(host)
    }

    /// Number of live advertisements
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether nothing is currently being broadcast
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
