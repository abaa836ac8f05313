use crate::hostname::{LocalHostname, local_hostnames, same_hostname_set};
use crate::hostname_registry::HostnameRegistry;
use k8s_openapi::api::networking::v1::Ingress;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Applies Ingress notifications to the registry
///
/// The watch stream collapses add and update into apply events; the last
/// extracted hostname set is kept per object so updates can withdraw the old
/// set before announcing the new one. Register failures are logged here and
/// never propagated: one bad hostname must not take down the watch loop.
pub struct IngressDispatcher {
    registry: HostnameRegistry,
    suffix: String,
    seen: HashMap<String, Vec<LocalHostname>>,
}

impl IngressDispatcher {
    /// Create a dispatcher broadcasting hostnames under the given suffix
    pub fn new(registry: HostnameRegistry, suffix: impl Into<String>) -> Self {
        Self {
            registry,
            suffix: suffix.into(),
            seen: HashMap::new(),
        }
    }

    /// Handle an applied (created or updated) Ingress
    pub fn applied(&mut self, ingress: &Ingress) {
        let Some(key) = object_key(ingress) else {
            return;
        };
        let desired = local_hostnames(ingress, &self.suffix);
        match self.seen.get(&key) {
            Some(current) if same_hostname_set(current, &desired) => {
                debug!("No hostname changes for {key}");
            }
            Some(current) => {
                info!("Ingress {key} changed, re-registering hostnames");
                let withdrawn = current.clone();
                self.registry.unregister_all(&withdrawn);
                if let Err(e) = self.registry.register_all(&desired) {
                    error!("Failed to register hostnames for {key}: {e}");
                }
                self.seen.insert(key, desired);
            }
            None => {
                if let Err(e) = self.registry.register_all(&desired) {
                    error!("Failed to register hostnames for {key}: {e}");
                }
                self.seen.insert(key, desired);
            }
        }
    }

    /// Handle a deleted Ingress
    pub fn deleted(&mut self, ingress: &Ingress) {
        let Some(key) = object_key(ingress) else {
            return;
        };
        // Prefer the set registered from the last seen revision; fall back to
        // extracting from the final snapshot for objects never applied.
        let hostnames = self
            .seen
            .remove(&key)
            .unwrap_or_else(|| local_hostnames(ingress, &self.suffix));
        self.registry.unregister_all(&hostnames);
    }

    /// Withdraw everything and forget all objects
    pub fn teardown(&mut self) {
        self.seen.clear();
        self.registry.teardown();
    }

    /// The underlying registry
    pub fn registry(&self) -> &HostnameRegistry {
        &self.registry
    }
}

fn object_key(ingress: &Ingress) -> Option<String> {
    let name = ingress.metadata.name.as_deref()?;
    match ingress.metadata.namespace.as_deref() {
        Some(namespace) => Some(format!("{namespace}/{name}")),
        None => Some(name.to_string()),
    }
}
