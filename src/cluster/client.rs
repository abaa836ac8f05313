use crate::error::{Error, Result};
use crate::ports::{PortId, ServiceRef, node_port_map};
use k8s_openapi::api::core::v1::Service;
use kube::api::Api;
use kube::config::KubeConfigOptions;
use kube::Client;
use std::collections::HashMap;
use tracing::debug;

/// Build a Kubernetes client
///
/// Uses the default kubeconfig when asked, the in-cluster service account
/// otherwise. Credential failures are fatal at startup.
pub async fn connect(use_kubeconfig: bool) -> Result<Client> {
    let config = if use_kubeconfig {
        debug!("Loading credentials from kubeconfig");
        kube::Config::from_kubeconfig(&KubeConfigOptions::default())
            .await
            .map_err(|e| Error::config(format!("failed to load kubeconfig: {e}")))?
    } else {
        debug!("Loading in-cluster credentials");
        kube::Config::incluster()
            .map_err(|e| Error::config(format!("failed to load in-cluster credentials: {e}")))?
    };
    Ok(Client::try_from(config)?)
}

/// Fetch the ingress controller service and build its port mapping
pub async fn fetch_node_ports(
    client: Client,
    service: &ServiceRef,
) -> Result<HashMap<PortId, u16>> {
    debug!("Getting port mapping for {service}");
    let services: Api<Service> = Api::namespaced(client, &service.namespace);
    let found = services.get(&service.name).await?;
    let mapping = node_port_map(&found);
    debug!("Port mapping for {service} is: {mapping:?}");
    Ok(mapping)
}
