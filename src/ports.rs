use crate::error::{Error, Result};
use crate::hostname::LocalHostname;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::HashMap;
use std::fmt;

/// A declared service port identifier, either numeric or named
///
/// Mirrors the Kubernetes `IntOrString` target-port field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PortId {
    /// Numeric port
    Number(i32),
    /// Named port
    Name(String),
}

impl PortId {
    /// Parse a port identifier from configuration: a number if it parses as
    /// one, a named port otherwise
    pub fn parse(value: &str) -> Self {
        match value.parse::<i32>() {
            Ok(number) => Self::Number(number),
            Err(_) => Self::Name(value.to_string()),
        }
    }
}

impl From<&IntOrString> for PortId {
    fn from(value: &IntOrString) -> Self {
        match value {
            IntOrString::Int(number) => Self::Number(*number),
            IntOrString::String(name) => Self::Name(name.clone()),
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// A namespaced service identifier, written `NAME.NAMESPACE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRef {
    /// Service name
    pub name: String,
    /// Namespace the service lives in
    pub namespace: String,
}

impl std::str::FromStr for ServiceRef {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let mut parts = value.splitn(2, '.');
        match (parts.next(), parts.next()) {
            (Some(name), Some(namespace))
                if !name.is_empty() && !namespace.is_empty() && !namespace.contains('.') =>
            {
                Ok(Self {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                })
            }
            _ => Err(Error::InvalidServiceRef(value.to_string())),
        }
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.namespace)
    }
}

/// Resolves the numeric port an advertisement should carry
///
/// The mapping is built once at startup; lookups happen per hostname, on
/// demand, so a cluster that only declares one of the two connection kinds
/// fails only the hostnames that actually need the missing one.
#[derive(Debug, Clone)]
pub struct PortResolver {
    service: String,
    cleartext: PortId,
    tls: PortId,
    ports: HashMap<PortId, u16>,
}

impl PortResolver {
    /// Resolver backed by a service's declared port mapping
    pub fn new(
        service: impl Into<String>,
        cleartext: PortId,
        tls: PortId,
        ports: HashMap<PortId, u16>,
    ) -> Self {
        Self {
            service: service.into(),
            cleartext,
            tls,
            ports,
        }
    }

    /// Resolver that advertises fixed numeric ports, with no service lookup
    pub fn fixed(cleartext: u16, tls: u16) -> Self {
        let ports = HashMap::from([
            (PortId::Number(i32::from(cleartext)), cleartext),
            (PortId::Number(i32::from(tls)), tls),
        ]);
        Self {
            service: "static port configuration".to_string(),
            cleartext: PortId::Number(i32::from(cleartext)),
            tls: PortId::Number(i32::from(tls)),
            ports,
        }
    }

    /// Resolve the port to advertise for one hostname
    pub fn resolve(&self, host: &LocalHostname) -> Result<u16> {
        let (wanted, kind) = if host.tls {
            (&self.tls, "tls")
        } else {
            (&self.cleartext, "cleartext")
        };
        self.ports
            .get(wanted)
            .copied()
            .ok_or_else(|| Error::PortLookup {
                hostname: host.hostname.clone(),
                kind,
                port: wanted.to_string(),
                service: self.service.clone(),
            })
    }
}

/// Build the target-port to node-port mapping from an ingress controller
/// service
///
/// Keys are the declared target ports (falling back to the service port when
/// no target port is set); entries without a node port are skipped.
pub fn node_port_map(service: &Service) -> HashMap<PortId, u16> {
    let mut map = HashMap::new();
    for port in service.spec.iter().flat_map(|s| s.ports.iter().flatten()) {
        let Some(node_port) = port.node_port else {
            continue;
        };
        let Ok(node_port) = u16::try_from(node_port) else {
            continue;
        };
        let key = match port.target_port.as_ref() {
            Some(target) => PortId::from(target),
            None => PortId::Number(port.port),
        };
        map.insert(key, node_port);
    }
    map
}
