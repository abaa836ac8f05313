use k8s_openapi::api::networking::v1::Ingress;
use std::collections::HashSet;

/// An Ingress hostname inside the broadcast suffix (e.g. `.local`)
///
/// Structural equality; one value identifies at most one live advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalHostname {
    /// Whether connections to this hostname are TLS
    pub tls: bool,
    /// The bare hostname, with the broadcast suffix stripped
    pub hostname: String,
}

impl LocalHostname {
    /// Create a hostname record
    pub fn new(tls: bool, hostname: impl Into<String>) -> Self {
        Self {
            tls,
            hostname: hostname.into(),
        }
    }
}

/// Extract the broadcastable hostnames declared by an Ingress
///
/// Keeps rule hosts ending in `suffix`, stripped of it, in rule order.
/// Duplicates are not removed here; the registry tolerates them.
pub fn local_hostnames(ingress: &Ingress, suffix: &str) -> Vec<LocalHostname> {
    let Some(spec) = ingress.spec.as_ref() else {
        return Vec::new();
    };

    // The same ingress can have both cleartext and TLS hosts. Only the
    // presence of a TLS block is checked, so every hostname extracted from
    // one ingress shares the flag.
    let tls = spec.tls.is_some();

    let mut hostnames = Vec::new();
    for rule in spec.rules.iter().flatten() {
        let Some(host) = rule.host.as_deref() else {
            continue;
        };
        let Some(bare) = host.strip_suffix(suffix) else {
            continue;
        };
        if bare.is_empty() {
            continue;
        }
        hostnames.push(LocalHostname::new(tls, bare));
    }
    hostnames
}

/// Compare two desired hostname sequences as sets
///
/// Rule order can change without semantic effect, so an order-only difference
/// must not trigger re-registration.
pub fn same_hostname_set(a: &[LocalHostname], b: &[LocalHostname]) -> bool {
    let a: HashSet<&LocalHostname> = a.iter().collect();
    let b: HashSet<&LocalHostname> = b.iter().collect();
    a == b
}
