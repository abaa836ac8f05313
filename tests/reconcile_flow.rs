use ingress_mdns::{
    Advertisement, Advertiser, BroadcastInterface, BroadcastSpec, HostnameRegistry,
    IngressDispatcher, LocalHostname, PortId, PortResolver, Result,
};
use k8s_openapi::api::networking::v1::{Ingress, IngressRule, IngressSpec, IngressTLS};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Register { hostname: String, port: u16 },
    Shutdown { hostname: String },
}

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

struct RecordingAdvertiser {
    log: CallLog,
}

impl Advertiser for RecordingAdvertiser {
    fn register(&self, spec: &BroadcastSpec) -> Result<Box<dyn Advertisement>> {
        self.log.push(Call::Register {
            hostname: spec.instance.clone(),
            port: spec.port,
        });
        Ok(Box::new(RecordingAdvertisement {
            log: self.log.clone(),
            hostname: spec.instance.clone(),
        }))
    }
}

struct RecordingAdvertisement {
    log: CallLog,
    hostname: String,
}

impl Advertisement for RecordingAdvertisement {
    fn shutdown(self: Box<Self>) -> Result<()> {
        self.log.push(Call::Shutdown {
            hostname: self.hostname.clone(),
        });
        Ok(())
    }
}

fn dispatcher_with(log: CallLog, resolver: PortResolver) -> IngressDispatcher {
    let registry = HostnameRegistry::new(
        Box::new(RecordingAdvertiser { log }),
        resolver,
        BroadcastInterface {
            name: "eth0".to_string(),
            addrs: vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))],
        },
    );
    IngressDispatcher::new(registry, ".local")
}

fn ingress(name: &str, hosts: &[&str], tls: bool) -> Ingress {
    Ingress {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            rules: Some(
                hosts
                    .iter()
                    .map(|host| IngressRule {
                        host: Some((*host).to_string()),
                        ..Default::default()
                    })
                    .collect(),
            ),
            tls: tls.then(|| vec![IngressTLS::default()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn add_then_delete_round_trip() {
    let log = CallLog::default();
    let mut dispatcher = dispatcher_with(log.clone(), PortResolver::fixed(80, 443));

    dispatcher.applied(&ingress("web", &["foo.local"], false));
    assert_eq!(dispatcher.registry().len(), 1);
    assert!(dispatcher
        .registry()
        .contains(&LocalHostname::new(false, "foo")));
    assert_eq!(
        log.calls(),
        vec![Call::Register {
            hostname: "foo".to_string(),
            port: 80
        }]
    );

    dispatcher.deleted(&ingress("web", &["foo.local"], false));
    assert!(dispatcher.registry().is_empty());
}

#[test]
fn rename_never_advertises_both_or_neither() {
    let log = CallLog::default();
    let mut dispatcher = dispatcher_with(log.clone(), PortResolver::fixed(80, 443));

    dispatcher.applied(&ingress("web", &["foo.local"], false));
    dispatcher.applied(&ingress("web", &["bar.local"], false));

    assert!(dispatcher
        .registry()
        .contains(&LocalHostname::new(false, "bar")));
    assert!(!dispatcher
        .registry()
        .contains(&LocalHostname::new(false, "foo")));

    // The old broadcast is withdrawn strictly before the new one starts.
    assert_eq!(
        log.calls(),
        vec![
            Call::Register {
                hostname: "foo".to_string(),
                port: 80
            },
            Call::Shutdown {
                hostname: "foo".to_string()
            },
            Call::Register {
                hostname: "bar".to_string(),
                port: 80
            },
        ]
    );
}

#[test]
fn tls_ingresses_advertise_the_tls_port() {
    let log = CallLog::default();
    let mut dispatcher = dispatcher_with(log.clone(), PortResolver::fixed(80, 443));

    dispatcher.applied(&ingress("secure-web", &["vault.local"], true));

    assert_eq!(
        log.calls(),
        vec![Call::Register {
            hostname: "vault".to_string(),
            port: 443
        }]
    );
}

#[test]
fn node_port_mode_advertises_the_mapped_ports() {
    let log = CallLog::default();
    let resolver = PortResolver::new(
        "ingress-nginx.kube-system",
        PortId::Name("http".to_string()),
        PortId::Name("https".to_string()),
        HashMap::from([
            (PortId::Name("http".to_string()), 30080),
            (PortId::Name("https".to_string()), 30443),
        ]),
    );
    let mut dispatcher = dispatcher_with(log.clone(), resolver);

    dispatcher.applied(&ingress("web", &["foo.local"], false));
    dispatcher.applied(&ingress("secure-web", &["vault.local"], true));

    assert_eq!(
        log.calls(),
        vec![
            Call::Register {
                hostname: "foo".to_string(),
                port: 30080
            },
            Call::Register {
                hostname: "vault".to_string(),
                port: 30443
            },
        ]
    );
}

#[test]
fn unresolvable_hostnames_are_skipped_without_stopping_dispatch() {
    let log = CallLog::default();
    // Only the cleartext port is declared by the controller service.
    let resolver = PortResolver::new(
        "ingress-nginx.kube-system",
        PortId::Name("http".to_string()),
        PortId::Name("https".to_string()),
        HashMap::from([(PortId::Name("http".to_string()), 30080)]),
    );
    let mut dispatcher = dispatcher_with(log.clone(), resolver);

    dispatcher.applied(&ingress("secure-web", &["vault.local"], true));
    dispatcher.applied(&ingress("web", &["foo.local"], false));

    assert!(!dispatcher
        .registry()
        .contains(&LocalHostname::new(true, "vault")));
    assert!(dispatcher
        .registry()
        .contains(&LocalHostname::new(false, "foo")));
}

#[test]
fn teardown_withdraws_every_broadcast_exactly_once() {
    let log = CallLog::default();
    let mut dispatcher = dispatcher_with(log.clone(), PortResolver::fixed(80, 443));

    dispatcher.applied(&ingress("one", &["a.local", "b.local"], false));
    dispatcher.applied(&ingress("two", &["c.local"], true));
    dispatcher.teardown();

    assert!(dispatcher.registry().is_empty());
    let mut shutdowns: Vec<String> = log
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Shutdown { hostname } => Some(hostname),
            Call::Register { .. } => None,
        })
        .collect();
    shutdowns.sort();
    assert_eq!(shutdowns, vec!["a", "b", "c"]);
}
