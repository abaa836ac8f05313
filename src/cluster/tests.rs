use super::watch::handle_event;
use crate::advertiser::{Advertisement, Advertiser, BroadcastSpec};
use crate::error::Result;
use crate::hostname::LocalHostname;
use crate::hostname_registry::{HostnameRegistry, IngressDispatcher};
use crate::netif::BroadcastInterface;
use crate::ports::PortResolver;
use k8s_openapi::api::networking::v1::{Ingress, IngressRule, IngressSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::runtime::watcher;
use std::net::{IpAddr, Ipv4Addr};

struct NullAdvertiser;

impl Advertiser for NullAdvertiser {
    fn register(&self, _spec: &BroadcastSpec) -> Result<Box<dyn Advertisement>> {
        Ok(Box::new(NullAdvertisement))
    }
}

struct NullAdvertisement;

impl Advertisement for NullAdvertisement {
    fn shutdown(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

fn dispatcher() -> IngressDispatcher {
    let registry = HostnameRegistry::new(
        Box::new(NullAdvertiser),
        PortResolver::fixed(80, 443),
        BroadcastInterface {
            name: "eth0".to_string(),
            addrs: vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))],
        },
    );
    IngressDispatcher::new(registry, ".local")
}

fn ingress(name: &str, hosts: &[&str]) -> Ingress {
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
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn apply_events_register() {
    let mut dispatcher = dispatcher();

    handle_event(
        &mut dispatcher,
        watcher::Event::Apply(ingress("web", &["foo.local"])),
    );

    assert!(dispatcher
        .registry()
        .contains(&LocalHostname::new(false, "foo")));
}

#[test]
fn initial_listing_events_register_like_applies() {
    let mut dispatcher = dispatcher();

    handle_event(&mut dispatcher, watcher::Event::Init);
    handle_event(
        &mut dispatcher,
        watcher::Event::InitApply(ingress("web", &["foo.local"])),
    );
    handle_event(&mut dispatcher, watcher::Event::InitDone);

    assert_eq!(dispatcher.registry().len(), 1);
}

#[test]
fn delete_events_unregister() {
    let mut dispatcher = dispatcher();

    handle_event(
        &mut dispatcher,
        watcher::Event::Apply(ingress("web", &["foo.local"])),
    );
    handle_event(
        &mut dispatcher,
        watcher::Event::Delete(ingress("web", &["foo.local"])),
    );

    assert!(dispatcher.registry().is_empty());
}
