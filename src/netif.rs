use crate::error::{Error, Result};
use std::fmt;
use std::net::IpAddr;

/// How the broadcast interface is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceSelector {
    /// Select by exact interface name
    Name(String),
    /// Select the interface that has this address bound, and advertise only
    /// this address
    Address(IpAddr),
}

impl InterfaceSelector {
    /// Parse a selector from configuration: an IP address if the string
    /// parses as one, an interface name otherwise
    pub fn parse(value: &str) -> Self {
        match value.parse::<IpAddr>() {
            Ok(addr) => Self::Address(addr),
            Err(_) => Self::Name(value.to_string()),
        }
    }
}

impl fmt::Display for InterfaceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Address(addr) => write!(f, "{addr}"),
        }
    }
}

/// A located interface and the addresses advertisements will carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastInterface {
    /// Interface name, used to bind the mDNS daemon
    pub name: String,
    /// Addresses to put in the advertised records
    pub addrs: Vec<IpAddr>,
}

/// Locate the broadcast interface for the given selector
///
/// Scans the host's interfaces once. Failure is fatal to startup: without an
/// interface there is nothing to broadcast on.
pub fn locate(selector: &InterfaceSelector) -> Result<BroadcastInterface> {
    let interfaces = collect_interfaces(if_addrs::get_if_addrs()?);
    select_interface(&interfaces, selector)
}

/// Group the flat per-address listing into one entry per interface,
/// preserving enumeration order
fn collect_interfaces(flat: Vec<if_addrs::Interface>) -> Vec<BroadcastInterface> {
    let mut interfaces: Vec<BroadcastInterface> = Vec::new();
    for entry in flat {
        let addr = entry.ip();
        match interfaces.iter_mut().find(|iface| iface.name == entry.name) {
            Some(iface) => iface.addrs.push(addr),
            None => interfaces.push(BroadcastInterface {
                name: entry.name,
                addrs: vec![addr],
            }),
        }
    }
    interfaces
}

fn select_interface(
    interfaces: &[BroadcastInterface],
    selector: &InterfaceSelector,
) -> Result<BroadcastInterface> {
    for iface in interfaces {
        match selector {
            InterfaceSelector::Name(name) if iface.name == *name => {
                return Ok(iface.clone());
            }
            InterfaceSelector::Address(addr) if iface.addrs.contains(addr) => {
                return Ok(BroadcastInterface {
                    name: iface.name.clone(),
                    addrs: vec![*addr],
                });
            }
            _ => {}
        }
    }
    Err(Error::InterfaceNotFound {
        selector: selector.to_string(),
        available: format_interface_list(interfaces),
    })
}

fn format_interface_list(interfaces: &[BroadcastInterface]) -> String {
    interfaces
        .iter()
        .map(|iface| {
            let addrs: Vec<String> = iface.addrs.iter().map(IpAddr::to_string).collect();
            format!("{} (IPs: {})", iface.name, addrs.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    fn sample_interfaces() -> Vec<BroadcastInterface> {
        vec![
            BroadcastInterface {
                name: "lo".to_string(),
                addrs: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
            },
            BroadcastInterface {
                name: "eth0".to_string(),
                addrs: vec![
                    IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
                    IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1)),
                ],
            },
        ]
    }

    #[test]
    fn selector_parses_addresses_and_names() {
        assert_eq!(
            InterfaceSelector::parse("10.0.0.5"),
            InterfaceSelector::Address(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
        );
        assert_eq!(
            InterfaceSelector::parse("eth0"),
            InterfaceSelector::Name("eth0".to_string())
        );
    }

    #[test]
    fn name_match_keeps_every_bound_address() {
        let iface = select_interface(
            &sample_interfaces(),
            &InterfaceSelector::Name("eth0".to_string()),
        )
        .unwrap();
        assert_eq!(iface.name, "eth0");
        assert_eq!(iface.addrs.len(), 2);
    }

    #[test]
    fn address_match_keeps_only_that_address() {
        let wanted = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));
        let iface = select_interface(
            &sample_interfaces(),
            &InterfaceSelector::Address(wanted),
        )
        .unwrap();
        assert_eq!(iface.name, "eth0");
        assert_eq!(iface.addrs, vec![wanted]);
    }

    #[test]
    fn no_match_lists_available_interfaces() {
        let err = select_interface(
            &sample_interfaces(),
            &InterfaceSelector::Name("wlan0".to_string()),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("wlan0"));
        assert!(message.contains("lo"));
        assert!(message.contains("eth0"));
        assert!(message.contains("10.0.0.5"));
    }

    #[test]
    fn empty_interface_list_is_not_found() {
        let err = select_interface(&[], &InterfaceSelector::Name("any".to_string())).unwrap_err();
        assert!(matches!(err, Error::InterfaceNotFound { .. }));
    }
}
