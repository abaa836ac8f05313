mod advertiser;
mod cluster;
mod config;
mod error;
mod hostname;
mod hostname_registry;
mod netif;
mod ports;

use crate::advertiser::MdnsAdvertiser;
use crate::config::{Args, Config};
use crate::error::Result;
use crate::hostname_registry::{HostnameRegistry, IngressDispatcher};
use crate::ports::PortResolver;
use clap::Parser;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    if args.print_example_config {
        Config::print_example_config();
        return;
    }

    // Load configuration
    let config = match Config::load(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing/logging with configured level
    tracing_subscriber::fmt()
        .with_max_level(config.parse_log_level())
        .init();

    info!("Starting ingress-mdns");

    if let Err(e) = run(config).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    let selector = config.interface_selector();
    debug!("Determining IPs of {selector}");
    let interface = netif::locate(&selector)?;
    let addresses: Vec<String> = interface.addrs.iter().map(ToString::to_string).collect();
    info!(
        "Broadcasting on {} (IPs: {})",
        interface.name,
        addresses.join(", ")
    );

    let client = cluster::connect(config.kubernetes.kubeconfig).await?;

    // Ports are resolved per hostname later; only the mapping is fetched now.
    let resolver = match config.service_ref()? {
        Some(service) => {
            let mapping = cluster::fetch_node_ports(client.clone(), &service).await?;
            PortResolver::new(
                service.to_string(),
                config.cleartext_port_id(),
                config.tls_port_id(),
                mapping,
            )
        }
        None => {
            let (cleartext, tls) = config.static_ports()?;
            PortResolver::fixed(cleartext, tls)
        }
    };

    let mdns = MdnsAdvertiser::new(&interface.name)?;
    let daemon = mdns.daemon_handle();

    let registry = HostnameRegistry::new(Box::new(mdns), resolver, interface);
    let mut dispatcher = IngressDispatcher::new(registry, config.broadcast.suffix.clone());

    info!("Watching ingresses");
    let events = cluster::ingress_events(client);

    tokio::select! {
        result = cluster::run_watch(events, &mut dispatcher) => result?,
        signal = shutdown_signal() => {
            info!("Received {}, shutting down", signal?);
        }
    }

    dispatcher.teardown();
    if let Err(e) = daemon.shutdown() {
        warn!("Failed to shut down mDNS daemon: {e}");
    }

    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for an interrupt on non-Unix platforms
#[cfg(not(unix))]
async fn shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("interrupt")
}
