use crate::error::{Error, Result};
use crate::netif::InterfaceSelector;
use crate::ports::{PortId, ServiceRef};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::Level;

/// ingress-mdns configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Broadcast configuration
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Advertised port configuration
    #[serde(default)]
    pub ports: PortsConfig,

    /// Kubernetes client configuration
    #[serde(default)]
    pub kubernetes: KubernetesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Interface to broadcast on, by name or by bound IP address
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Hostname suffix that marks an ingress host as locally broadcastable
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortsConfig {
    /// Ingress controller service as NAME.NAMESPACE; when set, the port
    /// identifiers below are looked up among its declared target ports
    #[serde(default)]
    pub service: Option<String>,

    /// Target port used for cleartext connections
    #[serde(default = "default_cleartext_port")]
    pub cleartext: String,

    /// Target port used for TLS connections
    #[serde(default = "default_tls_port")]
    pub tls: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesConfig {
    /// Use the default kubeconfig instead of the in-cluster service account
    #[serde(default)]
    pub kubeconfig: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_interface() -> String {
    "eth0".to_string()
}

fn default_suffix() -> String {
    ".local".to_string()
}

fn default_cleartext_port() -> String {
    "80".to_string()
}

fn default_tls_port() -> String {
    "443".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            suffix: default_suffix(),
        }
    }
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            service: None,
            cleartext: default_cleartext_port(),
            tls: default_tls_port(),
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self { kubeconfig: false }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broadcast: BroadcastConfig::default(),
            ports: PortsConfig::default(),
            kubernetes: KubernetesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Broadcast Kubernetes ingress hostnames via mDNS", long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, env = "INGRESS_MDNS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to broadcast on, by name or by bound IP address
    #[arg(short, long, env = "INGRESS_MDNS_INTERFACE")]
    pub interface: Option<String>,

    /// IP address to broadcast on; overrides --interface and advertises only
    /// this address
    #[arg(long, env = "HOST_IP")]
    pub ip: Option<IpAddr>,

    /// Ingress controller service as NAME.NAMESPACE
    #[arg(short, long, env = "INGRESS_MDNS_SERVICE")]
    pub service: Option<String>,

    /// Target port used for cleartext connections to the service
    #[arg(long, env = "INGRESS_MDNS_CLEARTEXT_PORT")]
    pub cleartext_port: Option<String>,

    /// Target port used for TLS connections to the service
    #[arg(long, env = "INGRESS_MDNS_TLS_PORT")]
    pub tls_port: Option<String>,

    /// Hostname suffix to broadcast
    #[arg(long, env = "INGRESS_MDNS_SUFFIX")]
    pub suffix: Option<String>,

    /// Use the default kubeconfig instead of the in-cluster service account
    #[arg(short, long)]
    pub kubeconfig: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "INGRESS_MDNS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Print an example configuration file with defaults and exit
    #[arg(long)]
    pub print_example_config: bool,
}

impl Config {
    /// Print an example configuration file with all defaults and comments
    pub fn print_example_config() {
        println!(
            r#"# ingress-mdns configuration
#
# All settings have sensible defaults and are optional.

[broadcast]
# Interface on which hostnames are broadcast.
# Either an interface name, or an IP address bound to exactly one local
# interface. With an IP address, only that address is advertised.
# Default: eth0
interface = "eth0"

# Hostname suffix that marks an ingress host as locally broadcastable.
# Hosts are advertised with the suffix stripped.
# Default: .local
suffix = ".local"

[ports]
# Ingress controller service as SERVICENAME.NAMESPACE.
# When set, the cleartext and tls identifiers below are looked up among the
# service's declared target ports and the matching node ports are advertised.
# When unset, cleartext and tls must be numeric and are advertised as-is.
#service = "default-http-backend.kube-system"

# Target port used for cleartext connections.
# A number, or a port name when a service is configured.
# Default: 80
cleartext = "80"

# Target port used for TLS connections.
# Default: 443
tls = "443"

[kubernetes]
# Use the default kubeconfig instead of the in-cluster service account.
# Default: false
kubeconfig = false

[logging]
# Log level for the application.
# Options: trace, debug, info, warn, error
# Default: info
level = "info"
"#
        );
    }

    /// Load configuration from file, environment variables, and CLI arguments
    pub fn load(args: Args) -> Result<Self> {
        // Start with default config
        let mut config = if let Some(config_path) = &args.config {
            // Load from file
            let contents = std::fs::read_to_string(config_path)?;
            toml::from_str(&contents)
                .map_err(|e| Error::config(format!("{}: {e}", config_path.display())))?
        } else {
            Config::default()
        };

        // Override with CLI arguments
        if let Some(interface) = args.interface {
            config.broadcast.interface = interface;
        }

        if let Some(ip) = args.ip {
            config.broadcast.interface = ip.to_string();
        }

        if let Some(service) = args.service {
            config.ports.service = Some(service);
        }

        if let Some(cleartext_port) = args.cleartext_port {
            config.ports.cleartext = cleartext_port;
        }

        if let Some(tls_port) = args.tls_port {
            config.ports.tls = tls_port;
        }

        if let Some(suffix) = args.suffix {
            config.broadcast.suffix = suffix;
        }

        if args.kubeconfig {
            config.kubernetes.kubeconfig = true;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.broadcast.interface.is_empty() {
            return Err(Error::config("broadcast.interface cannot be empty"));
        }

        if !self.broadcast.suffix.starts_with('.') || self.broadcast.suffix.len() < 2 {
            return Err(Error::config(format!(
                "broadcast.suffix must start with a dot, e.g. \".local\", got \"{}\"",
                self.broadcast.suffix
            )));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(Error::config(format!(
                    "logging.level \"{other}\" is not valid. Valid levels: trace, debug, info, warn, error"
                )));
            }
        }

        match &self.ports.service {
            Some(service) => {
                // Catch a malformed identifier before any API call is made.
                service.parse::<ServiceRef>()?;
            }
            None => {
                self.static_ports()?;
            }
        }

        Ok(())
    }

    /// The configured interface selector
    pub fn interface_selector(&self) -> InterfaceSelector {
        InterfaceSelector::parse(&self.broadcast.interface)
    }

    /// The configured ingress controller service, if any
    pub fn service_ref(&self) -> Result<Option<ServiceRef>> {
        match &self.ports.service {
            Some(service) => Ok(Some(service.parse()?)),
            None => Ok(None),
        }
    }

    /// The configured cleartext port identifier
    pub fn cleartext_port_id(&self) -> PortId {
        PortId::parse(&self.ports.cleartext)
    }

    /// The configured TLS port identifier
    pub fn tls_port_id(&self) -> PortId {
        PortId::parse(&self.ports.tls)
    }

    /// The numeric port pair for static mode (no service configured)
    pub fn static_ports(&self) -> Result<(u16, u16)> {
        let parse = |name: &str, value: &str| {
            value.parse::<u16>().map_err(|_| {
                Error::config(format!(
                    "without ports.service, ports.{name} must be numeric, got \"{value}\""
                ))
            })
        };
        Ok((
            parse("cleartext", &self.ports.cleartext)?,
            parse("tls", &self.ports.tls)?,
        ))
    }

    /// Parse log level string to tracing::Level
    pub fn parse_log_level(&self) -> Level {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => {
                eprintln!(
                    "Invalid log level '{}', defaulting to INFO",
                    self.logging.level
                );
                Level::INFO
            }
        }
    }
}
