mod client;
mod watch;

pub use client::{connect, fetch_node_ports};
pub use watch::{ingress_events, run_watch};

#[cfg(test)]
mod tests;
