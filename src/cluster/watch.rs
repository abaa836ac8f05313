use crate::error::Result;
use crate::hostname_registry::IngressDispatcher;
use futures::{Stream, StreamExt};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::Api;
use kube::runtime::{WatchStreamExt, watcher};
use kube::Client;
use tracing::{debug, info, warn};

/// Watch every Ingress in the cluster
///
/// The watcher delivers the full current listing on start, then incremental
/// events, and re-establishes itself with backoff after API interruptions.
pub fn ingress_events(
    client: Client,
) -> impl Stream<Item = std::result::Result<watcher::Event<Ingress>, watcher::Error>> {
    let ingresses: Api<Ingress> = Api::all(client);
    watcher(ingresses, watcher::Config::default()).default_backoff()
}

/// Consume the event stream, one notification at a time
///
/// Stream-level errors are logged and the stream is polled again; no error
/// from one notification prevents processing of the next.
pub async fn run_watch<S>(events: S, dispatcher: &mut IngressDispatcher) -> Result<()>
where
    S: Stream<Item = std::result::Result<watcher::Event<Ingress>, watcher::Error>>,
{
    tokio::pin!(events);
    while let Some(item) = events.next().await {
        match item {
            Ok(event) => handle_event(dispatcher, event),
            Err(e) => warn!("Ingress watch interrupted: {e}"),
        }
    }
    Ok(())
}

pub(crate) fn handle_event(dispatcher: &mut IngressDispatcher, event: watcher::Event<Ingress>) {
    match event {
        watcher::Event::Apply(ingress) | watcher::Event::InitApply(ingress) => {
            dispatcher.applied(&ingress);
        }
        watcher::Event::Delete(ingress) => dispatcher.deleted(&ingress),
        watcher::Event::Init => debug!("Ingress listing started"),
        watcher::Event::InitDone => info!("Initial ingress listing complete"),
    }
}
