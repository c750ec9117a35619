// Poll cycle: connect, fetch each datacenter in order, correlate, assemble.
// Every cycle starts from scratch; nothing survives between cycles.

use chrono::Utc;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::{CollectionConfig, EndpointConfig, SourceKind};
use crate::file_repo::FileRepo;
use crate::inventory::{self, Assembled, SkipReason, SkippedVm};
use crate::metrics::{Metrics, Outcome};
use crate::models::{Datacenter, DatacenterInventory, Payload};
use crate::source::{InventorySession, InventorySource, SourceError};
use crate::vsphere_repo::VsphereRepo;

/// Per-datacenter list the collector asks the source for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Datastores,
    Clusters,
    Hosts,
    Vms,
    Networks,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::Datastores => "datastores",
            Resource::Clusters => "clusters",
            Resource::Hosts => "hosts",
            Resource::Vms => "vms",
            Resource::Networks => "networks",
        })
    }
}

/// Fatal for the whole cycle; no partial payload is ever returned.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollectError {
    #[error("connect failed: {0}")]
    Connect(#[source] SourceError),
    #[error("listing datacenters failed: {0}")]
    Datacenters(#[source] SourceError),
    #[error("listing {resource} for datacenter {datacenter:?} failed: {source}")]
    Retrieval {
        datacenter: String,
        resource: Resource,
        #[source]
        source: SourceError,
    },
}

impl CollectError {
    /// The underlying source failure, whichever step it came from.
    pub fn source_error(&self) -> &SourceError {
        match self {
            CollectError::Connect(e) | CollectError::Datacenters(e) => e,
            CollectError::Retrieval { source, .. } => source,
        }
    }
}

/// Result of one successful poll cycle.
#[derive(Debug, Clone)]
pub struct Collection {
    pub datacenters: Vec<Datacenter>,
    pub payload: Payload,
    /// VMs excluded from the payload and why.
    pub skipped: Vec<SkippedVm>,
}

type CycleResult = Result<Arc<Collection>, CollectError>;
type CycleFuture = BoxFuture<'static, CycleResult>;

/// `Collect()` for one configured endpoint.
pub struct Collector {
    endpoint: String,
    source: Arc<dyn InventorySource>,
    /// Present when single-flight is enabled: the cycle currently in progress.
    /// Held weakly so a cycle every caller has abandoned is dropped, not resumed.
    in_flight: Option<Mutex<Option<WeakShared<CycleFuture>>>>,
    metrics: Option<Arc<Metrics>>,
}

impl Collector {
    pub fn new(
        endpoint: impl Into<String>,
        source: Arc<dyn InventorySource>,
        single_flight: bool,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            source,
            in_flight: single_flight.then(|| Mutex::new(None)),
            metrics: None,
        }
    }

    /// Records every cycle this collector runs into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn from_config(endpoint: &EndpointConfig, collection: &CollectionConfig) -> Self {
        let source: Arc<dyn InventorySource> = match endpoint.kind {
            SourceKind::Vsphere => Arc::new(VsphereRepo::from_config(endpoint)),
            SourceKind::File => Arc::new(FileRepo::new(
                endpoint.path.clone().unwrap_or_default(),
            )),
        };
        Self::new(endpoint.name.clone(), source, collection.single_flight)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs one poll cycle. With single-flight, callers arriving while a cycle is
    /// running share its result instead of starting another.
    pub async fn collect(&self) -> CycleResult {
        let Some(slot) = &self.in_flight else {
            return self.cycle().await;
        };

        let cycle: Shared<CycleFuture> = {
            let mut current = slot.lock().await;
            match current.as_ref().and_then(WeakShared::upgrade) {
                Some(cycle) => {
                    debug!(endpoint = %self.endpoint, "joining in-flight poll cycle");
                    cycle
                }
                None => {
                    let cycle = self.cycle().shared();
                    *current = cycle.downgrade();
                    cycle
                }
            }
        };

        let result = cycle.clone().await;

        let mut current = slot.lock().await;
        if current
            .as_ref()
            .and_then(WeakShared::upgrade)
            .is_some_and(|c| c.ptr_eq(&cycle))
        {
            *current = None;
        }
        result
    }

    fn cycle(&self) -> CycleFuture {
        run_cycle(
            self.source.clone(),
            self.endpoint.clone(),
            self.metrics.clone(),
        )
        .boxed()
    }
}

#[instrument(skip(source, metrics), fields(operation = "collect"))]
async fn run_cycle(
    source: Arc<dyn InventorySource>,
    endpoint: String,
    metrics: Option<Arc<Metrics>>,
) -> CycleResult {
    let started = Instant::now();
    let result = match source.connect().await {
        Ok(session) => {
            let result = collect_session(session.as_ref()).await;
            session.close().await;
            result
        }
        Err(e) => Err(CollectError::Connect(e)),
    };

    let elapsed = started.elapsed();
    match &result {
        Ok(c) => log_summary(&endpoint, c, elapsed),
        Err(e) => warn!(
            endpoint = %endpoint,
            error = %e,
            elapsed_ms = elapsed.as_millis() as u64,
            "poll cycle failed"
        ),
    }
    if let Some(metrics) = &metrics {
        match &result {
            Ok(c) => metrics.record_cycle(&endpoint, Outcome::Success, elapsed, &c.skipped),
            Err(_) => metrics.record_cycle(&endpoint, Outcome::Failure, elapsed, &[]),
        }
    }
    result.map(Arc::new)
}

async fn collect_session(session: &dyn InventorySession) -> Result<Collection, CollectError> {
    let raw_datacenters = session
        .list_datacenters()
        .await
        .map_err(CollectError::Datacenters)?;

    let mut datacenters = Vec::with_capacity(raw_datacenters.len());
    let mut results = Vec::with_capacity(raw_datacenters.len());
    for raw in raw_datacenters {
        let datacenter = Datacenter {
            id: raw.id,
            name: raw.name,
            collected: Utc::now(),
        };
        let result = fetch_datacenter(session, &datacenter)
            .await
            .map(|fetched| inventory::correlate_datacenter(&datacenter, fetched));
        let failed = result.is_err();
        results.push(result);
        datacenters.push(datacenter);
        if failed {
            // assemble stops at this entry
            break;
        }
    }

    let Assembled { payload, skipped } = inventory::assemble(results)?;
    Ok(Collection {
        datacenters,
        payload,
        skipped,
    })
}

/// The ordered per-datacenter fetches; the first failure aborts.
async fn fetch_datacenter(
    session: &dyn InventorySession,
    datacenter: &Datacenter,
) -> Result<DatacenterInventory, CollectError> {
    let id = datacenter.id.as_str();
    let datastores = session
        .list_datastores(id)
        .await
        .map_err(retrieval(datacenter, Resource::Datastores))?;
    let clusters = session
        .list_clusters(id)
        .await
        .map_err(retrieval(datacenter, Resource::Clusters))?;
    let hosts = session
        .list_hosts(id)
        .await
        .map_err(retrieval(datacenter, Resource::Hosts))?;
    let vms = session
        .list_vms(id)
        .await
        .map_err(retrieval(datacenter, Resource::Vms))?;
    let networks = session
        .list_networks(id)
        .await
        .map_err(retrieval(datacenter, Resource::Networks))?;

    Ok(DatacenterInventory {
        datastores,
        clusters,
        hosts,
        vms,
        networks,
    })
}

fn retrieval(
    datacenter: &Datacenter,
    resource: Resource,
) -> impl FnOnce(SourceError) -> CollectError + '_ {
    move |source| CollectError::Retrieval {
        datacenter: datacenter.name.clone(),
        resource,
        source,
    }
}

fn log_summary(endpoint: &str, collection: &Collection, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    let mut by_reason: HashMap<SkipReason, usize> = HashMap::new();
    for skipped in &collection.skipped {
        *by_reason.entry(skipped.reason).or_default() += 1;
    }
    let count = |reason| by_reason.get(&reason).copied().unwrap_or(0);
    let payload = &collection.payload;

    if collection.skipped.is_empty() {
        info!(
            endpoint,
            datacenters = collection.datacenters.len(),
            hosts = payload.hosts.len(),
            datastores = payload.data_stores.len(),
            vms = payload.vms.len(),
            networks = payload.networks.len(),
            elapsed_ms,
            "poll cycle complete"
        );
    } else {
        warn!(
            endpoint,
            datacenters = collection.datacenters.len(),
            hosts = payload.hosts.len(),
            datastores = payload.data_stores.len(),
            vms = payload.vms.len(),
            networks = payload.networks.len(),
            skipped = collection.skipped.len(),
            host_not_found = count(SkipReason::HostNotFound),
            no_datastore_reference = count(SkipReason::NoDatastoreReference),
            datastore_not_found = count(SkipReason::DatastoreNotFound),
            elapsed_ms,
            "poll cycle complete with skipped VMs"
        );
    }
}
