// Shared test helpers: raw record builders and an in-memory inventory source

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vsphere_inventory::models::*;
use vsphere_inventory::source::*;

pub fn collected_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn datacenter(name: &str) -> Datacenter {
    Datacenter {
        id: format!("datacenter-{name}"),
        name: name.into(),
        collected: collected_at(),
    }
}

pub fn host(id: &str) -> HostRaw {
    HostRaw {
        id: id.into(),
        name: format!("{id}.example.com"),
        power_state: PowerState::PoweredOn,
        boot_time: None,
        ncpu: 16,
        memory: 256 * 1024 * 1024 * 1024,
    }
}

pub fn datastore(id: &str) -> DatastoreRaw {
    DatastoreRaw {
        id: id.into(),
        name: format!("{id}-name"),
        type_: "VMFS".into(),
        capacity: 1_000_000,
        free: 400_000,
    }
}

pub fn cluster(name: &str, hosts: &[&str]) -> ClusterRaw {
    ClusterRaw {
        name: name.into(),
        hosts: hosts.iter().map(|h| h.to_string()).collect(),
    }
}

/// A VM on `host_id` whose only datastore is `datastore_id`.
pub fn vm(id: &str, host_id: &str, datastore_id: &str) -> VmRaw {
    VmRaw {
        id: id.into(),
        name: format!("{id}-name"),
        power_state: PowerState::PoweredOn,
        boot_time: None,
        ncpu: 2,
        memory_mb: 4096,
        host_id: Some(host_id.into()),
        datastores: vec![datastore_id.into()],
        storage_usage: vec![DatastoreUsage {
            datastore: datastore_id.into(),
            committed: 10,
            uncommitted: 5,
        }],
        guest: Some(GuestInfo {
            ip_address: Some("10.0.0.10".into()),
        }),
    }
}

pub fn network(id: &str, hosts: &[&str]) -> NetworkRaw {
    NetworkRaw {
        id: id.into(),
        name: format!("{id}-name"),
        hosts: hosts.iter().map(|h| h.to_string()).collect(),
    }
}

/// Two clusters, three hosts (one unclustered), two datastores, four VMs of
/// which one points at a missing host and one has no datastore.
pub fn sample_inventory() -> DatacenterInventory {
    let mut orphan = vm("vm-4", "host-99", "datastore-1");
    orphan.name = "orphan".into();
    let mut diskless = vm("vm-5", "host-1", "datastore-1");
    diskless.datastores.clear();
    DatacenterInventory {
        datastores: vec![datastore("datastore-1"), datastore("datastore-2")],
        clusters: vec![
            cluster("prod", &["host-1", "host-2"]),
            cluster("empty", &[]),
        ],
        hosts: vec![host("host-1"), host("host-2"), host("host-3")],
        vms: vec![
            vm("vm-1", "host-1", "datastore-1"),
            vm("vm-2", "host-1", "datastore-2"),
            vm("vm-3", "host-3", "datastore-1"),
            orphan,
            diskless,
        ],
        networks: vec![
            network("network-1", &["host-3", "host-2"]),
            network("network-2", &["host-3"]),
        ],
    }
}

/// Which call should fail, e.g. `("list_hosts", "datacenter-b")` or `("connect", "")`.
#[derive(Clone, Default)]
pub struct Failure {
    pub operation: String,
    pub datacenter: String,
}

/// In-memory source that records every call it receives.
#[derive(Clone, Default)]
pub struct StaticSource {
    pub datacenters: Vec<(DatacenterRaw, DatacenterInventory)>,
    pub failure: Option<Failure>,
    /// Delay inside `connect`, to hold a cycle open.
    pub connect_delay: Option<Duration>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub connects: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl StaticSource {
    pub fn new(datacenters: Vec<(&str, DatacenterInventory)>) -> Self {
        Self {
            datacenters: datacenters
                .into_iter()
                .map(|(name, inv)| {
                    (
                        DatacenterRaw {
                            id: format!("datacenter-{name}"),
                            name: name.into(),
                        },
                        inv,
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing(mut self, operation: &str, datacenter: &str) -> Self {
        self.failure = Some(Failure {
            operation: operation.into(),
            datacenter: datacenter.into(),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InventorySource for StaticSource {
    async fn connect(&self) -> SourceResult<Box<dyn InventorySession>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failure.as_ref().is_some_and(|f| f.operation == "connect") {
            return Err(SourceError::auth("Invalid credentials"));
        }
        Ok(Box::new(StaticSession {
            source: self.clone(),
        }))
    }
}

struct StaticSession {
    source: StaticSource,
}

impl StaticSession {
    fn record(&self, operation: &str, datacenter: &str) -> SourceResult<()> {
        self.source
            .calls
            .lock()
            .unwrap()
            .push(format!("{operation}:{datacenter}"));
        match &self.source.failure {
            Some(f) if f.operation == operation && f.datacenter == datacenter => Err(
                SourceError::api(503, format!("{operation} unavailable")),
            ),
            _ => Ok(()),
        }
    }

    fn inventory(&self, datacenter: &str) -> &DatacenterInventory {
        &self
            .source
            .datacenters
            .iter()
            .find(|(dc, _)| dc.id == datacenter)
            .expect("known datacenter")
            .1
    }
}

#[async_trait]
impl InventorySession for StaticSession {
    async fn list_datacenters(&self) -> SourceResult<Vec<DatacenterRaw>> {
        self.record("list_datacenters", "")?;
        Ok(self.source.datacenters.iter().map(|(dc, _)| dc.clone()).collect())
    }

    async fn list_datastores(&self, datacenter: &str) -> SourceResult<Vec<DatastoreRaw>> {
        self.record("list_datastores", datacenter)?;
        Ok(self.inventory(datacenter).datastores.clone())
    }

    async fn list_clusters(&self, datacenter: &str) -> SourceResult<Vec<ClusterRaw>> {
        self.record("list_clusters", datacenter)?;
        Ok(self.inventory(datacenter).clusters.clone())
    }

    async fn list_hosts(&self, datacenter: &str) -> SourceResult<Vec<HostRaw>> {
        self.record("list_hosts", datacenter)?;
        Ok(self.inventory(datacenter).hosts.clone())
    }

    async fn list_vms(&self, datacenter: &str) -> SourceResult<Vec<VmRaw>> {
        self.record("list_vms", datacenter)?;
        Ok(self.inventory(datacenter).vms.clone())
    }

    async fn list_networks(&self, datacenter: &str) -> SourceResult<Vec<NetworkRaw>> {
        self.record("list_networks", datacenter)?;
        Ok(self.inventory(datacenter).networks.clone())
    }

    async fn close(&self) {
        self.source.closes.fetch_add(1, Ordering::SeqCst);
    }
}
