// vCenter inventory via the vSphere Automation REST API

mod client;
mod wire;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt, stream};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::instrument;
use url::Url;

use crate::config::EndpointConfig;
use crate::models::{ClusterRaw, DatacenterRaw, DatastoreRaw, HostRaw, NetworkRaw, VmRaw};
use crate::source::{InventorySession, InventorySource, SourceError, SourceResult};
use client::VsphereClient;
use wire::{
    ClusterSummary, DatacenterSummary, DatastoreSummary, GuestIdentity, HostSummary,
    NetworkSummary, VmInfo, VmSummary,
};

/// Max per-VM detail requests in flight at once.
const VM_DETAIL_CONCURRENCY: usize = 8;

/// Connection settings for one vCenter. The address is only parsed on connect,
/// so a bad address fails the poll cycle rather than startup.
#[derive(Debug, Clone)]
pub struct VsphereRepo {
    address: String,
    username: Option<String>,
    password: Option<String>,
    insecure: bool,
    timeout_secs: u64,
}

impl VsphereRepo {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            username: None,
            password: None,
            insecure: false,
            timeout_secs: 30,
        }
    }

    pub fn from_config(endpoint: &EndpointConfig) -> Self {
        Self {
            address: endpoint.url.clone().unwrap_or_default(),
            username: endpoint.username.clone(),
            password: endpoint.password.clone(),
            insecure: endpoint.insecure,
            timeout_secs: endpoint.timeout_secs,
        }
    }

    /// Parses the address and splits off embedded credentials; explicit ones win.
    fn resolve_address(&self) -> SourceResult<(Url, String, String)> {
        let mut url = Url::parse(&self.address)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SourceError::address(format!(
                "Unsupported scheme {:?} in endpoint address",
                url.scheme()
            )));
        }
        let username = self
            .username
            .clone()
            .or_else(|| Some(url.username().to_string()).filter(|u| !u.is_empty()))
            .ok_or_else(|| SourceError::auth("No username configured for endpoint"))?;
        let password = self
            .password
            .clone()
            .or_else(|| url.password().map(str::to_string))
            .unwrap_or_default();
        // Both setters only fail for cannot-be-a-base URLs, excluded by the scheme check.
        let _ = url.set_username("");
        let _ = url.set_password(None);
        Ok((url, username, password))
    }
}

#[async_trait]
impl InventorySource for VsphereRepo {
    #[instrument(skip(self), fields(repo = "vsphere", operation = "connect"))]
    async fn connect(&self) -> SourceResult<Box<dyn InventorySession>> {
        let (url, username, password) = self.resolve_address()?;
        let mut client = VsphereClient::new(url, self.insecure, self.timeout_secs)?;
        client.login(&username, &password).await?;
        Ok(Box::new(VsphereSession {
            client,
            cache: Mutex::new(HashMap::new()),
        }))
    }
}

/// One authenticated vCenter session, scoped to a single poll cycle.
struct VsphereSession {
    client: VsphereClient,
    /// Per-datacenter lists reused across the cycle's list calls.
    cache: Mutex<HashMap<String, DatacenterCache>>,
}

#[derive(Default)]
struct DatacenterCache {
    hosts: Option<Vec<HostSummary>>,
    datastores: Option<Vec<DatastoreSummary>>,
    /// network id → attached host ids, filled by `list_vms`.
    network_hosts: HashMap<String, Vec<String>>,
}

impl VsphereSession {
    fn cache(&self) -> SourceResult<MutexGuard<'_, HashMap<String, DatacenterCache>>> {
        self.cache
            .lock()
            .map_err(|e| SourceError::other(format!("session cache lock poisoned: {e}")))
    }

    async fn datastores(&self, datacenter: &str) -> SourceResult<Vec<DatastoreSummary>> {
        let cached = self
            .cache()?
            .get(datacenter)
            .and_then(|c| c.datastores.clone());
        if let Some(cached) = cached {
            return Ok(cached);
        }
        let datastores: Vec<DatastoreSummary> = self
            .client
            .get("/api/vcenter/datastore", &[("datacenters", datacenter)])
            .await?;
        self.cache()?
            .entry(datacenter.to_string())
            .or_default()
            .datastores = Some(datastores.clone());
        Ok(datastores)
    }

    async fn hosts(&self, datacenter: &str) -> SourceResult<Vec<HostSummary>> {
        let cached = self.cache()?.get(datacenter).and_then(|c| c.hosts.clone());
        if let Some(cached) = cached {
            return Ok(cached);
        }
        let hosts: Vec<HostSummary> = self
            .client
            .get("/api/vcenter/host", &[("datacenters", datacenter)])
            .await?;
        self.cache()?.entry(datacenter.to_string()).or_default().hosts = Some(hosts.clone());
        Ok(hosts)
    }

    /// vm id → host id, from one filtered VM list per host.
    async fn vm_placement(&self, hosts: &[HostSummary]) -> SourceResult<HashMap<String, String>> {
        let mut placement = HashMap::new();
        for host in hosts {
            let on_host: Vec<VmSummary> = self
                .client
                .get("/api/vcenter/vm", &[("hosts", host.host.as_str())])
                .await?;
            for vm in on_host {
                placement.entry(vm.vm).or_insert_with(|| host.host.clone());
            }
        }
        Ok(placement)
    }

    async fn vm_detail(&self, vm: &str) -> SourceResult<(VmInfo, Option<GuestIdentity>)> {
        let info: VmInfo = self
            .client
            .get(&format!("/api/vcenter/vm/{vm}"), &[])
            .await?;
        // Unavailable while VMware Tools is not running; that only means no guest info.
        let guest = self
            .client
            .get::<GuestIdentity>(&format!("/api/vcenter/vm/{vm}/guest/identity"), &[])
            .await
            .ok();
        Ok((info, guest))
    }
}

#[async_trait]
impl InventorySession for VsphereSession {
    #[instrument(skip(self), fields(repo = "vsphere", operation = "list_datacenters"))]
    async fn list_datacenters(&self) -> SourceResult<Vec<DatacenterRaw>> {
        let dcs: Vec<DatacenterSummary> = self.client.get("/api/vcenter/datacenter", &[]).await?;
        Ok(dcs.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(repo = "vsphere", operation = "list_datastores"))]
    async fn list_datastores(&self, datacenter: &str) -> SourceResult<Vec<DatastoreRaw>> {
        let datastores = self.datastores(datacenter).await?;
        Ok(datastores.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(repo = "vsphere", operation = "list_clusters"))]
    async fn list_clusters(&self, datacenter: &str) -> SourceResult<Vec<ClusterRaw>> {
        let clusters: Vec<ClusterSummary> = self
            .client
            .get("/api/vcenter/cluster", &[("datacenters", datacenter)])
            .await?;
        let mut out = Vec::with_capacity(clusters.len());
        for cluster in clusters {
            let members: Vec<HostSummary> = self
                .client
                .get("/api/vcenter/host", &[("clusters", cluster.cluster.as_str())])
                .await?;
            out.push(ClusterRaw {
                name: cluster.name,
                hosts: members.into_iter().map(|h| h.host).collect(),
            });
        }
        Ok(out)
    }

    #[instrument(skip(self), fields(repo = "vsphere", operation = "list_hosts"))]
    async fn list_hosts(&self, datacenter: &str) -> SourceResult<Vec<HostRaw>> {
        let hosts = self.hosts(datacenter).await?;
        Ok(hosts.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(repo = "vsphere", operation = "list_vms"))]
    async fn list_vms(&self, datacenter: &str) -> SourceResult<Vec<VmRaw>> {
        let summaries: Vec<VmSummary> = self
            .client
            .get("/api/vcenter/vm", &[("datacenters", datacenter)])
            .await?;
        let hosts = self.hosts(datacenter).await?;
        let placement = self.vm_placement(&hosts).await?;

        let mut datastore_ids_by_name: HashMap<String, String> = HashMap::new();
        for ds in self.datastores(datacenter).await? {
            datastore_ids_by_name.entry(ds.name).or_insert(ds.datastore);
        }

        let ids: Vec<String> = summaries.iter().map(|s| s.vm.clone()).collect();
        let details: Vec<(VmInfo, Option<GuestIdentity>)> = stream::iter(ids)
            .map(move |id| async move { self.vm_detail(&id).await })
            .buffered(VM_DETAIL_CONCURRENCY)
            .try_collect()
            .await?;

        let mut network_hosts: HashMap<String, Vec<String>> = HashMap::new();
        let mut vms = Vec::with_capacity(summaries.len());
        for (summary, (info, guest)) in summaries.into_iter().zip(details) {
            let host_id = placement.get(&summary.vm).cloned();
            if let Some(host) = host_id.as_deref() {
                for network in wire::nic_networks(&info) {
                    let attached = network_hosts.entry(network).or_default();
                    if !attached.iter().any(|h| h == host) {
                        attached.push(host.to_string());
                    }
                }
            }
            vms.push(wire::build_vm(
                summary,
                &info,
                host_id,
                &datastore_ids_by_name,
                guest.map(Into::into),
            ));
        }

        self.cache()?
            .entry(datacenter.to_string())
            .or_default()
            .network_hosts = network_hosts;

        Ok(vms)
    }

    #[instrument(skip(self), fields(repo = "vsphere", operation = "list_networks"))]
    async fn list_networks(&self, datacenter: &str) -> SourceResult<Vec<NetworkRaw>> {
        let networks: Vec<NetworkSummary> = self
            .client
            .get("/api/vcenter/network", &[("datacenters", datacenter)])
            .await?;
        let mut attached = self
            .cache()?
            .get_mut(datacenter)
            .map(|c| std::mem::take(&mut c.network_hosts))
            .unwrap_or_default();
        Ok(networks
            .into_iter()
            .map(|n| NetworkRaw {
                hosts: attached.remove(&n.network).unwrap_or_default(),
                id: n.network,
                name: n.name,
            })
            .collect())
    }

    async fn close(&self) {
        self.client.logout().await;
    }
}
