// Raw records as returned by an inventory source, before correlation.
// Deserializable so a JSON inventory file can carry them verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PowerState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatacenterRaw {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatastoreRaw {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub capacity: u64,
    #[serde(default)]
    pub free: u64,
}

/// Cluster membership: the host ids a cluster owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRaw {
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRaw {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub power_state: PowerState,
    #[serde(default)]
    pub boot_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ncpu: u32,
    #[serde(default)]
    pub memory: u64,
}

/// Space a VM consumes on one datastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatastoreUsage {
    pub datastore: String,
    #[serde(default)]
    pub committed: u64,
    #[serde(default)]
    pub uncommitted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestInfo {
    #[serde(default)]
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmRaw {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub power_state: PowerState,
    #[serde(default)]
    pub boot_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ncpu: u32,
    #[serde(default)]
    pub memory_mb: u64,
    /// Host the VM runs on; absent when the source reports no placement.
    #[serde(default)]
    pub host_id: Option<String>,
    /// Datastore references in source order; the first one is the primary.
    #[serde(default)]
    pub datastores: Vec<String>,
    #[serde(default)]
    pub storage_usage: Vec<DatastoreUsage>,
    /// Present only when guest information is available.
    #[serde(default)]
    pub guest: Option<GuestInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRaw {
    pub id: String,
    pub name: String,
    /// Attached host ids in source order.
    #[serde(default)]
    pub hosts: Vec<String>,
}

/// Everything fetched for one datacenter, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatacenterInventory {
    #[serde(default)]
    pub datastores: Vec<DatastoreRaw>,
    #[serde(default)]
    pub clusters: Vec<ClusterRaw>,
    #[serde(default)]
    pub hosts: Vec<HostRaw>,
    #[serde(default)]
    pub vms: Vec<VmRaw>,
    #[serde(default)]
    pub networks: Vec<NetworkRaw>,
}
