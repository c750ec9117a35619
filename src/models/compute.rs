// Hosts and virtual machines after correlation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PowerState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub name: String,
    /// Owning cluster name; empty when no cluster claims this host.
    pub cluster: String,
    pub power_state: PowerState,
    pub boot_time: Option<DateTime<Utc>>,
    pub ncpu: u32,
    /// Physical memory in bytes.
    pub memory: u64,
    pub collected: DateTime<Utc>,
    pub datacenter: String,
    /// Number of payload VMs placed on this host.
    pub vms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachine {
    pub id: String,
    pub name: String,
    pub host_id: String,
    pub host_name: String,
    pub cluster: String,
    pub datastore_id: String,
    pub datastore_name: String,
    pub power_state: PowerState,
    pub boot_time: Option<DateTime<Utc>>,
    pub ncpu: u32,
    /// Configured memory in MB.
    pub memory: u64,
    /// Committed + uncommitted bytes summed over every datastore the VM uses.
    pub storage: u64,
    pub ip: Option<String>,
    pub collected: DateTime<Utc>,
    pub datacenter: String,
}
