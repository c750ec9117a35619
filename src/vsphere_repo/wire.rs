// vSphere REST response shapes and their conversion into raw records.

use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{
    DatacenterRaw, DatastoreRaw, DatastoreUsage, GuestInfo, HostRaw, PowerState, VmRaw,
};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DatacenterSummary {
    pub datacenter: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DatastoreSummary {
    pub datastore: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_: Option<String>,
    #[serde(default)]
    pub free_space: Option<u64>,
    #[serde(default)]
    pub capacity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClusterSummary {
    pub cluster: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HostSummary {
    pub host: String,
    pub name: String,
    #[serde(default)]
    pub power_state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VmSummary {
    pub vm: String,
    pub name: String,
    pub power_state: String,
    #[serde(default)]
    pub cpu_count: Option<u32>,
    #[serde(default, rename = "memory_size_MiB")]
    pub memory_size_mib: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NetworkSummary {
    pub network: String,
    pub name: String,
}

/// GET /api/vcenter/vm/{vm}; only the parts the collector reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VmInfo {
    #[serde(default)]
    pub cpu: Option<VmCpu>,
    #[serde(default)]
    pub memory: Option<VmMemory>,
    /// Keyed by device key ("2000", "16000", ...); iterate with `in_device_order`.
    #[serde(default)]
    pub disks: HashMap<String, VmDisk>,
    #[serde(default)]
    pub nics: HashMap<String, VmNic>,
}

/// Devices sorted by numeric device key (SCSI 2000 before SATA 16000).
/// Non-numeric keys sort after numeric ones, by string.
pub(crate) fn in_device_order<T>(devices: &HashMap<String, T>) -> Vec<&T> {
    let mut keyed: Vec<(&String, &T)> = devices.iter().collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let key = |k: &str| match k.parse::<u64>() {
            Ok(n) => (0, n),
            Err(_) => (1, 0),
        };
        key(a.as_str()).cmp(&key(b.as_str())).then_with(|| a.cmp(b))
    });
    keyed.into_iter().map(|(_, device)| device).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VmCpu {
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VmMemory {
    #[serde(default, rename = "size_MiB")]
    pub size_mib: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VmDisk {
    #[serde(default)]
    pub capacity: Option<u64>,
    #[serde(default)]
    pub backing: Option<DiskBacking>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DiskBacking {
    #[serde(default)]
    pub vmdk_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VmNic {
    #[serde(default)]
    pub backing: Option<NicBacking>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NicBacking {
    #[serde(default)]
    pub network: Option<String>,
}

/// GET /api/vcenter/vm/{vm}/guest/identity
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GuestIdentity {
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl From<DatacenterSummary> for DatacenterRaw {
    fn from(s: DatacenterSummary) -> Self {
        DatacenterRaw {
            id: s.datacenter,
            name: s.name,
        }
    }
}

impl From<DatastoreSummary> for DatastoreRaw {
    fn from(s: DatastoreSummary) -> Self {
        DatastoreRaw {
            id: s.datastore,
            name: s.name,
            type_: s.type_.unwrap_or_default(),
            capacity: s.capacity.unwrap_or(0),
            free: s.free_space.unwrap_or(0),
        }
    }
}

/// The REST API exposes no hardware or boot time for hosts.
impl From<HostSummary> for HostRaw {
    fn from(s: HostSummary) -> Self {
        HostRaw {
            id: s.host,
            name: s.name,
            power_state: s
                .power_state
                .as_deref()
                .map(PowerState::from_vsphere)
                .unwrap_or_default(),
            boot_time: None,
            ncpu: 0,
            memory: 0,
        }
    }
}

impl From<GuestIdentity> for GuestInfo {
    fn from(g: GuestIdentity) -> Self {
        GuestInfo {
            ip_address: g.ip_address.filter(|ip| !ip.is_empty()),
        }
    }
}

/// "[datastore1] vm-01/vm-01.vmdk" → "datastore1"
pub(crate) fn datastore_name_from_vmdk(path: &str) -> Option<&str> {
    let rest = path.trim_start().strip_prefix('[')?;
    let end = rest.find(']')?;
    let name = rest[..end].trim();
    (!name.is_empty()).then_some(name)
}

/// Datastore ids a VM's disks live on (disk order, deduplicated) and the disk
/// capacity per datastore, reported as committed space.
pub(crate) fn disk_placement(
    info: &VmInfo,
    datastore_ids_by_name: &HashMap<String, String>,
) -> (Vec<String>, Vec<DatastoreUsage>) {
    let mut refs: Vec<String> = Vec::new();
    let mut usage: Vec<DatastoreUsage> = Vec::new();
    for disk in in_device_order(&info.disks) {
        let Some(id) = disk
            .backing
            .as_ref()
            .and_then(|b| b.vmdk_file.as_deref())
            .and_then(datastore_name_from_vmdk)
            .and_then(|name| datastore_ids_by_name.get(name))
        else {
            continue;
        };
        let capacity = disk.capacity.unwrap_or(0);
        match refs.iter().position(|r| r == id) {
            Some(i) => usage[i].committed = usage[i].committed.saturating_add(capacity),
            None => {
                refs.push(id.clone());
                usage.push(DatastoreUsage {
                    datastore: id.clone(),
                    committed: capacity,
                    uncommitted: 0,
                });
            }
        }
    }
    (refs, usage)
}

/// Network ids the VM's NICs are backed by, in device order.
pub(crate) fn nic_networks(info: &VmInfo) -> Vec<String> {
    in_device_order(&info.nics)
        .into_iter()
        .filter_map(|n| n.backing.as_ref().and_then(|b| b.network.clone()))
        .collect()
}

pub(crate) fn build_vm(
    summary: VmSummary,
    info: &VmInfo,
    host_id: Option<String>,
    datastore_ids_by_name: &HashMap<String, String>,
    guest: Option<GuestInfo>,
) -> VmRaw {
    let (datastores, storage_usage) = disk_placement(info, datastore_ids_by_name);
    VmRaw {
        power_state: PowerState::from_vsphere(&summary.power_state),
        boot_time: None,
        ncpu: info
            .cpu
            .as_ref()
            .and_then(|c| c.count)
            .or(summary.cpu_count)
            .unwrap_or(0),
        memory_mb: info
            .memory
            .as_ref()
            .and_then(|m| m.size_mib)
            .or(summary.memory_size_mib)
            .unwrap_or(0),
        id: summary.vm,
        name: summary.name,
        host_id,
        datastores,
        storage_usage,
        guest,
    }
}
