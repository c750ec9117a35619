// VM correlation: resolve host and primary datastore, drop what cannot be resolved.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Datacenter, Datastore, Host, VirtualMachine, VmRaw};

/// Why a VM was left out of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    HostNotFound,
    NoDatastoreReference,
    DatastoreNotFound,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::HostNotFound => "host_not_found",
            SkipReason::NoDatastoreReference => "no_datastore_reference",
            SkipReason::DatastoreNotFound => "datastore_not_found",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One excluded VM. `reference` is the id that failed to resolve, if there was one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedVm {
    pub id: String,
    pub name: String,
    pub datacenter: String,
    pub reason: SkipReason,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VmCorrelation {
    pub vms: Vec<VirtualMachine>,
    pub skipped: Vec<SkippedVm>,
}

/// Resolves every raw VM against `hosts` and `datastores` of the same datacenter.
/// Output keeps input order.
pub fn correlate_vms(
    raw_vms: Vec<VmRaw>,
    hosts: &[Host],
    datastores: &[Datastore],
    datacenter: &Datacenter,
) -> VmCorrelation {
    let hosts_by_id = first_by_id(hosts.iter().map(|h| (h.id.as_str(), h)));
    let datastores_by_id = first_by_id(datastores.iter().map(|d| (d.id.as_str(), d)));

    let mut out = VmCorrelation {
        vms: Vec::with_capacity(raw_vms.len()),
        skipped: Vec::new(),
    };

    for vm in raw_vms {
        match resolve(&vm, &hosts_by_id, &datastores_by_id) {
            Ok((host, datastore)) => out.vms.push(build_vm(vm, host, datastore, datacenter)),
            Err((reason, reference)) => {
                debug!(
                    vm_id = %vm.id,
                    vm_name = %vm.name,
                    datacenter = %datacenter.name,
                    reason = %reason,
                    reference = reference.as_deref().unwrap_or(""),
                    "VM excluded from payload"
                );
                out.skipped.push(SkippedVm {
                    id: vm.id,
                    name: vm.name,
                    datacenter: datacenter.name.clone(),
                    reason,
                    reference,
                });
            }
        }
    }

    out
}

fn first_by_id<'a, T>(items: impl Iterator<Item = (&'a str, &'a T)>) -> HashMap<&'a str, &'a T> {
    let mut map = HashMap::new();
    for (id, item) in items {
        map.entry(id).or_insert(item);
    }
    map
}

fn resolve<'a>(
    vm: &VmRaw,
    hosts: &HashMap<&str, &'a Host>,
    datastores: &HashMap<&str, &'a Datastore>,
) -> Result<(&'a Host, &'a Datastore), (SkipReason, Option<String>)> {
    let host = vm
        .host_id
        .as_deref()
        .and_then(|id| hosts.get(id).copied())
        .ok_or_else(|| (SkipReason::HostNotFound, vm.host_id.clone()))?;

    let primary = vm
        .datastores
        .first()
        .ok_or((SkipReason::NoDatastoreReference, None))?;

    let datastore = datastores
        .get(primary.as_str())
        .copied()
        .ok_or_else(|| (SkipReason::DatastoreNotFound, Some(primary.clone())))?;

    Ok((host, datastore))
}

fn build_vm(vm: VmRaw, host: &Host, datastore: &Datastore, datacenter: &Datacenter) -> VirtualMachine {
    // Summed over every usage entry, not just the primary datastore.
    let storage = vm
        .storage_usage
        .iter()
        .map(|u| u.committed.saturating_add(u.uncommitted))
        .fold(0u64, u64::saturating_add);

    VirtualMachine {
        id: vm.id,
        name: vm.name,
        host_id: host.id.clone(),
        host_name: host.name.clone(),
        cluster: host.cluster.clone(),
        datastore_id: datastore.id.clone(),
        datastore_name: datastore.name.clone(),
        power_state: vm.power_state,
        boot_time: vm.boot_time,
        ncpu: vm.ncpu,
        memory: vm.memory_mb,
        storage,
        ip: vm.guest.and_then(|g| g.ip_address),
        collected: datacenter.collected,
        datacenter: datacenter.name.clone(),
    }
}
