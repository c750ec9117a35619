// Host/datastore enrichment: cluster name and datacenter tag.

use crate::models::{Datacenter, Datastore, DatastoreRaw, Host, HostRaw};

use super::MembershipIndex;

/// Turns raw hosts into payload hosts with their cluster resolved (empty when none)
/// and `vms` at zero.
pub fn enrich_hosts(
    hosts: Vec<HostRaw>,
    membership: &MembershipIndex,
    datacenter: &Datacenter,
) -> Vec<Host> {
    hosts
        .into_iter()
        .map(|h| Host {
            cluster: membership.cluster_of(&h.id).unwrap_or_default().to_string(),
            id: h.id,
            name: h.name,
            power_state: h.power_state,
            boot_time: h.boot_time,
            ncpu: h.ncpu,
            memory: h.memory,
            collected: datacenter.collected,
            datacenter: datacenter.name.clone(),
            vms: 0,
        })
        .collect()
}

/// Datastores carry no cluster relationship; only the datacenter tag is stamped.
pub fn enrich_datastores(datastores: Vec<DatastoreRaw>, datacenter: &Datacenter) -> Vec<Datastore> {
    datastores
        .into_iter()
        .map(|d| Datastore {
            id: d.id,
            name: d.name,
            type_: d.type_,
            capacity: d.capacity,
            free: d.free,
            collected: datacenter.collected,
            datacenter: datacenter.name.clone(),
            vms: 0,
        })
        .collect()
}
