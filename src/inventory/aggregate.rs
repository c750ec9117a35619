// VM counters per host and per datastore. Runs only on already-filtered VMs.

use std::collections::HashMap;

use crate::models::{Datastore, Host, VirtualMachine};

/// Increments `vms` on the host and the datastore each VM references, once per VM.
/// With duplicate ids the first record receives the count, matching correlation.
pub fn apply_counts(vms: &[VirtualMachine], hosts: &mut [Host], datastores: &mut [Datastore]) {
    let host_pos = first_position(hosts.iter().map(|h| h.id.as_str()));
    let datastore_pos = first_position(datastores.iter().map(|d| d.id.as_str()));

    let mut host_counts = vec![0u32; hosts.len()];
    let mut datastore_counts = vec![0u32; datastores.len()];
    for vm in vms {
        if let Some(&i) = host_pos.get(vm.host_id.as_str()) {
            host_counts[i] += 1;
        }
        if let Some(&i) = datastore_pos.get(vm.datastore_id.as_str()) {
            datastore_counts[i] += 1;
        }
    }

    for (host, n) in hosts.iter_mut().zip(host_counts) {
        host.vms += n;
    }
    for (datastore, n) in datastores.iter_mut().zip(datastore_counts) {
        datastore.vms += n;
    }
}

fn first_position<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut map = HashMap::new();
    for (i, id) in ids.enumerate() {
        map.entry(id).or_insert(i);
    }
    map
}
