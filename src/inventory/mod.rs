// Correlation engine: joins independently fetched raw lists into one snapshot.
// Pure functions over in-memory collections; no I/O and no state between calls.

mod aggregate;
mod assemble;
mod correlate;
mod enrich;
mod membership;
mod network;

pub use aggregate::apply_counts;
pub use assemble::{Assembled, assemble};
pub use correlate::{SkipReason, SkippedVm, VmCorrelation, correlate_vms};
pub use enrich::{enrich_datastores, enrich_hosts};
pub use membership::MembershipIndex;
pub use network::correlate_networks;

use crate::models::{Datacenter, DatacenterInventory, Datastore, Host, Network, VirtualMachine};

/// Correlated output for a single datacenter.
#[derive(Debug, Clone, Default)]
pub struct DatacenterResult {
    pub hosts: Vec<Host>,
    pub datastores: Vec<Datastore>,
    pub vms: Vec<VirtualMachine>,
    pub networks: Vec<Network>,
    pub skipped: Vec<SkippedVm>,
}

/// Runs membership → enrichment → VM correlation → counts → networks for one datacenter.
pub fn correlate_datacenter(
    datacenter: &Datacenter,
    inventory: DatacenterInventory,
) -> DatacenterResult {
    let DatacenterInventory {
        datastores,
        clusters,
        hosts,
        vms,
        networks,
    } = inventory;

    let membership = MembershipIndex::build(&clusters);
    tracing::debug!(
        datacenter = %datacenter.name,
        clusters = membership.len(),
        hosts = hosts.len(),
        vms = vms.len(),
        "correlating datacenter"
    );
    let mut hosts = enrich_hosts(hosts, &membership, datacenter);
    let mut datastores = enrich_datastores(datastores, datacenter);

    let VmCorrelation { vms, skipped } = correlate_vms(vms, &hosts, &datastores, datacenter);
    apply_counts(&vms, &mut hosts, &mut datastores);

    let networks = correlate_networks(networks, &membership, datacenter);

    DatacenterResult {
        hosts,
        datastores,
        vms,
        networks,
        skipped,
    }
}
