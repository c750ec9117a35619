// Network → cluster resolution through attached hosts.

use crate::models::{Datacenter, Network, NetworkRaw};

use super::MembershipIndex;

/// The first attached host (in order) that belongs to a cluster decides the
/// network's cluster; empty when none does.
pub fn correlate_networks(
    networks: Vec<NetworkRaw>,
    membership: &MembershipIndex,
    datacenter: &Datacenter,
) -> Vec<Network> {
    networks
        .into_iter()
        .map(|n| Network {
            cluster: n
                .hosts
                .iter()
                .find_map(|h| membership.cluster_of(h))
                .unwrap_or_default()
                .to_string(),
            id: n.id,
            name: n.name,
            datacenter: datacenter.name.clone(),
        })
        .collect()
}
