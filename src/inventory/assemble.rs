// Merge per-datacenter results into one payload; fail fast on the first error.

use crate::models::Payload;

use super::{DatacenterResult, SkippedVm};

/// A full cycle's payload plus the skip events gathered on the way.
#[derive(Debug, Clone, Default)]
pub struct Assembled {
    pub payload: Payload,
    pub skipped: Vec<SkippedVm>,
}

/// Concatenates results in datacenter order. Any `Err` aborts: no partial payload.
pub fn assemble<E>(
    results: impl IntoIterator<Item = Result<DatacenterResult, E>>,
) -> Result<Assembled, E> {
    let mut out = Assembled::default();
    for result in results {
        let DatacenterResult {
            hosts,
            datastores,
            vms,
            networks,
            skipped,
        } = result?;
        out.payload.hosts.extend(hosts);
        out.payload.data_stores.extend(datastores);
        out.payload.vms.extend(vms);
        out.payload.networks.extend(networks);
        out.skipped.extend(skipped);
    }
    Ok(out)
}
