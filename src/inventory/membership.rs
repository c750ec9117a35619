// Cluster membership index: cluster name → host ids it owns.

use std::collections::{HashMap, HashSet};

use crate::models::ClusterRaw;

/// Built fresh per datacenter from the cluster list; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    /// Clusters in input order; never contains an empty host set.
    clusters: Vec<(String, HashSet<String>)>,
    /// host id → position in `clusters` of the first cluster claiming it.
    by_host: HashMap<String, usize>,
}

impl MembershipIndex {
    /// Clusters without hosts are dropped. A repeated cluster name is merged into
    /// its first occurrence.
    pub fn build(clusters: &[ClusterRaw]) -> Self {
        let mut ordered: Vec<(String, HashSet<String>)> = Vec::with_capacity(clusters.len());
        let mut position: HashMap<&str, usize> = HashMap::with_capacity(clusters.len());

        for cluster in clusters.iter().filter(|c| !c.hosts.is_empty()) {
            match position.get(cluster.name.as_str()) {
                Some(&i) => ordered[i].1.extend(cluster.hosts.iter().cloned()),
                None => {
                    position.insert(cluster.name.as_str(), ordered.len());
                    ordered.push((cluster.name.clone(), cluster.hosts.iter().cloned().collect()));
                }
            }
        }

        let mut by_host = HashMap::new();
        for (i, (_, hosts)) in ordered.iter().enumerate() {
            for host in hosts {
                by_host.entry(host.clone()).or_insert(i);
            }
        }

        Self {
            clusters: ordered,
            by_host,
        }
    }

    /// Name of the first cluster (input order) whose host set contains `host_id`.
    pub fn cluster_of(&self, host_id: &str) -> Option<&str> {
        self.by_host
            .get(host_id)
            .map(|&i| self.clusters[i].0.as_str())
    }

    /// Indexed cluster names in input order.
    pub fn cluster_names(&self) -> impl Iterator<Item = &str> {
        self.clusters.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
