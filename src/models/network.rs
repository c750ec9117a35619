// Network (port group) with its resolved cluster

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    /// Cluster of the first attached host that belongs to one; empty otherwise.
    pub cluster: String,
    pub datacenter: String,
}
