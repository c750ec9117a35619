// Datastore after enrichment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datastore {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub capacity: u64,
    pub free: u64,
    pub collected: DateTime<Utc>,
    pub datacenter: String,
    /// Number of payload VMs whose primary datastore is this one.
    pub vms: u32,
}
