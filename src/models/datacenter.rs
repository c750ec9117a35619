// Datacenter: root scope of one collection pass

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datacenter {
    /// Source-side reference used to scope per-datacenter fetches (e.g. "datacenter-21").
    pub id: String,
    pub name: String,
    pub collected: DateTime<Utc>,
}
