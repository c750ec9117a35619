// Inventory from a JSON document on disk (offline runs, demos, tests).
// The document is re-read on every connect so each poll cycle sees the current file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::instrument;

use crate::models::{
    ClusterRaw, DatacenterInventory, DatacenterRaw, DatastoreRaw, HostRaw, NetworkRaw, VmRaw,
};
use crate::source::{InventorySession, InventorySource, SourceError, SourceResult};

/// Top-level shape of an inventory file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryDocument {
    #[serde(default)]
    pub datacenters: Vec<DatacenterDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatacenterDocument {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub inventory: DatacenterInventory,
}

pub struct FileRepo {
    path: PathBuf,
}

impl FileRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl InventorySource for FileRepo {
    #[instrument(skip(self), fields(repo = "file", path = %self.path.display()))]
    async fn connect(&self) -> SourceResult<Box<dyn InventorySession>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::io(format!("{}: {e}", self.path.display())))?;
        let document: InventoryDocument = serde_json::from_str(&raw)?;
        Ok(Box::new(FileSession { document }))
    }
}

struct FileSession {
    document: InventoryDocument,
}

impl FileSession {
    fn datacenter(&self, id: &str) -> SourceResult<&DatacenterInventory> {
        self.document
            .datacenters
            .iter()
            .find(|dc| dc.id == id)
            .map(|dc| &dc.inventory)
            .ok_or_else(|| SourceError::other(format!("Unknown datacenter {id:?}")))
    }
}

#[async_trait]
impl InventorySession for FileSession {
    async fn list_datacenters(&self) -> SourceResult<Vec<DatacenterRaw>> {
        Ok(self
            .document
            .datacenters
            .iter()
            .map(|dc| DatacenterRaw {
                id: dc.id.clone(),
                name: dc.name.clone(),
            })
            .collect())
    }

    async fn list_datastores(&self, datacenter: &str) -> SourceResult<Vec<DatastoreRaw>> {
        Ok(self.datacenter(datacenter)?.datastores.clone())
    }

    async fn list_clusters(&self, datacenter: &str) -> SourceResult<Vec<ClusterRaw>> {
        Ok(self.datacenter(datacenter)?.clusters.clone())
    }

    async fn list_hosts(&self, datacenter: &str) -> SourceResult<Vec<HostRaw>> {
        Ok(self.datacenter(datacenter)?.hosts.clone())
    }

    async fn list_vms(&self, datacenter: &str) -> SourceResult<Vec<VmRaw>> {
        Ok(self.datacenter(datacenter)?.vms.clone())
    }

    async fn list_networks(&self, datacenter: &str) -> SourceResult<Vec<NetworkRaw>> {
        Ok(self.datacenter(datacenter)?.networks.clone())
    }

    async fn close(&self) {}
}
