// One poll cycle's correlated snapshot

use serde::{Deserialize, Serialize};

use super::{Datastore, Host, Network, VirtualMachine};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub hosts: Vec<Host>,
    pub data_stores: Vec<Datastore>,
    pub vms: Vec<VirtualMachine>,
    #[serde(default)]
    pub networks: Vec<Network>,
}
