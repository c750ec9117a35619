// Inventory models: raw records from a source, correlated records served over HTTP

mod compute;
mod datacenter;
mod network;
mod payload;
mod power;
mod raw;
mod storage;

pub use compute::{Host, VirtualMachine};
pub use datacenter::Datacenter;
pub use network::Network;
pub use payload::Payload;
pub use power::PowerState;
pub use raw::{
    ClusterRaw, DatacenterInventory, DatacenterRaw, DatastoreRaw, DatastoreUsage, GuestInfo,
    HostRaw, NetworkRaw, VmRaw,
};
pub use storage::Datastore;
