// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod file_repo;
pub mod inventory;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod source;
pub mod version;
pub mod vsphere_repo;
