//! Device descriptors and the device catalog
//!
//! A [`DeviceDescriptor`] tells the orchestrator which partitions a supported
//! device has, grouped by [`PartitionCategory`], and which of them exist once
//! per A/B slot. Descriptors are loaded from RON or JSON catalog files by
//! [`DeviceCatalog`] and are immutable afterwards.

mod catalog;
mod types;

pub use catalog::{CatalogError, DeviceCatalog};
pub use types::{DeviceDescriptor, PartitionCategory, PartitionTable, SUPER_IMAGES};
