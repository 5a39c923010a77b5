//! Device catalog for runtime loading and lookup
//!
//! Device descriptors are loaded from RON or JSON files:
//!
//! ```ron
//! (
//!     devices: [
//!         (
//!             model: "Pixel 7",
//!             board: Some("panther"),
//!             partitions: {
//!                 "boot": ["boot", "dtbo", "init_boot"],
//!                 "vbmeta": ["vbmeta", "vbmeta_system"],
//!                 "logical": ["system", "vendor", "product"],
//!                 "firmware": ["bootloader", "radio"],
//!             },
//!             slot_specific: ["dtbo", "vbmeta_system"],
//!         ),
//!     ],
//! )
//! ```
//!
//! The JSON layout is the same with `{"devices": [...]}` at the top level.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use super::types::{DeviceDescriptor, PartitionCategory, PartitionTable};

/// Error type for device catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// I/O error reading files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// RON parsing error
    #[error("parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// JSON parsing error
    #[error("parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// File extension is neither `.ron` nor `.json`
    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(String),
    /// Validation error
    #[error("validation error: {0}")]
    Validation(String),
    /// A file inside a catalog directory failed to load
    #[error("{path}: {source}")]
    File {
        /// Path of the offending file
        path: String,
        /// What went wrong
        #[source]
        source: Box<CatalogError>,
    },
}

// ============================================================================
// Deserialization types (intermediate format)
// ============================================================================

/// Device definition as written in catalog files
#[derive(Debug, Clone, serde::Deserialize)]
struct DeviceDef {
    #[serde(alias = "name")]
    model: String,
    #[serde(default)]
    board: Option<String>,
    #[serde(default)]
    partitions: HashMap<String, Vec<String>>,
    #[serde(default)]
    slot_specific: Vec<String>,
}

/// Catalog file root
#[derive(Debug, Clone, serde::Deserialize)]
struct CatalogDef {
    devices: Vec<DeviceDef>,
}

impl TryFrom<DeviceDef> for DeviceDescriptor {
    type Error = CatalogError;

    fn try_from(def: DeviceDef) -> Result<Self, Self::Error> {
        let model = def.model.trim().to_string();
        if model.is_empty() {
            return Err(CatalogError::Validation("device with empty model name".into()));
        }

        let mut partitions = PartitionTable::new();
        for (key, names) in def.partitions {
            let category = PartitionCategory::from_key(&key).ok_or_else(|| {
                CatalogError::Validation(format!(
                    "{}: unknown partition category '{}'",
                    model, key
                ))
            })?;

            if category == PartitionCategory::Super {
                log::warn!(
                    "{}: ignoring configured super partitions, super images are fixed",
                    model
                );
                continue;
            }

            let mut seen = BTreeSet::new();
            for name in &names {
                if name.trim().is_empty() {
                    return Err(CatalogError::Validation(format!(
                        "{}: empty partition name in '{}'",
                        model, key
                    )));
                }
                if !seen.insert(name.as_str()) {
                    return Err(CatalogError::Validation(format!(
                        "{}: duplicate partition '{}' in '{}'",
                        model, name, key
                    )));
                }
            }

            partitions.set(category, names);
        }

        Ok(DeviceDescriptor {
            model,
            board: def
                .board
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
            partitions,
            slot_specific: def.slot_specific.into_iter().collect(),
        })
    }
}

// ============================================================================
// Device catalog
// ============================================================================

/// Runtime device catalog
///
/// Holds the supported device descriptors in load order.
#[derive(Debug, Clone, Default)]
pub struct DeviceCatalog {
    devices: Vec<DeviceDescriptor>,
}

impl DeviceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Create a catalog from a single file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        catalog.load_file(path.as_ref())?;
        Ok(catalog)
    }

    /// Load devices from a single `.ron` or `.json` file
    pub fn load_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => self.load_ron(&content),
            Some("json") => self.load_json(&content),
            _ => Err(CatalogError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load devices from a RON string
    pub fn load_ron(&mut self, content: &str) -> Result<usize, CatalogError> {
        let def: CatalogDef = ron::from_str(content)?;
        self.add_defs(def.devices)
    }

    /// Load devices from a JSON string
    pub fn load_json(&mut self, content: &str) -> Result<usize, CatalogError> {
        let def: CatalogDef = serde_json::from_str(content)?;
        self.add_defs(def.devices)
    }

    /// Load all `.ron` and `.json` files from a directory
    ///
    /// Either every file loads or the catalog is left as it was.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, CatalogError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        paths.sort();

        let before = self.devices.len();
        let mut total = 0;
        for path in paths {
            if path
                .extension()
                .is_some_and(|ext| ext == "ron" || ext == "json")
            {
                match self.load_file(&path) {
                    Ok(count) => total += count,
                    Err(e) => {
                        self.devices.truncate(before);
                        return Err(CatalogError::File {
                            path: path.display().to_string(),
                            source: Box::new(e),
                        });
                    }
                }
            }
        }

        Ok(total)
    }

    fn add_defs(&mut self, defs: Vec<DeviceDef>) -> Result<usize, CatalogError> {
        let before = self.devices.len();
        let count = defs.len();
        for def in defs {
            if let Err(e) = self.add_def(def) {
                self.devices.truncate(before);
                return Err(e);
            }
        }
        Ok(count)
    }

    fn add_def(&mut self, def: DeviceDef) -> Result<(), CatalogError> {
        let device = DeviceDescriptor::try_from(def)?;
        if self.find(&device.model).is_some() {
            return Err(CatalogError::Validation(format!(
                "duplicate device '{}'",
                device.model
            )));
        }
        self.devices.push(device);
        Ok(())
    }

    /// Add a single descriptor
    pub fn push(&mut self, device: DeviceDescriptor) {
        self.devices.push(device);
    }

    /// Get all devices in the catalog
    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    /// Get the number of devices in the catalog
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Find a device by model name (case-insensitive exact match)
    pub fn find(&self, model: &str) -> Option<&DeviceDescriptor> {
        self.devices
            .iter()
            .find(|d| d.model.eq_ignore_ascii_case(model.trim()))
    }

    /// Iterate over all devices
    pub fn iter(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RON: &str = r#"
    (
        devices: [
            (
                model: "Pixel 7",
                board: Some("panther"),
                partitions: {
                    "boot": ["boot", "dtbo", "init_boot"],
                    "vbmeta": ["vbmeta", "vbmeta_system"],
                    "logical": ["system", "vendor"],
                    "firmware": ["bootloader", "radio"],
                },
                slot_specific: ["dtbo", "vbmeta_system"],
            ),
            (
                model: "Nothing Phone (2a)",
                partitions: {
                    "boot": ["boot"],
                },
            ),
        ],
    )
    "#;

    #[test]
    fn test_load_ron() {
        let mut catalog = DeviceCatalog::new();
        let count = catalog.load_ron(RON).unwrap();

        assert_eq!(count, 2);
        let pixel = catalog.find("pixel 7").unwrap();
        assert_eq!(pixel.board.as_deref(), Some("panther"));
        assert_eq!(
            pixel.partitions(PartitionCategory::Boot),
            vec!["boot", "dtbo", "init_boot"]
        );
        assert!(pixel.is_slot_specific("dtbo"));
        assert!(!pixel.is_slot_specific("boot"));

        let phone = catalog.find("Nothing Phone (2a)").unwrap();
        assert_eq!(phone.board, None);
        assert!(phone.partitions(PartitionCategory::Logical).is_empty());
    }

    #[test]
    fn test_load_json_devices_layout() {
        let json = r#"{
            "devices": [
                {
                    "model": "Moto G84",
                    "board": "rhodep",
                    "partitions": {
                        "boot": ["boot", "vendor_boot"],
                        "firmware": ["modem"]
                    },
                    "slot_specific": ["vendor_boot"]
                }
            ]
        }"#;

        let mut catalog = DeviceCatalog::new();
        assert_eq!(catalog.load_json(json).unwrap(), 1);
        let moto = catalog.find("moto g84").unwrap();
        assert_eq!(moto.partitions(PartitionCategory::Firmware), vec!["modem"]);
        assert!(moto.is_slot_specific("vendor_boot"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let json = r#"{"devices": [{"model": "X", "partitions": {"radio": ["modem"]}}]}"#;
        let err = DeviceCatalog::new().load_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_duplicate_partition_rejected() {
        let json = r#"{"devices": [{"model": "X", "partitions": {"boot": ["boot", "boot"]}}]}"#;
        let err = DeviceCatalog::new().load_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate partition"));
    }

    #[test]
    fn test_duplicate_device_rejected() {
        let json = r#"{"devices": [{"model": "X"}, {"model": "x"}]}"#;
        let err = DeviceCatalog::new().load_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate device"));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("google.ron"), RON).unwrap();
        fs::write(
            dir.path().join("moto.json"),
            r#"{"devices": [{"model": "Moto G84"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.txt"), "not a catalog").unwrap();

        let mut catalog = DeviceCatalog::new();
        assert_eq!(catalog.load_dir(dir.path()).unwrap(), 3);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_load_dir_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"devices": [{"model": "Moto G84"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"devices": [{"model": "X", "partitions": {"radio": ["modem"]}}]}"#,
        )
        .unwrap();

        let mut catalog = DeviceCatalog::new();
        let err = catalog.load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("b.json"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_failed_file_keeps_earlier_devices() {
        let mut catalog = DeviceCatalog::new();
        catalog.load_ron(RON).unwrap();

        let json = r#"{"devices": [{"model": "Moto G84"}, {"model": "Pixel 7"}]}"#;
        assert!(catalog.load_json(json).is_err());
        assert_eq!(catalog.len(), 2);
        assert!(catalog.find("Moto G84").is_none());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.yaml");
        fs::write(&path, "devices: []").unwrap();
        assert!(matches!(
            DeviceCatalog::from_file(&path),
            Err(CatalogError::UnsupportedFormat(_))
        ));
    }
}
