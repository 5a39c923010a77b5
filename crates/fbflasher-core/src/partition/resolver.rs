//! Image file resolution

use std::path::{Path, PathBuf};

/// File name of the image for a partition (`<name>.img`)
pub fn image_file_name(partition: &str) -> String {
    format!("{}.img", partition)
}

/// Path of the image for a partition inside `dir`
pub fn image_path(dir: &Path, partition: &str) -> PathBuf {
    dir.join(image_file_name(partition))
}

/// Found/missing split of a configured partition list
///
/// Both lists keep the order of the configured list. Their union is the
/// configured list and they never share an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Partitions whose image exists
    pub found: Vec<String>,
    /// Partitions whose image is absent
    pub missing: Vec<String>,
}

impl Resolution {
    /// Number of configured partitions
    pub fn expected(&self) -> usize {
        self.found.len() + self.missing.len()
    }

    /// True when the configured list itself was empty
    ///
    /// Such a category has nothing missing and nothing to flash. Callers must
    /// not report it as a deficiency.
    pub fn is_unconfigured(&self) -> bool {
        self.expected() == 0
    }

    /// True when every configured image is present
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Split `partitions` into those with an image in `dir` and those without
///
/// Only regular files count as present. The result is computed from the
/// filesystem on every call.
pub fn resolve<S: AsRef<str>>(partitions: &[S], dir: &Path) -> Resolution {
    let mut resolution = Resolution::default();
    for name in partitions {
        let name = name.as_ref();
        if image_path(dir, name).is_file() {
            resolution.found.push(name.to_string());
        } else {
            resolution.missing.push(name.to_string());
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(image_path(dir, name), b"img").unwrap();
        }
    }

    #[test]
    fn test_split_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["dtbo", "boot", "vendor_boot"]);

        let list = ["boot", "init_boot", "dtbo", "recovery", "vendor_boot"];
        let res = resolve(&list, dir.path());

        assert_eq!(res.found, vec!["boot", "dtbo", "vendor_boot"]);
        assert_eq!(res.missing, vec!["init_boot", "recovery"]);
        assert_eq!(res.expected(), list.len());
        assert!(!res.is_complete());
    }

    #[test]
    fn test_partition_covers_input() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a", "c"]);

        let list = ["a", "b", "c", "d"];
        let res = resolve(&list, dir.path());

        for name in list {
            let in_found = res.found.iter().any(|n| n == name);
            let in_missing = res.missing.iter().any(|n| n == name);
            assert!(in_found ^ in_missing, "{} must be in exactly one set", name);
        }
    }

    #[test]
    fn test_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let res = resolve::<&str>(&[], dir.path());
        assert!(res.found.is_empty());
        assert!(res.missing.is_empty());
        assert!(res.is_unconfigured());
        assert!(res.is_complete());
    }

    #[test]
    fn test_directory_is_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("boot.img")).unwrap();
        let res = resolve(&["boot"], dir.path());
        assert_eq!(res.missing, vec!["boot"]);
    }

    #[test]
    fn test_recomputed_each_call() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(&["radio"], dir.path()).found.len(), 0);
        touch(dir.path(), &["radio"]);
        assert_eq!(resolve(&["radio"], dir.path()).found, vec!["radio"]);
    }
}
