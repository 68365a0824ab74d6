use crate::utils::{
    compression::Compression,
    debcontrol::{IndexEntry, ReleaseManifest},
};

use std::collections::HashSet;

/// Decides which files of a distribution get fetched, and how.
#[derive(Clone, Debug)]
pub struct IndexPolicy {
    /// Manifest filename below `dists/<dist>/`
    pub release_file: String,
    pub compression: Compression,
    pub exclude_installers: bool,
    pub excluded_components: Vec<String>,
    /// Only fetch `binary-<arch>` indexes for these. Empty means all.
    pub architectures: Vec<String>,
    /// A missing manifest is not an error, the distribution is skipped
    pub skip_missing_release: bool,
    pub verify_checksums: bool,
}

impl Default for IndexPolicy {
    fn default() -> Self {
        IndexPolicy {
            release_file: "InRelease".to_string(),
            compression: Compression::Xz,
            exclude_installers: true,
            excluded_components: vec!["non-free".to_string(), "non-free-firmware".to_string()],
            architectures: Vec::new(),
            skip_missing_release: false,
            verify_checksums: true,
        }
    }
}

impl IndexPolicy {
    pub fn is_index(&self, entry: &IndexEntry) -> bool {
        let marker = format!("Packages{}", self.compression.suffix());
        entry.filename.contains(&marker)
    }

    pub fn is_excluded(&self, entry: &IndexEntry) -> bool {
        if self.exclude_installers && entry.is_installer() {
            return true;
        }
        if let Some(component) = entry.component() {
            if self.excluded_components.iter().any(|c| c == component) {
                return true;
            }
        }
        if !self.architectures.is_empty() {
            if let Some(arch) = entry.architecture() {
                return !self.architectures.iter().any(|a| a == arch);
            }
        }
        false
    }

    /// Indexes to fetch, in manifest order, each filename at most once.
    pub fn select(&self, manifest: ReleaseManifest) -> Vec<IndexEntry> {
        let mut seen = HashSet::new();
        manifest
            .entries
            .into_iter()
            .filter(|e| self.is_index(e) && !self.is_excluded(e))
            .filter(|e| seen.insert(e.filename.clone()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::Checksum;

    fn manifest(filenames: &[&str]) -> ReleaseManifest {
        ReleaseManifest {
            entries: filenames
                .iter()
                .map(|f| IndexEntry {
                    filename: f.to_string(),
                    size: 0,
                    checksum: Checksum::Sha256(vec![0; 32]),
                })
                .collect(),
        }
    }

    fn selected(policy: &IndexPolicy, filenames: &[&str]) -> Vec<String> {
        policy
            .select(manifest(filenames))
            .into_iter()
            .map(|e| e.filename)
            .collect()
    }

    #[test]
    fn test_both_exclusions() {
        let policy = IndexPolicy::default();
        assert_eq!(
            selected(
                &policy,
                &["Packages.xz", "debian-installer/Packages.xz", "non-free/Packages.xz"]
            ),
            vec!["Packages.xz"]
        );
    }

    #[test]
    fn test_installer_exclusion_is_order_independent() {
        let files = [
            "main/binary-amd64/Packages.xz",
            "main/debian-installer/binary-amd64/Packages.xz",
            "contrib/binary-amd64/Packages.xz",
            "main/debian-installer/binary-arm64/Packages.xz",
        ];
        let mut reversed = files;
        reversed.reverse();

        let policy = IndexPolicy::default();
        let mut a = selected(&policy, &files);
        let mut b = selected(&policy, &reversed);
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(
            a,
            vec!["contrib/binary-amd64/Packages.xz", "main/binary-amd64/Packages.xz"]
        );

        let keep_installers = IndexPolicy {
            exclude_installers: false,
            ..Default::default()
        };
        assert_eq!(selected(&keep_installers, &files).len(), 4);
    }

    #[test]
    fn test_only_compressed_packages() {
        let policy = IndexPolicy::default();
        let files = [
            "main/binary-amd64/Packages",
            "main/binary-amd64/Packages.gz",
            "main/binary-amd64/Packages.xz",
            "main/binary-amd64/Release",
            "main/Contents-amd64.gz",
            "main/binary-amd64/Packages.xz",
        ];
        assert_eq!(selected(&policy, &files), vec!["main/binary-amd64/Packages.xz"]);

        let gz = IndexPolicy {
            compression: Compression::Gzip,
            ..Default::default()
        };
        assert_eq!(selected(&gz, &files), vec!["main/binary-amd64/Packages.gz"]);
    }

    #[test]
    fn test_architecture_allow_list() {
        let policy = IndexPolicy {
            architectures: vec!["arm64".to_string()],
            ..Default::default()
        };
        let files = [
            "main/binary-amd64/Packages.xz",
            "main/binary-arm64/Packages.xz",
            "main/binary-all/Packages.xz",
            "Packages.xz",
        ];
        assert_eq!(
            selected(&policy, &files),
            vec!["main/binary-arm64/Packages.xz", "Packages.xz"]
        );
    }

    #[test]
    fn test_non_free_firmware() {
        let policy = IndexPolicy::default();
        let files = [
            "non-free-firmware/binary-amd64/Packages.xz",
            "main/binary-amd64/Packages.xz",
        ];
        assert_eq!(selected(&policy, &files), vec!["main/binary-amd64/Packages.xz"]);
    }
}
