use crate::types::PackageRecord;

use std::collections::HashSet;

/// Distinct `version-revision-architecture` strings, in the order they were first seen
pub fn reduce_versions(pkgs: &[PackageRecord]) -> Vec<String> {
    unique(pkgs.iter().map(PackageRecord::version_id))
}

pub fn unique<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|i| seen.insert(i.clone()))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(name: &str, version: &str, revision: &str, arch: &str) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            section: "kernel".to_string(),
            architecture: arch.to_string(),
            version: version.to_string(),
            revision: revision.to_string(),
        }
    }

    #[test]
    fn test_reduce_versions() {
        let pkgs = vec![
            record("linux-headers-5.10.0-9-amd64", "5.10.70", "1", "amd64"),
            record("linux-headers-5.10.0-9-cloud-amd64", "5.10.70", "1", "amd64"),
            record("linux-headers-5.10.0-9-arm64", "5.10.70", "1", "arm64"),
            record("linux-headers-4.19.0-18-amd64", "4.19.208", "1", "amd64"),
            record("linux-headers-5.10.0-9-rt-amd64", "5.10.70", "1", "amd64"),
        ];
        assert_eq!(
            reduce_versions(&pkgs),
            vec!["5.10.70-1-amd64", "5.10.70-1-arm64", "4.19.208-1-amd64"]
        );
    }

    #[test]
    fn test_reduce_empty() {
        assert!(reduce_versions(&[]).is_empty());
    }

    #[test]
    fn test_unique_idempotent() {
        let input: Vec<String> = ["b", "a", "b", "c", "a", "a"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let once = unique(input);
        assert_eq!(once, vec!["b", "a", "c"]);
        assert_eq!(unique(once.clone()), once);
    }
}
