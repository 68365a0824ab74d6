mod checksum;
mod version;

pub use checksum::Checksum;
pub use version::DebVersion;

use std::fmt;

/// Architecture value of packages that run everywhere
pub const ARCH_ALL: &str = "all";

/// One binary package paragraph from a Packages index, reduced to the fields we care about
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub section: String,
    pub architecture: String,
    pub version: String,
    pub revision: String,
}

impl PackageRecord {
    /// `version-revision-architecture`
    pub fn version_id(&self) -> String {
        format!("{}-{}-{}", self.version, self.revision, self.architecture)
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.version_id(), self.section)
    }
}

/// Which packages a scan is looking for
#[derive(Clone, Debug)]
pub struct PackageFilter {
    /// Substring of the package name
    pub name: String,
    /// Exact section
    pub section: String,
}

impl PackageFilter {
    pub fn new(name: &str, section: &str) -> Self {
        PackageFilter {
            name: name.to_owned(),
            section: section.to_owned(),
        }
    }

    /// Architecture-independent packages never match.
    pub fn matches(&self, pkg: &PackageRecord) -> bool {
        pkg.name.contains(&self.name) && pkg.section == self.section && pkg.architecture != ARCH_ALL
    }
}

/// Everything a distribution worker needs to know about its distribution
#[derive(Clone, Debug)]
pub struct DistributionJob {
    pub dist: String,
    pub mirror: String,
    pub filter: PackageFilter,
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(name: &str, section: &str, arch: &str) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            section: section.to_string(),
            architecture: arch.to_string(),
            version: "5.10.46".to_string(),
            revision: "4".to_string(),
        }
    }

    #[test]
    fn test_filter() {
        let filter = PackageFilter::new("linux-headers", "kernel");
        assert!(filter.matches(&record("linux-headers-5.10.0-8-amd64", "kernel", "amd64")));
        assert!(!filter.matches(&record("linux-headers-5.10.0-8-common", "kernel", "all")));
        assert!(!filter.matches(&record("linux-headers-5.10.0-8-amd64", "devel", "amd64")));
        assert!(!filter.matches(&record("linux-image-5.10.0-8-amd64", "kernel", "amd64")));
    }

    #[test]
    fn test_version_id() {
        let pkg = record("linux-headers-5.10.0-8-arm64", "kernel", "arm64");
        assert_eq!(pkg.version_id(), "5.10.46-4-arm64");
        assert_eq!(
            pkg.to_string(),
            "linux-headers-5.10.0-8-arm64 (5.10.46-4-arm64, kernel)"
        );
    }
}
