use crate::{repo::IndexPolicy, utils::compression::Compression};

use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

const DEFAULT_DISTS: &[&str] = &[
    "stretch",
    "stretch-backports",
    "stretch-updates",
    "sid",
    "sid-backports",
    "sid-updates",
    "jessie",
    "jessie-backports",
    "jessie-updates",
    "buster",
    "buster-backports",
    "buster-updates",
    "bullseye",
    "bullseye-backports",
    "bullseye-updates",
];

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    pub mirror: String,
    pub dists: Vec<String>,
    /// Substring of package names to look for
    pub package: String,
    pub section: String,
    pub release_file: String,
    pub compression: Compression,
    pub exclude_installers: bool,
    pub excluded_components: Vec<String>,
    pub architectures: Vec<String>,
    pub skip_missing_release: bool,
    pub verify_checksums: bool,
    /// 0 means unbounded
    pub max_concurrent_fetches: usize,
    /// Seconds per request, 0 disables it
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        let policy = IndexPolicy::default();
        Config {
            mirror: "https://mirrors.kernel.org/debian".to_string(),
            dists: DEFAULT_DISTS.iter().map(|d| d.to_string()).collect(),
            package: "linux-headers".to_string(),
            section: "kernel".to_string(),
            release_file: policy.release_file,
            compression: policy.compression,
            exclude_installers: policy.exclude_installers,
            excluded_components: policy.excluded_components,
            architectures: policy.architectures,
            skip_missing_release: policy.skip_missing_release,
            verify_checksums: policy.verify_checksums,
            max_concurrent_fetches: 16,
            timeout: 60,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&data)
            .context(format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Command line wins over the config file
    pub fn apply_opts(&mut self, opts: &Opts) {
        if !opts.dists.is_empty() {
            self.dists = opts.dists.clone();
        }
        if let Some(package) = &opts.package {
            self.package = package.clone();
        }
        if let Some(section) = &opts.section {
            self.section = section.clone();
        }
        if let Some(mirror) = &opts.mirror {
            self.mirror = mirror.clone();
        }
    }

    pub fn check_sanity(&self) -> Result<()> {
        let url =
            Url::parse(&self.mirror).context(format!("Invalid mirror URL {}", self.mirror))?;
        if url.cannot_be_a_base() {
            bail!("Invalid mirror URL {}", self.mirror);
        }
        if self.dists.is_empty() {
            bail!("No distribution to scan");
        }
        if self.release_file.is_empty() || self.release_file.contains('/') {
            bail!("Invalid release file name {}", self.release_file);
        }
        Ok(())
    }

    pub fn policy(&self) -> IndexPolicy {
        IndexPolicy {
            release_file: self.release_file.clone(),
            compression: self.compression,
            exclude_installers: self.exclude_installers,
            excluded_components: self.excluded_components.clone(),
            architectures: self.architectures.clone(),
            skip_missing_release: self.skip_missing_release,
            verify_checksums: self.verify_checksums,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// List every distinct version of matching packages across Debian distributions
#[derive(Parser, Debug)]
#[clap(about, version, author)]
pub struct Opts {
    /// Distributions to scan, instead of the configured ones
    pub dists: Vec<String>,
    /// Substring of package names to look for
    #[clap(short, long)]
    pub package: Option<String>,
    /// Section the packages must be in
    #[clap(short, long)]
    pub section: Option<String>,
    /// Base URL of the Debian mirror
    #[clap(short, long)]
    pub mirror: Option<String>,
    /// Path to a TOML config file
    #[clap(short, long)]
    pub config: Option<PathBuf>,
    #[clap(short, long, help = "Print additional debug information")]
    pub verbose: bool,
    #[clap(short, long, help = "Only print warnings and errors")]
    pub quiet: bool,
    #[clap(long, help = "Don't draw progress bars")]
    pub no_progress: bool,
    #[clap(long, help = "Exit with failure if any fetch failed")]
    pub strict: bool,
}
