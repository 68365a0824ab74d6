//! Readers for the two deb control formats we consume: the InRelease manifest
//! of a distribution and its Packages indexes.
use crate::types::{Checksum, DebVersion, PackageRecord};

use anyhow::{bail, format_err, Result};
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::convert::TryFrom;

const SIGNED_HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";
const SIGNATURE_HEADER: &str = "-----BEGIN PGP SIGNATURE-----";

const INTERESTED_FIELDS: &[&str] = &["Package", "Section", "Architecture", "Version"];

/// One file listed in the checksum list of a release manifest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Relative to the distribution root, e.g. `main/binary-amd64/Packages.xz`
    pub filename: String,
    pub size: u64,
    pub checksum: Checksum,
}

impl IndexEntry {
    /// First path segment, if the file lives below a component directory
    pub fn component(&self) -> Option<&str> {
        let mut segments = self.filename.split('/');
        let first = segments.next()?;
        segments.next().map(|_| first)
    }

    pub fn is_installer(&self) -> bool {
        self.filename.split('/').any(|s| s == "debian-installer")
    }

    /// Architecture from a `binary-<arch>` segment
    pub fn architecture(&self) -> Option<&str> {
        self.filename
            .split('/')
            .find_map(|s| s.strip_prefix("binary-"))
    }
}

#[derive(Debug, Default)]
pub struct ReleaseManifest {
    pub entries: Vec<IndexEntry>,
}

/// Drop the armor of a clearsigned InRelease. The signature is not checked.
/// Unsigned input (a plain Release file) is returned as-is.
pub fn strip_clearsign(s: &str) -> Result<String> {
    let mut lines = s.lines();
    match lines.next() {
        Some(line) if line.trim_end() == SIGNED_HEADER => (),
        _ => return Ok(s.to_string()),
    }
    // Armor headers end at the first empty line
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
    }

    let mut res = String::with_capacity(s.len());
    for line in lines {
        if line.trim_end() == SIGNATURE_HEADER {
            return Ok(res);
        }
        // Undo dash-escaping
        res.push_str(line.strip_prefix("- ").unwrap_or(line));
        res.push('\n');
    }

    bail!("Clearsigned message without signature block")
}

pub fn parse_release(s: &str) -> Result<ReleaseManifest> {
    lazy_static! {
        static ref CHKSUM: Regex =
            Regex::new("^(?P<chksum>[0-9a-f]+) +(?P<size>[0-9]+) +(?P<path>.+)$").unwrap();
    }

    let content = strip_clearsign(s)?;
    let paragraphs =
        debcontrol::parse_str(&content).map_err(|e| format_err!("Bad syntax: {:?}", e))?;
    for p in paragraphs {
        for field in p.fields {
            if field.name != "SHA256" && field.name != "SHA512" {
                continue;
            }
            let mut entries = Vec::new();
            for line in field.value.lines().map(str::trim) {
                if line.is_empty() {
                    continue;
                }
                let captures = CHKSUM
                    .captures(line)
                    .ok_or_else(|| format_err!("Malformed checksum line: {}", line))?;
                let chksum = &captures["chksum"];
                let checksum = match field.name {
                    "SHA256" => Checksum::from_sha256_str(chksum)?,
                    _ => Checksum::from_sha512_str(chksum)?,
                };
                entries.push(IndexEntry {
                    filename: captures["path"].to_string(),
                    size: captures["size"].parse::<u64>()?,
                    checksum,
                });
            }
            return Ok(ReleaseManifest { entries });
        }
    }

    bail!("No checksum list found. Supported Hash: SHA256, SHA512")
}

/// Parsed Packages index
#[derive(Debug, Default)]
pub struct PackageDb {
    records: Vec<PackageRecord>,
}

impl PackageDb {
    /// Paragraphs missing a name, architecture or a sane version are skipped.
    pub fn load(data: &[u8]) -> Result<Self> {
        let s = std::str::from_utf8(data)?;
        let paragraphs = debcontrol::parse_str(s).map_err(|e| format_err!("Bad syntax: {:?}", e))?;

        let mut pkgs = Vec::with_capacity(paragraphs.len());
        for paragraph in paragraphs {
            let mut fields = HashMap::new();
            for field in paragraph.fields {
                if INTERESTED_FIELDS.contains(&field.name) {
                    fields.insert(field.name, field.value);
                }
            }
            pkgs.push(fields);
        }

        // Parse fields in parallel
        let records = pkgs
            .into_par_iter()
            .filter_map(|fields| fields_to_record(fields).ok())
            .collect();

        Ok(PackageDb { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn filter<F>(&self, pred: F) -> Vec<PackageRecord>
    where
        F: Fn(&PackageRecord) -> bool,
    {
        self.records.iter().filter(|p| pred(p)).cloned().collect()
    }
}

fn fields_to_record(mut f: HashMap<&str, String>) -> Result<PackageRecord> {
    let version = DebVersion::try_from(
        f.get("Version")
            .ok_or_else(|| format_err!("Package without Version"))?
            .as_str(),
    )?;
    Ok(PackageRecord {
        name: f
            .remove("Package")
            .ok_or_else(|| format_err!("Package without name"))?,
        section: f.remove("Section").unwrap_or_default(),
        architecture: f
            .remove("Architecture")
            .ok_or_else(|| format_err!("Package without Architecture"))?,
        version: version.upstream,
        revision: version.revision,
    })
}
