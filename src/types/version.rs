use anyhow::{bail, Result};
use nom::{
    character::complete::{char, digit1},
    sequence::pair,
    IResult,
};
use std::convert::TryFrom;

/// A dpkg version string split into its parts.
///
/// `[epoch:]upstream[-revision]`, where the revision is whatever follows the
/// last hyphen. Native packages have an empty revision.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct DebVersion {
    pub epoch: usize,
    pub upstream: String,
    pub revision: String,
}

fn epoch(i: &str) -> IResult<&str, (&str, char)> {
    pair(digit1, char(':'))(i)
}

impl TryFrom<&str> for DebVersion {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> Result<Self> {
        let s = s.trim();
        let (rest, epoch) = match epoch(s) {
            Ok((rest, (epoch, _))) => (rest, epoch.parse::<usize>()?),
            Err(_) => (s, 0),
        };
        let (upstream, revision) = match rest.rsplit_once('-') {
            Some((upstream, revision)) => (upstream, revision),
            None => (rest, ""),
        };
        if upstream.is_empty() {
            bail!("Malformed version {}: empty upstream version", s);
        }
        if upstream.chars().any(char::is_whitespace) || revision.chars().any(char::is_whitespace) {
            bail!("Malformed version {}: contains whitespace", s);
        }

        Ok(DebVersion {
            epoch,
            upstream: upstream.to_string(),
            revision: revision.to_string(),
        })
    }
}
