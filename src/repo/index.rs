use super::{FetchError, Scanner};
use crate::{
    types::{PackageFilter, PackageRecord},
    utils::{
        compression::decompress,
        debcontrol::{IndexEntry, PackageDb},
    },
};

use tokio::sync::mpsc::UnboundedSender;

/// Index Fetch Worker: one Packages index, one batch of matches or one error.
pub async fn scan_index(
    scanner: Scanner,
    dist: String,
    entry: IndexEntry,
    url: String,
    filter: PackageFilter,
    pkgs: UnboundedSender<Vec<PackageRecord>>,
    errors: UnboundedSender<FetchError>,
) {
    // Sends only fail if the distribution worker is gone, nobody to tell then
    match fetch_index(&scanner, &entry, &url, filter).await {
        Ok(batch) => {
            let _ = pkgs.send(batch);
        }
        Err(e) => {
            let _ = errors.send(e);
        }
    }
    scanner.progress.index_done(&dist);
}

async fn fetch_index(
    scanner: &Scanner,
    entry: &IndexEntry,
    url: &str,
    filter: PackageFilter,
) -> Result<Vec<PackageRecord>, FetchError> {
    let writer = scanner.writer.clone();
    let policy = &scanner.policy;

    let permit = scanner.permit().await;
    let data = scanner
        .cancel
        .guard(url, async {
            writer.debug(format!(
                "Downloading compressed index file {} ({} bytes)",
                url, entry.size
            ));
            let resp = scanner.mirror.get(url).await?;
            if !resp.is_success() {
                return Err(FetchError::UnexpectedStatus {
                    url: url.to_owned(),
                    status: resp.status,
                });
            }
            writer.debug(format!("Decompressing index file {}", url));
            let checksum = if policy.verify_checksums {
                Some(&entry.checksum)
            } else {
                None
            };
            decompress(resp.body, policy.compression, checksum, url).await
        })
        .await?;
    drop(permit);

    let url = url.to_owned();
    let parse_url = url.clone();
    tokio::task::spawn_blocking(move || {
        writer.debug(format!("Loading packages DB from index file {}", url));
        let db = PackageDb::load(&data).map_err(|e| FetchError::IndexParse {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        writer.debug(format!("Querying {} packages from {}", db.len(), url));
        Ok(db.filter(|p| filter.matches(p)))
    })
    .await
    .map_err(|e| FetchError::crashed(&parse_url, e))?
}
