use super::{index::scan_index, merge, release::fetch_release, FetchError, Scanner};
use crate::{
    types::{DistributionJob, PackageRecord},
    utils::mirror::join_url,
};

use futures_util::future::join_all;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

/// Distribution Worker: every match and every error of one distribution goes up
/// through `pkgs` and `errors`. Returns only after all of its index workers are done.
pub async fn scan_dist(
    scanner: Scanner,
    job: DistributionJob,
    pkgs: UnboundedSender<Vec<PackageRecord>>,
    errors: UnboundedSender<FetchError>,
) {
    scanner.progress.dist_started(&job.dist);
    if let Err(e) = scan_indexes(&scanner, &job, &pkgs, &errors).await {
        match e {
            FetchError::ManifestNotFound { .. } if scanner.policy.skip_missing_release => {
                scanner
                    .writer
                    .warn(format!("Skipping {}: {}", job.dist, e));
            }
            e => {
                let _ = errors.send(e);
            }
        }
    }
    scanner.progress.dist_done(&job.dist);
}

async fn scan_indexes(
    scanner: &Scanner,
    job: &DistributionJob,
    pkgs: &UnboundedSender<Vec<PackageRecord>>,
    errors: &UnboundedSender<FetchError>,
) -> Result<(), FetchError> {
    let dist_url = join_url(&job.mirror, &["dists", &job.dist])?;
    let manifest = fetch_release(scanner, &dist_url, &job.dist).await?;
    let indexes = scanner.policy.select(manifest);
    scanner.writer.debug(format!(
        "Found {} package indexes for {}",
        indexes.len(),
        job.dist
    ));
    scanner.progress.indexes_found(&job.dist, indexes.len());

    let (inner_pkgs, inner_pkgs_rx) = unbounded_channel();
    let (inner_errors, inner_errors_rx) = unbounded_channel();
    let mut handles = Vec::with_capacity(indexes.len());
    let mut urls = Vec::with_capacity(indexes.len());
    for entry in indexes {
        let url = match join_url(&dist_url, &[&entry.filename]) {
            Ok(url) => url,
            Err(e) => {
                let _ = errors.send(e);
                scanner.progress.index_done(&job.dist);
                continue;
            }
        };
        urls.push(url.clone());
        handles.push(tokio::spawn(scan_index(
            scanner.clone(),
            job.dist.clone(),
            entry,
            url,
            job.filter.clone(),
            inner_pkgs.clone(),
            inner_errors.clone(),
        )));
    }
    // Index workers hold the only senders now, so the channels close when the last one finishes
    drop(inner_pkgs);
    drop(inner_errors);

    merge::drain(
        inner_pkgs_rx,
        inner_errors_rx,
        |batch: Vec<PackageRecord>| {
            if !batch.is_empty() {
                let _ = pkgs.send(batch);
            }
        },
        |e| {
            let _ = errors.send(e);
        },
    )
    .await;

    // A crashed worker sent nothing and never reported progress
    for (res, url) in join_all(handles).await.into_iter().zip(urls) {
        if let Err(e) = res {
            let _ = errors.send(FetchError::crashed(&url, e));
            scanner.progress.index_done(&job.dist);
        }
    }

    Ok(())
}
