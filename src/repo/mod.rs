mod dist;
mod error;
mod index;
mod merge;
mod policy;
mod release;
mod versions;

pub use error::FetchError;
pub use policy::IndexPolicy;
pub use versions::reduce_versions;

use crate::{
    cli::{NoProgress, Progress, Writer},
    types::{DistributionJob, PackageFilter, PackageRecord},
    utils::{cancel::Cancel, mirror::Mirror},
};

use futures_util::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc::unbounded_channel, OwnedSemaphorePermit, Semaphore};

/// Everything collected by a run
#[derive(Debug, Default)]
pub struct Scan {
    pub packages: Vec<PackageRecord>,
    pub errors: Vec<FetchError>,
}

/// Shared state of a run. Cheap to clone, every worker gets its own copy.
#[derive(Clone)]
pub struct Scanner {
    mirror: Arc<dyn Mirror>,
    policy: Arc<IndexPolicy>,
    writer: Arc<Writer>,
    progress: Arc<dyn Progress>,
    limiter: Option<Arc<Semaphore>>,
    cancel: Cancel,
}

impl Scanner {
    pub fn new(mirror: Arc<dyn Mirror>, policy: IndexPolicy, writer: Arc<Writer>) -> Self {
        // Without a handle this never fires
        let (_, cancel) = Cancel::new();
        Scanner {
            mirror,
            policy: Arc::new(policy),
            writer,
            progress: Arc::new(NoProgress),
            limiter: None,
            cancel,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Cap the number of requests in flight. 0 means no cap.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.limiter = match max {
            0 => None,
            max => Some(Arc::new(Semaphore::new(max))),
        };
        self
    }

    pub fn with_cancel(mut self, cancel: Cancel) -> Self {
        self.cancel = cancel;
        self
    }

    async fn permit(&self) -> Option<OwnedSemaphorePermit> {
        match &self.limiter {
            Some(limiter) => limiter.clone().acquire_owned().await.ok(),
            None => None,
        }
    }

    /// Every package matching `filter` in any of `dists` on the mirror at `mirror_url`.
    ///
    /// One worker per distribution, all at once. A failing distribution or index
    /// ends up in [`Scan::errors`] and does not affect the others.
    pub async fn get_packages(
        &self,
        filter: &PackageFilter,
        mirror_url: &str,
        dists: &[String],
    ) -> Scan {
        let (pkgs, pkgs_rx) = unbounded_channel();
        let (errors, errors_rx) = unbounded_channel();
        self.progress.start(dists.len());

        let mut handles = Vec::with_capacity(dists.len());
        for dist in dists {
            let job = DistributionJob {
                dist: dist.clone(),
                mirror: mirror_url.to_owned(),
                filter: filter.clone(),
            };
            handles.push(tokio::spawn(dist::scan_dist(
                self.clone(),
                job,
                pkgs.clone(),
                errors.clone(),
            )));
        }
        drop(pkgs);
        drop(errors);

        let mut packages = Vec::new();
        let mut errors = Vec::new();
        let writer = &self.writer;
        merge::drain(
            pkgs_rx,
            errors_rx,
            |batch: Vec<PackageRecord>| {
                if let Some(first) = batch.first() {
                    writer.info(format!(
                        "Found {} new packages, first one is {}",
                        batch.len(),
                        first
                    ));
                }
                packages.extend(batch);
            },
            |e: FetchError| {
                if e.is_cancelled() {
                    writer.debug(&e);
                } else {
                    writer.error(&e);
                }
                errors.push(e);
            },
        )
        .await;

        for (res, dist) in join_all(handles).await.into_iter().zip(dists) {
            if let Err(e) = res {
                let e = FetchError::crashed(dist, e);
                writer.error(&e);
                self.progress.dist_done(dist);
                errors.push(e);
            }
        }
        self.progress.finish();

        Scan { packages, errors }
    }

    /// Distinct `version-revision-architecture` of every match, plus everything that went wrong
    pub async fn get_matching_versions(
        &self,
        filter: &PackageFilter,
        mirror_url: &str,
        dists: &[String],
    ) -> (Vec<String>, Vec<FetchError>) {
        let scan = self.get_packages(filter, mirror_url, dists).await;
        (reduce_versions(&scan.packages), scan.errors)
    }
}
