use super::{FetchError, Scanner};
use crate::utils::{
    debcontrol::{parse_release, ReleaseManifest},
    mirror::join_url,
};

use futures_util::StreamExt;

/// Fetch and parse the release manifest of the distribution rooted at `dist_url`.
///
/// 404 and 5xx get their own error kinds so a caller may tell a missing
/// distribution apart from a broken mirror.
pub async fn fetch_release(
    scanner: &Scanner,
    dist_url: &str,
    dist: &str,
) -> Result<ReleaseManifest, FetchError> {
    let url = join_url(dist_url, &[&scanner.policy.release_file])?;
    scanner
        .writer
        .debug(format!("Downloading release manifest {}", url));

    let permit = scanner.permit().await;
    let content = scanner
        .cancel
        .guard(&url, async {
            let mut resp = scanner.mirror.get(&url).await?;
            match resp.status {
                200..=299 => (),
                404 => {
                    return Err(FetchError::ManifestNotFound {
                        dist: dist.to_owned(),
                    })
                }
                500..=599 => {
                    return Err(FetchError::MirrorInternal {
                        dist: dist.to_owned(),
                        status: resp.status,
                    })
                }
                status => {
                    return Err(FetchError::UnexpectedStatus {
                        url: url.clone(),
                        status,
                    })
                }
            }
            let mut content = Vec::new();
            while let Some(chunk) = resp.body.next().await {
                content.extend_from_slice(&chunk?);
            }
            Ok(content)
        })
        .await?;
    drop(permit);

    let parse_err = |reason: String| FetchError::ManifestParse {
        dist: dist.to_owned(),
        reason,
    };
    let content = String::from_utf8(content).map_err(|e| parse_err(e.to_string()))?;
    parse_release(&content).map_err(|e| parse_err(e.to_string()))
}
