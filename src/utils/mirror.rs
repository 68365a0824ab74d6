use crate::repo::FetchError;

use anyhow::Result;
use bytes::Bytes;
use futures_util::{future::BoxFuture, stream::BoxStream, StreamExt, TryStreamExt};
use reqwest::{Client, Url};
use std::time::Duration;

pub type Body = BoxStream<'static, Result<Bytes, FetchError>>;

pub struct MirrorResponse {
    pub status: u16,
    pub body: Body,
}

impl MirrorResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can GET files from a package mirror.
pub trait Mirror: Send + Sync {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<MirrorResponse, FetchError>>;
}

pub struct HttpMirror {
    client: Client,
}

impl HttpMirror {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout).connect_timeout(timeout);
        }
        Ok(HttpMirror {
            client: builder.build()?,
        })
    }
}

impl Mirror for HttpMirror {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<MirrorResponse, FetchError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::transport(url, e))?;
            let status = resp.status().as_u16();
            let url = url.to_owned();
            let body = resp
                .bytes_stream()
                .map_err(move |e| FetchError::transport(&url, e))
                .boxed();
            Ok(MirrorResponse { status, body })
        })
    }
}

/// Append path segments to a base URL. Each element of `path` may itself contain slashes.
pub fn join_url(base: &str, path: &[&str]) -> Result<String, FetchError> {
    let err = || FetchError::UrlConstruction {
        base: base.to_owned(),
        path: path.join("/"),
    };
    let mut url = Url::parse(base).map_err(|_| err())?;
    {
        let mut segments = url.path_segments_mut().map_err(|_| err())?;
        segments.pop_if_empty();
        for seg in path.iter().flat_map(|p| p.split('/')) {
            if !seg.is_empty() {
                segments.push(seg);
            }
        }
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_join_url() {
        let tests = vec![
            (
                "https://mirrors.kernel.org/debian",
                vec!["dists", "bullseye"],
                "https://mirrors.kernel.org/debian/dists/bullseye",
            ),
            (
                "https://mirrors.kernel.org/debian/",
                vec!["dists", "bullseye", "main/binary-amd64/Packages.xz"],
                "https://mirrors.kernel.org/debian/dists/bullseye/main/binary-amd64/Packages.xz",
            ),
            (
                "http://localhost:8080",
                vec!["dists", "sid", "InRelease"],
                "http://localhost:8080/dists/sid/InRelease",
            ),
        ];

        for (base, path, output) in tests {
            assert_eq!(join_url(base, &path).unwrap(), output);
        }
    }

    #[test]
    fn test_join_bad_url() {
        assert!(matches!(
            join_url("not a url", &["dists"]),
            Err(FetchError::UrlConstruction { .. })
        ));
        assert!(matches!(
            join_url("mailto:someone@example.com", &["dists"]),
            Err(FetchError::UrlConstruction { .. })
        ));
    }
}
