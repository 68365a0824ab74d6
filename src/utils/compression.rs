use super::mirror::Body;
use crate::{repo::FetchError, types::Checksum};

use async_compression::tokio::write::{GzipDecoder, XzDecoder};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Compression of the Packages indexes we download
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum Compression {
    #[serde(rename = "xz")]
    Xz,
    #[serde(rename = "gz")]
    Gzip,
}

impl Compression {
    /// File extension, with the dot
    pub fn suffix(&self) -> &'static str {
        match self {
            Compression::Xz => ".xz",
            Compression::Gzip => ".gz",
        }
    }

    pub fn decoder<'a, W>(&self, inner: W) -> Box<dyn AsyncWrite + Unpin + Send + 'a>
    where
        W: AsyncWrite + Unpin + Send + 'a,
    {
        match self {
            Compression::Xz => Box::new(XzDecoder::new(inner)),
            Compression::Gzip => Box::new(GzipDecoder::new(inner)),
        }
    }
}

/// Drain a download through the decoder, checking the compressed bytes against `checksum`.
pub async fn decompress(
    mut body: Body,
    compression: Compression,
    checksum: Option<&Checksum>,
    url: &str,
) -> Result<Vec<u8>, FetchError> {
    let decompress_err = |e: std::io::Error| FetchError::Decompression {
        url: url.to_owned(),
        reason: e.to_string(),
    };

    let mut validator = checksum.map(|c| c.get_validator());
    let mut res = Vec::new();
    {
        let mut writer = compression.decoder(&mut res);
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if let Some(ref mut validator) = validator {
                validator.update(&chunk);
            }
            writer.write_all(&chunk).await.map_err(decompress_err)?;
        }
        writer.shutdown().await.map_err(decompress_err)?;
    }

    if let Some(validator) = validator {
        if !validator.finish() {
            return Err(FetchError::ChecksumMismatch {
                url: url.to_owned(),
            });
        }
    }

    Ok(res)
}

#[cfg(test)]
pub mod test {
    use super::*;
    use async_compression::tokio::write::{GzipEncoder, XzEncoder};
    use bytes::Bytes;
    use sha2::{Digest, Sha256};

    pub async fn compress(data: &[u8], compression: Compression) -> Vec<u8> {
        let mut res = Vec::new();
        {
            let mut writer: Box<dyn AsyncWrite + Unpin + Send + '_> = match compression {
                Compression::Xz => Box::new(XzEncoder::new(&mut res)),
                Compression::Gzip => Box::new(GzipEncoder::new(&mut res)),
            };
            writer.write_all(data).await.unwrap();
            writer.shutdown().await.unwrap();
        }
        res
    }

    fn body(data: Vec<u8>) -> Body {
        // Split into several chunks like a real response would
        let chunks: Vec<Result<Bytes, FetchError>> = data
            .chunks(7)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        futures_util::stream::iter(chunks).boxed()
    }

    #[tokio::test]
    async fn test_decompress() {
        let text = b"Package: linux-headers-5.10.0-9-amd64\nSection: kernel\n";
        for compression in [Compression::Xz, Compression::Gzip] {
            let data = compress(text, compression).await;
            let checksum =
                Checksum::from_sha256_str(&hex::encode(Sha256::digest(&data))).unwrap();
            let res = decompress(body(data), compression, Some(&checksum), "u")
                .await
                .unwrap();
            assert_eq!(res, text.to_vec());
        }
    }

    #[tokio::test]
    async fn test_decompress_checksum_mismatch() {
        let data = compress(b"Package: foo\n", Compression::Xz).await;
        let checksum = Checksum::from_sha256_str(&"0".repeat(64)).unwrap();
        let res = decompress(body(data), Compression::Xz, Some(&checksum), "u").await;
        assert_eq!(
            res,
            Err(FetchError::ChecksumMismatch {
                url: "u".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_decompress_garbage() {
        let res = decompress(
            body(b"definitely not xz".to_vec()),
            Compression::Xz,
            None,
            "u",
        )
        .await;
        assert!(matches!(res, Err(FetchError::Decompression { .. })));
    }
}
