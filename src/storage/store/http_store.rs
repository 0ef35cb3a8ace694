//! A synchronous read-only HTTP store.

use std::str::FromStr;

use reqwest::{
    header::{HeaderValue, CONTENT_LENGTH, RANGE},
    StatusCode,
};
use thiserror::Error;
use url::Url;

use crate::{
    byte_range::ByteRange,
    storage::{Bytes, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey},
};

/// A synchronous read-only HTTP store.
///
/// Each byte range is fetched with a single part `Range` request.
#[derive(Debug)]
pub struct HTTPStore {
    base_url: Url,
    client: reqwest::blocking::Client,
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<url::ParseError> for StorageError {
    fn from(err: url::ParseError) -> Self {
        Self::Other(err.to_string())
    }
}

impl HTTPStore {
    /// Create a new HTTP store at a given `base_url`.
    ///
    /// # Errors
    /// Returns a [`HTTPStoreCreateError`] if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, HTTPStoreCreateError> {
        let base_url = Url::from_str(base_url)
            .map_err(|_| HTTPStoreCreateError::InvalidBaseURL(base_url.into()))?;
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self { base_url, client })
    }

    /// Maps a [`StoreKey`] to a HTTP [`Url`].
    ///
    /// # Errors
    /// Returns an error if the URL is invalid.
    pub fn key_to_url(&self, key: &StoreKey) -> Result<Url, url::ParseError> {
        let base_url = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base_url}/{}", key.as_str()))
    }

    fn range_header(
        &self,
        key: &StoreKey,
        byte_range: &ByteRange,
        size: &mut Option<u64>,
    ) -> Result<Option<String>, StorageError> {
        Ok(match byte_range {
            ByteRange::FromStart(0, None) => None,
            ByteRange::FromStart(offset, None) => Some(format!("bytes={offset}-")),
            ByteRange::FromStart(offset, Some(length)) => {
                Some(format!("bytes={offset}-{}", offset + length - 1))
            }
            ByteRange::FromEnd(0, Some(length)) => Some(format!("bytes=-{length}")),
            ByteRange::FromEnd(..) => {
                let size = if let Some(size) = size {
                    *size
                } else {
                    let key_size = self
                        .size_key(key)?
                        .ok_or_else(|| StorageError::from(format!("{key} not found")))?;
                    *size = Some(key_size);
                    key_size
                };
                let range = byte_range.to_range(size);
                Some(format!("bytes={}-{}", range.start, range.end.saturating_sub(1)))
            }
        })
    }
}

impl ReadableStorageTraits for HTTPStore {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let url = self.key_to_url(key)?;
        log::trace!("GET {url}");
        let response = self.client.get(url).send()?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.bytes()?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(StorageError::from(format!(
                "http unexpected status code: {status}"
            ))),
        }
    }

    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError> {
        let url = self.key_to_url(key)?;
        let mut size = None;
        let mut out = Vec::with_capacity(byte_ranges.len());
        for byte_range in byte_ranges {
            if matches!(
                byte_range,
                ByteRange::FromStart(_, Some(0)) | ByteRange::FromEnd(_, Some(0))
            ) {
                out.push(Bytes::new());
                continue;
            }
            let mut request = self.client.get(url.clone());
            if let Some(range) = self.range_header(key, byte_range, &mut size)? {
                log::trace!("GET {url} {range}");
                let range = HeaderValue::from_str(&range)
                    .map_err(|err| StorageError::Other(err.to_string()))?;
                request = request.header(RANGE, range);
            }
            let response = request.send()?;
            let bytes = match response.status() {
                StatusCode::NOT_FOUND => return Ok(None),
                StatusCode::PARTIAL_CONTENT => response.bytes()?,
                StatusCode::OK => {
                    // The server ignored the range header
                    let bytes = response.bytes()?;
                    let range = byte_range.to_range_usize(bytes.len() as u64);
                    if range.end > bytes.len() {
                        return Err(StorageError::from(format!(
                            "byte range {byte_range} is out of bounds for {key}"
                        )));
                    }
                    bytes.slice(range)
                }
                StatusCode::RANGE_NOT_SATISFIABLE => {
                    return Err(StorageError::from(format!(
                        "byte range {byte_range} is out of bounds for {key}"
                    )))
                }
                status => {
                    return Err(StorageError::from(format!(
                        "the http server responded with status {status} for the byte range request"
                    )))
                }
            };
            out.push(bytes);
        }
        Ok(Some(out))
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        let url = self.key_to_url(key)?;
        let response = self.client.head(url).send()?;
        match response.status() {
            StatusCode::OK => {
                let length = response
                    .headers()
                    .get(CONTENT_LENGTH)
                    .and_then(|header_value| header_value.to_str().ok())
                    .and_then(|header_str| u64::from_str(header_str).ok())
                    .ok_or_else(|| StorageError::from("content length response is invalid"))?;
                Ok(Some(length))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(StorageError::from(format!(
                "http size_key has status code {status}"
            ))),
        }
    }
}

/// A HTTP store creation error.
#[derive(Debug, Error)]
pub enum HTTPStoreCreateError {
    /// The HTTP client could not be created.
    #[error(transparent)]
    ClientError(#[from] reqwest::Error),
    /// The URL is not valid.
    #[error("base URL {0} is not valid")]
    InvalidBaseURL(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_store_key_to_url() {
        let store = HTTPStore::new("https://example.com/data.zarr/").unwrap();
        let url = store
            .key_to_url(&StoreKey::new("group/array/zarr.json").unwrap())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/data.zarr/group/array/zarr.json"
        );
        assert!(HTTPStore::new("not a url").is_err());
    }
}
