//! S3-compatible [`ObjectStore`] (Storj DCS gateway by default).
//!
//! `rust-s3` is async; the generator is not. The store owns a private tokio
//! runtime and drives each request to completion with `block_on`, racing it
//! against the cancel token so a pending request is abandoned on Ctrl-C.

use super::remote::{ObjectListing, ObjectStore, StoreError};
use crate::cancel::CancelToken;
use s3::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use std::future::Future;
use tokio::runtime::Runtime;

/// Connection parameters for an S3-compatible bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
}

pub struct S3Store {
    bucket: Box<Bucket>,
    runtime: Runtime,
}

impl S3Store {
    /// Build the client. No request is made until the first call.
    pub fn connect(settings: &S3Settings) -> Result<Self, StoreError> {
        let credentials = Credentials::new(
            Some(&settings.access_key_id),
            Some(&settings.secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| StoreError::Request(Box::new(e)))?;
        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };
        let bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(request_error)?
            .with_path_style();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Request(Box::new(e)))?;
        Ok(Self { bucket, runtime })
    }

    /// Run one request on the private runtime, abandoning it if `cancel` fires.
    fn run<T>(
        &self,
        cancel: &CancelToken,
        request: impl Future<Output = Result<T, S3Error>>,
    ) -> Result<T, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.runtime.block_on(async {
            tokio::select! {
                result = request => result.map_err(request_error),
                _ = cancel.cancelled() => Err(StoreError::Cancelled),
            }
        })
    }
}

fn request_error(e: S3Error) -> StoreError {
    match e {
        S3Error::HttpFailWithBody(404, body) => StoreError::NotFound(body),
        other => StoreError::Request(Box::new(other)),
    }
}

impl ObjectStore for S3Store {
    fn list(&self, prefix: &str, cancel: &CancelToken) -> Result<ObjectListing, StoreError> {
        let pages = self.run(
            cancel,
            self.bucket.list(prefix.to_string(), Some("/".to_string())),
        )?;
        let mut listing = ObjectListing::default();
        for page in pages {
            listing.objects.extend(page.contents.into_iter().map(|o| o.key));
            listing
                .prefixes
                .extend(page.common_prefixes.into_iter().flatten().map(|p| p.prefix));
        }
        Ok(listing)
    }

    fn get(&self, key: &str, cancel: &CancelToken) -> Result<Vec<u8>, StoreError> {
        let response = self.run(cancel, self.bucket.get_object(key))?;
        Ok(response.bytes().to_vec())
    }

    fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        cancel: &CancelToken,
    ) -> Result<(), StoreError> {
        self.run(
            cancel,
            self.bucket.put_object_with_content_type(key, body, content_type),
        )?;
        Ok(())
    }
}
