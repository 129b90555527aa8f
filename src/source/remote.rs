use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::Deserialize;

use crate::{
    foundation::{
        error::{FlipbookError, FlipbookResult},
        gate::InitGate,
    },
    source::{FrameCollection, FrameId, FrameSource, RawFrame, is_supported_image_name},
};

/// Default per-request timeout for remote listings and frame downloads.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Blocking HTTP GET, the only network primitive the remote source needs.
///
/// Failures (transport, timeout, non-success status) are reported as `FetchFailed`.
pub trait HttpFetch: Send + Sync {
    fn get(&self, url: &str) -> FlipbookResult<Vec<u8>>;
}

/// [`HttpFetch`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::blocking::Client,
}

impl ReqwestFetch {
    pub fn new(timeout: Duration) -> FlipbookResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flipbook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FlipbookError::config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpFetch for ReqwestFetch {
    fn get(&self, url: &str) -> FlipbookResult<Vec<u8>> {
        let resp = self.client.get(url).send().map_err(|e| map_http_error(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FlipbookError::fetch_failed(format!(
                "GET {url} returned status {status}"
            )));
        }
        let bytes = resp.bytes().map_err(|e| map_http_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

fn map_http_error(url: &str, error: reqwest::Error) -> FlipbookError {
    if error.is_timeout() {
        FlipbookError::fetch_failed(format!("GET {url} timed out: {error}"))
    } else if error.is_connect() {
        FlipbookError::fetch_failed(format!("GET {url} connection error: {error}"))
    } else {
        FlipbookError::fetch_failed(format!("GET {url} failed: {error}"))
    }
}

/// One entry of a directory listing, shaped like a GitHub "contents" response.
#[derive(Debug, Deserialize)]
struct ListingEntry {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

#[derive(Debug)]
struct Listing {
    collection: FrameCollection,
    urls: HashMap<FrameId, String>,
}

/// Remotely enumerated source with lazy per-frame downloads.
///
/// The listing is fetched once and memoised for the lifetime of the source; every
/// [`FrameSource::fetch`] performs one GET with no bulk preload.
pub struct RemoteSource<H: HttpFetch = ReqwestFetch> {
    listing_url: String,
    http: H,
    listing: InitGate<Listing>,
}

impl<H: HttpFetch> RemoteSource<H> {
    pub fn new(listing_url: impl Into<String>, http: H) -> Self {
        Self {
            listing_url: listing_url.into(),
            http,
            listing: InitGate::new(),
        }
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    fn listing(&self) -> FlipbookResult<Arc<Listing>> {
        self.listing.get_or_try_init(|| self.enumerate())
    }

    #[tracing::instrument(skip(self), fields(url = %self.listing_url))]
    fn enumerate(&self) -> FlipbookResult<Listing> {
        let body = self.http.get(&self.listing_url).map_err(|e| {
            tracing::warn!(error = %e, "remote listing failed");
            FlipbookError::enumeration(format!("list '{}': {e}", self.listing_url))
        })?;
        let entries: Vec<ListingEntry> = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "remote listing is not a JSON entry array");
            FlipbookError::enumeration(format!("parse listing '{}': {e}", self.listing_url))
        })?;

        let base = self.listing_url.trim_end_matches('/');
        let mut urls = HashMap::new();
        for entry in entries {
            if entry.kind.as_deref().is_some_and(|k| k != "file") {
                continue;
            }
            if !is_supported_image_name(&entry.name) {
                continue;
            }
            let url = entry
                .download_url
                .unwrap_or_else(|| format!("{base}/{}", entry.name));
            urls.insert(FrameId::new(entry.name), url);
        }

        let collection = FrameCollection::from_ids(urls.keys().cloned().collect());
        tracing::info!(frames = collection.len(), "remote listing loaded");
        Ok(Listing { collection, urls })
    }
}

impl<H: HttpFetch> FrameSource for RemoteSource<H> {
    fn list(&self) -> FlipbookResult<FrameCollection> {
        Ok(self.listing()?.collection.clone())
    }

    fn fetch(&self, id: &FrameId) -> FlipbookResult<RawFrame> {
        let listing = self.listing()?;
        let url = listing
            .urls
            .get(id)
            .ok_or_else(|| {
                FlipbookError::not_found(format!("frame '{id}' is not in the listing"))
            })?;
        tracing::debug!(frame = %id, url = %url, "fetching remote frame");
        self.http.get(url).map(RawFrame::Bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/remote.rs"]
mod tests;
