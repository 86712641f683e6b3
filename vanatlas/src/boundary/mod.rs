//! Boundary data: fetch sources, single-flight cache, and keys.
//!
//! A [`BoundaryKey`] names one dataset (the national states file, one
//! state's districts/subdistricts/villages, or a static overlay). The
//! [`BoundaryCache`] holds fetched FeatureCollections for the whole session
//! and de-duplicates concurrent fetches per key.

mod cache;
mod http;
mod source;
mod types;

pub use cache::BoundaryCache;
pub use http::{AsyncHttpClient, ReqwestClient};
pub use source::{
    parse_feature_collection, BoundarySource, CompositeBoundarySource, RemoteBoundarySource,
    StaticBoundarySource,
};
pub use types::{BoundaryError, BoundaryKey, CacheStats};

#[cfg(test)]
pub use http::tests::MockHttpClient;
