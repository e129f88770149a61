//! Convenient re-exports of http types that are part of `net_stubbing`'s public API.
pub use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version};
pub use hyper::body::Bytes;
