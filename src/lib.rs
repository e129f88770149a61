//! `net_stubbing` answers intercepted HTTP requests with canned responses, without a backend.
//!
//! A test-automation proxy that intercepts traffic describes the response it wants with a
//! [`StaticResponse`]: a status code, headers and either a body, a fixture file or a forced
//! network error. `net_stubbing` turns it into a [`SyntheticResponse`], which has the shape of a
//! response received from a real server, plus a [`BodyStream`]. Response middleware can then
//! process stubbed responses exactly as it processes upstream ones.
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Fixtures](#fixtures)
//! 3. [Network errors](#network-errors)
//! 4. [Matcher fields](#matcher-fields)
//!
//! ## Getting started
//! ```rust
//! use futures::TryStreamExt;
//! use net_stubbing::{send_static_response, ResponseTarget, StaticResponse};
//!
//! struct Exchange;
//!
//! impl ResponseTarget for Exchange {
//!     fn destroy_connection(&mut self) {}
//!     fn destroy(&mut self) {}
//! }
//!
//! #[async_std::main]
//! async fn main() {
//!     let static_response = StaticResponse::new(201).set_body("<p>hi</p>");
//!
//!     let mut received = None;
//!     send_static_response(&mut Exchange, &static_response, |response, body| {
//!         received = Some((response, body));
//!     }, None)
//!     .unwrap();
//!
//!     let (response, body) = received.unwrap();
//!     assert_eq!(response.status(), 201);
//!     // `content-type` was inferred from the body.
//!     assert_eq!(response.headers()["content-type"], "text/html");
//!
//!     let chunks: Vec<_> = body.try_collect().await.unwrap();
//!     assert_eq!(chunks.concat(), b"<p>hi</p>");
//! }
//! ```
//!
//! ## Fixtures
//!
//! A [`StaticResponse`] can reference a fixture file instead of carrying a body.
//! [`set_body_from_fixture`] loads it with a [`FixtureLoader`] - e.g. [`FsFixtureLoader`] -
//! and infers a `content-type` with a [`ContentTypeInference`] - e.g. [`Sniffer`] - unless one
//! was set explicitly. Call it before [`send_static_response`].
//!
//! ## Network errors
//!
//! A [`StaticResponse`] with `force_network_error` set resets the connection: the
//! [`ResponseTarget`] is destroyed and no response is ever produced.
//!
//! ## Matcher fields
//!
//! [`matchers::all_string_matcher_fields`] lists the fields of a [`matchers::RouteMatcherOptions`]
//! that a rule-matching engine should pattern-match, flattening dictionary fields (e.g. one
//! path per header name).
mod content_type;
mod dispatch;
pub mod driver;
mod error;
mod fixture;
mod headers;
pub mod http;
pub mod matchers;
mod static_response;
mod synthetic_response;

pub use content_type::{infer_content_type, is_html, ContentTypeInference, Sniffer};
pub use dispatch::{send_static_response, ResponseTarget};
pub use error::{Error, FixtureError};
pub use fixture::{
    set_body_from_fixture, FixtureData, FixtureLoader, FsFixtureLoader, FsFixtureLoaderBuilder,
};
pub use headers::HeaderList;
pub use static_response::{FixtureRef, ResponseBody, StaticResponse};
pub use synthetic_response::{BodyStream, DetachedConnection, SyntheticBody, SyntheticResponse};
