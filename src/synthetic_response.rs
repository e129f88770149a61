use crate::content_type::is_html;
use crate::error::Error;
use crate::headers::HeaderList;
use futures::{Stream, TryStreamExt};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Bytes, Frame};
use log::debug;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;

/// The body of a response: a single-pass, finite stream of bytes.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// The body type of the `hyper` response returned by [`SyntheticResponse::into_hyper`].
pub type SyntheticBody = UnsyncBoxBody<Bytes, io::Error>;

/// The connection a [`SyntheticResponse`] was "received" on.
///
/// There is none: a synthetic response never touched a socket, hence there are no addresses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetachedConnection;

impl DetachedConnection {
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        None
    }
}

/// An in-memory response with the shape of one received from an upstream server.
///
/// Response middleware written against real upstream responses can process a
/// `SyntheticResponse` unmodified. It must never be used to write to a socket: the body travels
/// separately, as a [`BodyStream`].
#[derive(Clone, Debug)]
pub struct SyntheticResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub connection: DetachedConnection,
}

impl Default for SyntheticResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            connection: DetachedConnection,
        }
    }
}

impl SyntheticResponse {
    /// Build a `SyntheticResponse` out of a status code, headers and body.
    ///
    /// If no `content-type` header is set and `body` looks like markup, `content-type`
    /// is set to `text/html`.
    pub fn new(status_code: u16, mut headers: HeaderList, body: &[u8]) -> Result<Self, Error> {
        let looks_like_html = std::str::from_utf8(body).map_or(false, is_html);
        if !headers.contains_ignore_case("content-type") && looks_like_html {
            headers.insert("content-type", "text/html");
        }

        let status =
            StatusCode::from_u16(status_code).map_err(|_| Error::InvalidStatusCode(status_code))?;
        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::InvalidHeaderName(name.to_owned()))?;
            let header_value = HeaderValue::from_str(value).map_err(|_| Error::InvalidHeaderValue {
                name: name.to_owned(),
            })?;
            header_map.append(header_name, header_value);
        }
        debug!("Synthesized a {} response.", status);

        Ok(Self {
            status,
            headers: header_map,
            ..Self::default()
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Attach `body` and turn this into a `hyper` response, ready to be served.
    pub fn into_hyper(self, body: BodyStream) -> hyper::Response<SyntheticBody> {
        let body = StreamBody::new(body.map_ok(Frame::data)).boxed_unsync();
        let mut response = hyper::Response::new(body);
        *response.status_mut() = self.status;
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers;
        response
    }
}
