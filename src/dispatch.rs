use crate::error::Error;
use crate::static_response::StaticResponse;
use crate::synthetic_response::{BodyStream, SyntheticResponse};
use futures::stream;
use hyper::body::Bytes;
use log::debug;
use std::io;

/// The response to an intercepted request, as seen by [`send_static_response`].
///
/// It is only touched when the connection must be reset: a regular static response is handed
/// to the completion callback instead.
pub trait ResponseTarget {
    /// Abruptly close the connection the request was received on.
    fn destroy_connection(&mut self);

    /// Discard the response: nothing will ever be written to it.
    fn destroy(&mut self);
}

/// Answer an intercepted request with `static_response`.
///
/// - If `force_network_error` is set, the connection and `target` are torn down and
///   `on_response` is never called.
/// - Otherwise a [`SyntheticResponse`] is built (a missing or zero status
///   code becomes 200, missing headers become none)
///   and passed to `on_response` together with the body stream.
///
/// When `body_stream` is provided it is the body of the response and `static_response.body`
/// is ignored. Otherwise a fresh stream yielding `static_response.body` is created.
///
/// `static_response` is expected to have been resolved with [`set_body_from_fixture`] first.
/// An invalid status code or header is returned as an error before `on_response` is called.
///
/// [`set_body_from_fixture`]: crate::set_body_from_fixture
pub fn send_static_response<T, F>(
    target: &mut T,
    static_response: &StaticResponse,
    on_response: F,
    body_stream: Option<BodyStream>,
) -> Result<(), Error>
where
    T: ResponseTarget + ?Sized,
    F: FnOnce(SyntheticResponse, BodyStream),
{
    if static_response.force_network_error {
        debug!("Forcing a network error: destroying the connection.");
        target.destroy_connection();
        target.destroy();
        return Ok(());
    }

    // A zero status code counts as unset.
    let status_code = match static_response.status_code {
        Some(0) | None => 200,
        Some(status_code) => status_code,
    };
    let headers = static_response.headers.clone().unwrap_or_default();
    let body: &[u8] = match (&body_stream, &static_response.body) {
        (None, Some(body)) => body.as_bytes(),
        (Some(_), Some(body)) if !body.is_empty() => {
            debug!("A body stream was provided: ignoring the static response body.");
            &[]
        }
        _ => &[],
    };

    let response = SyntheticResponse::new(status_code, headers, body)?;
    let body_stream = match body_stream {
        Some(stream) => stream,
        None => pass_through(body),
    };

    on_response(response, body_stream);
    Ok(())
}

/// A single-pass stream that yields `body` (nothing at all if it is empty) and then ends.
fn pass_through(body: &[u8]) -> BodyStream {
    let chunk = if body.is_empty() {
        None
    } else {
        Some(Ok::<_, io::Error>(Bytes::copy_from_slice(body)))
    };
    Box::pin(stream::iter(chunk))
}
