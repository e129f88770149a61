use crate::headers::HeaderList;
use serde::{Deserialize, Serialize};

/// The body of a [`StaticResponse`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Text(String),
    Bytes(Vec<u8>),
}

impl ResponseBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResponseBody::Text(text) => text.as_bytes(),
            ResponseBody::Bytes(bytes) => bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        ResponseBody::Text(text.to_owned())
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        ResponseBody::Text(text)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(bytes: Vec<u8>) -> Self {
        ResponseBody::Bytes(bytes)
    }
}

/// A reference to a fixture file to be used as the body of a [`StaticResponse`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureRef {
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl FixtureRef {
    pub fn new<P: Into<String>>(file_path: P) -> Self {
        Self {
            file_path: file_path.into(),
            encoding: None,
        }
    }

    pub fn with_encoding<E: Into<String>>(mut self, encoding: E) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

/// A canned answer to an intercepted request.
///
/// Only one of `body`, `fixture` and `force_network_error` is meaningful at a time.
/// When `force_network_error` is set every other field is ignored: the connection is reset
/// instead of answered.
///
/// `fixture` is turned into `body` (and, possibly, a `content-type` header) by
/// [`set_body_from_fixture`] before the response is sent with [`send_static_response`].
///
/// The JSON representation uses camelCase field names:
/// ```rust
/// use net_stubbing::StaticResponse;
///
/// let response: StaticResponse = serde_json::from_str(
///     r#"{ "statusCode": 201, "headers": { "X-Id": "42" }, "body": "created" }"#
/// ).unwrap();
///
/// assert_eq!(response.status_code, Some(201));
/// assert_eq!(response.headers.unwrap().get_ignore_case("x-id"), Some("42"));
/// ```
///
/// [`set_body_from_fixture`]: crate::set_body_from_fixture
/// [`send_static_response`]: crate::send_static_response
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<ResponseBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<FixtureRef>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force_network_error: bool,
}

impl StaticResponse {
    /// Start building a `StaticResponse` with the given status code.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            ..Self::default()
        }
    }

    /// A `StaticResponse` that resets the connection instead of answering.
    pub fn network_error() -> Self {
        Self {
            force_network_error: true,
            ..Self::default()
        }
    }

    /// Set `name` to `value`, overriding an entry with the same name.
    pub fn insert_header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .get_or_insert_with(HeaderList::new)
            .insert(name, value);
        self
    }

    pub fn set_body<B: Into<ResponseBody>>(mut self, body: B) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn set_fixture(mut self, fixture: FixtureRef) -> Self {
        self.fixture = Some(fixture);
        self
    }
}
