use crate::content_type::ContentTypeInference;
use crate::error::{Error, FixtureError};
use crate::static_response::{ResponseBody, StaticResponse};
use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use log::debug;
use serde_json::Value;
use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The content of a fixture, as returned by a [`FixtureLoader`].
#[derive(Clone, Debug, PartialEq)]
pub enum FixtureData {
    /// Raw, undecoded bytes.
    Bytes(Vec<u8>),
    /// Decoded text.
    Text(String),
    /// A parsed document (e.g. a `.json` fixture). `Value::Null` is a null fixture.
    Structured(Value),
}

impl FixtureData {
    pub fn is_null(&self) -> bool {
        matches!(self, FixtureData::Structured(Value::Null))
    }

    /// Turn the fixture into a response body.
    ///
    /// Bytes and text are used as they are, and so is a structured string. Other structured
    /// values are serialized to JSON and a null fixture becomes an empty body.
    pub fn into_body(self) -> ResponseBody {
        match self {
            FixtureData::Bytes(bytes) => ResponseBody::Bytes(bytes),
            FixtureData::Text(text) => ResponseBody::Text(text),
            FixtureData::Structured(Value::Null) => ResponseBody::Text(String::new()),
            FixtureData::Structured(Value::String(text)) => ResponseBody::Text(text),
            FixtureData::Structured(value) => ResponseBody::Text(value.to_string()),
        }
    }
}

/// Anything that implements `FixtureLoader` can provide the body of a [`StaticResponse`]
/// that references a fixture.
///
/// Implementations must be safe to call from concurrent requests.
/// [`FsFixtureLoader`] reads fixtures from a folder on disk.
#[async_trait]
pub trait FixtureLoader: Send + Sync {
    /// Load the fixture at `file_path`, decoding it according to `encoding`.
    async fn load(
        &self,
        file_path: &str,
        encoding: Option<&str>,
    ) -> Result<FixtureData, FixtureError>;
}

/// Replace the fixture reference of `static_response` with the fixture content.
///
/// It is a no-op if `static_response` does not reference a fixture.
/// Otherwise the fixture is loaded and:
/// - unless the fixture is null or a `content-type` header is already set (in any letter case),
///   `infer` picks one and it is added to the headers;
/// - the fixture content becomes the body (see [`FixtureData::into_body`]).
///
/// A loading failure is returned as-is and leaves `static_response` untouched.
///
/// ### Example:
/// ```rust
/// use net_stubbing::{set_body_from_fixture, FixtureData, FixtureError, FixtureLoader, FixtureRef, Sniffer, StaticResponse};
///
/// struct InMemory;
///
/// #[async_trait::async_trait]
/// impl FixtureLoader for InMemory {
///     async fn load(&self, _file_path: &str, _encoding: Option<&str>) -> Result<FixtureData, FixtureError> {
///         Ok(FixtureData::Structured(serde_json::json!({ "id": 1 })))
///     }
/// }
///
/// #[async_std::main]
/// async fn main() {
///     let mut static_response = StaticResponse::new(200).set_fixture(FixtureRef::new("user.json"));
///
///     set_body_from_fixture(&InMemory, &Sniffer, &mut static_response).await.unwrap();
///
///     assert_eq!(static_response.body, Some(r#"{"id":1}"#.into()));
///     assert_eq!(
///         static_response.headers.unwrap().get_ignore_case("content-type"),
///         Some("application/json")
///     );
/// }
/// ```
pub async fn set_body_from_fixture<L, C>(
    get_fixture: &L,
    infer: &C,
    static_response: &mut StaticResponse,
) -> Result<(), Error>
where
    L: FixtureLoader + ?Sized,
    C: ContentTypeInference + ?Sized,
{
    let fixture = match &static_response.fixture {
        Some(fixture) => fixture,
        None => return Ok(()),
    };
    debug!("Loading fixture `{}`.", fixture.file_path);
    let data = get_fixture
        .load(&fixture.file_path, fixture.encoding.as_deref())
        .await?;

    let has_content_type = static_response
        .headers
        .as_ref()
        .map_or(false, |headers| headers.contains_ignore_case("content-type"));
    if !data.is_null() && !has_content_type {
        let content_type = infer.infer(&data);
        static_response
            .headers
            .get_or_insert_with(Default::default)
            .insert("content-type", content_type);
    }

    static_response.body = Some(data.into_body());
    Ok(())
}

/// Extensions of fixtures that are served base64-encoded unless an encoding is requested.
const BINARY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "tif", "tiff", "zip"];

/// Extensions tried, in order, for a fixture path without one that does not exist as-is.
const IMPLICIT_EXTENSIONS: &[&str] = &["json", "txt", "html"];

const DEFAULT_FIXTURES_FOLDER: &str = "cypress/fixtures";

/// A [`FixtureLoader`] reading fixtures from a folder on disk.
///
/// Fixtures are decoded according to the requested encoding:
/// - `utf8`/`utf-8`: text;
/// - `base64`: the base64 encoding of the file, as text;
/// - `binary`/`latin1`: one character per byte;
/// - `ascii`: one character per byte, high bit cleared;
/// - `null`/`raw`: the raw bytes.
///
/// `.json` fixtures are always parsed, unless raw bytes are requested.
/// Without an encoding, images and archives are base64-encoded and everything else is UTF-8 text.
#[derive(Clone, Debug)]
pub struct FsFixtureLoader {
    fixtures_folder: PathBuf,
}

impl FsFixtureLoader {
    /// Start building a `FsFixtureLoader`.
    ///
    /// The fixtures folder defaults to the value of `NET_STUBBING_FIXTURES_FOLDER`,
    /// or `cypress/fixtures` if it is not set.
    pub fn builder() -> FsFixtureLoaderBuilder {
        let fixtures_folder = env::var_os("NET_STUBBING_FIXTURES_FOLDER")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURES_FOLDER));
        FsFixtureLoaderBuilder { fixtures_folder }
    }

    pub fn fixtures_folder(&self) -> &Path {
        &self.fixtures_folder
    }

    async fn resolve(&self, file_path: &str) -> Result<PathBuf, FixtureError> {
        let path = self.fixtures_folder.join(file_path);
        if tokio::fs::metadata(&path).await.is_ok() {
            return Ok(path);
        }
        if path.extension().is_none() {
            for extension in IMPLICIT_EXTENSIONS {
                let candidate = path.with_extension(extension);
                if tokio::fs::metadata(&candidate).await.is_ok() {
                    return Ok(candidate);
                }
            }
        }
        Err(FixtureError::NotFound { path })
    }
}

/// A builder providing a fluent API to assemble a [`FsFixtureLoader`].
/// Use [`FsFixtureLoader::builder`] to get started.
#[derive(Debug)]
pub struct FsFixtureLoaderBuilder {
    fixtures_folder: PathBuf,
}

impl FsFixtureLoaderBuilder {
    /// Resolve fixture paths against `folder`.
    pub fn fixtures_folder<P: Into<PathBuf>>(mut self, folder: P) -> Self {
        self.fixtures_folder = folder.into();
        self
    }

    pub fn build(self) -> FsFixtureLoader {
        FsFixtureLoader {
            fixtures_folder: self.fixtures_folder,
        }
    }
}

#[async_trait]
impl FixtureLoader for FsFixtureLoader {
    async fn load(
        &self,
        file_path: &str,
        encoding: Option<&str>,
    ) -> Result<FixtureData, FixtureError> {
        let path = self.resolve(file_path).await?;
        let bytes = tokio::fs::read(&path).await.map_err(|source| match source.kind() {
            ErrorKind::NotFound => FixtureError::NotFound { path: path.clone() },
            _ => FixtureError::Io {
                path: path.clone(),
                source,
            },
        })?;
        debug!("Read {} bytes from fixture `{}`.", bytes.len(), path.display());
        decode(&path, bytes, encoding)
    }
}

fn decode(path: &Path, bytes: Vec<u8>, encoding: Option<&str>) -> Result<FixtureData, FixtureError> {
    let encoding = encoding.map(str::to_ascii_lowercase);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match encoding.as_deref() {
        Some("null") | Some("raw") => return Ok(FixtureData::Bytes(bytes)),
        _ if extension == "json" => {
            return serde_json::from_slice(&bytes)
                .map(FixtureData::Structured)
                .map_err(|source| FixtureError::Decode {
                    path: path.to_owned(),
                    source,
                });
        }
        _ => {}
    }

    let encoding = match encoding.as_deref() {
        Some(encoding) => encoding,
        None if BINARY_EXTENSIONS.contains(&extension.as_str()) => "base64",
        None => "utf8",
    };
    let text = match encoding {
        "utf8" | "utf-8" => String::from_utf8(bytes).map_err(|_| FixtureError::Utf8 {
            path: path.to_owned(),
        })?,
        "base64" => BASE64_STANDARD.encode(&bytes),
        "binary" | "latin1" => bytes.iter().map(|b| *b as char).collect(),
        "ascii" => bytes.iter().map(|b| (b & 0x7f) as char).collect(),
        other => return Err(FixtureError::UnsupportedEncoding(other.to_owned())),
    };
    Ok(FixtureData::Text(text))
}
