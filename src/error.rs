use std::path::PathBuf;

/// Failures returned by a [`FixtureLoader`].
///
/// [`FixtureLoader`]: crate::FixtureLoader
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("A fixture file could not be found at `{}`", .path.display())]
    NotFound { path: PathBuf },
    #[error("Failed to read the fixture file at `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The fixture file at `{}` is not valid JSON", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("The fixture file at `{}` is not valid UTF-8", .path.display())]
    Utf8 { path: PathBuf },
    #[error("`{0}` is not a supported fixture encoding")]
    UnsupportedEncoding(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The fixture loader failed; the error is passed through untouched.
    #[error(transparent)]
    FixtureLoad(#[from] FixtureError),
    #[error("{0} is not a valid HTTP status code")]
    InvalidStatusCode(u16),
    #[error("`{0}` is not a valid HTTP header name")]
    InvalidHeaderName(String),
    #[error("The value of the `{name}` header is not a valid HTTP header value")]
    InvalidHeaderValue { name: String },
    #[error("Failed to serialize to JSON")]
    Serialize(#[from] serde_json::Error),
}
